//! Traits that represent database clients.
//!
//! Our model splits a backend into two halves.  A [`Client`] names the
//! backend's row, parameter and error types; it's the codec that record
//! fields are decoded with and encoded to.  An [`Executor`] is something
//! that can run SQL with those parameters and hand back a [`Cursor`]
//! over the result rows: a connection, or a transaction on one.
//!
//! Queries are run synchronously, the calling thread blocks until
//! the backend has answered.

use crate::error::Error;
use crate::record::Record;

/// A database client's row, parameter and error types.
pub trait Client: Sized + 'static {
    type Row<'a>;
    type Param<'a>;
    type Error;
}

/// A value that can be decoded in place from a database column.
///
/// The backend modules implement this for every type their own
/// decoding layer supports, so record fields rarely need a manual impl.
pub trait FromColumn<C: Client> {
    fn from_column(&mut self, row: &C::Row<'_>, index: usize) -> Result<(), Error<C::Error>>;
}

/// A type that can be converted to a database param.
pub trait ToParam<C: Client> {
    fn to_param(&self) -> C::Param<'_>;
}

/// Where one column of the current row should be decoded to.
pub enum Target<'a, C: Client> {
    /// Decode into this record field.
    Field(&'a mut dyn FromColumn<C>),
    /// Decode the value without keeping it.
    Discard,
}

impl<'a, C: Client> std::fmt::Debug for Target<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Target::Field(_) => f.write_str("Field"),
            Target::Discard => f.write_str("Discard"),
        }
    }
}

/// A live iterator over the rows of an executed statement.
pub trait Cursor<C: Client> {
    /// Moves to the next row, returning `false` when there are no more rows
    /// or fetching failed.
    fn advance(&mut self) -> bool;

    /// The names of the columns of the active result, in order.
    fn column_names(&self) -> &[String];

    /// Decodes the current row, one target per column in column order.
    fn decode_into(&mut self, targets: &mut [Target<'_, C>]) -> Result<(), Error<C::Error>>;

    /// The failure that stopped iteration, if it wasn't plain exhaustion.
    fn terminal_error(&mut self) -> Option<Error<C::Error>>;

    /// Releases the cursor.  Calling it more than once is harmless.
    fn close(&mut self);
}

/// Something that can execute SQL: a connection or a transaction.
pub trait Executor {
    type Client: Client;

    /// Runs a query and hands its cursor to `f`.
    ///
    /// The cursor is closed once `f` returns, whatever the outcome.
    fn with_cursor<T, F>(
        &mut self,
        sql: &str,
        params: &[<Self::Client as Client>::Param<'_>],
        f: F,
    ) -> Result<T, Error<<Self::Client as Client>::Error>>
    where
        F: FnOnce(&mut dyn Cursor<Self::Client>) -> Result<T, Error<<Self::Client as Client>::Error>>;

    /// Executes a statement, returning the number of rows modified.
    fn execute(
        &mut self,
        sql: &str,
        params: &[<Self::Client as Client>::Param<'_>],
    ) -> Result<u64, Error<<Self::Client as Client>::Error>>;

    /// Runs a query and maps its first row onto a record.
    ///
    /// Returns an error of kind [`NoRows`](crate::error::ErrorKind::NoRows)
    /// if the query produced no rows.
    fn get<R: Record<Self::Client>>(
        &mut self,
        sql: &str,
        params: &[<Self::Client as Client>::Param<'_>],
    ) -> Result<R, Error<<Self::Client as Client>::Error>> {
        self.with_cursor(sql, params, |cursor| crate::row::materialize_one(cursor))
    }

    /// Runs a query and maps its first row onto a record, if there is one.
    fn get_opt<R: Record<Self::Client>>(
        &mut self,
        sql: &str,
        params: &[<Self::Client as Client>::Param<'_>],
    ) -> Result<Option<R>, Error<<Self::Client as Client>::Error>> {
        self.with_cursor(sql, params, |cursor| crate::row::materialize_opt(cursor))
    }

    /// Runs a query and maps every row onto a record.
    fn select<R: Record<Self::Client>>(
        &mut self,
        sql: &str,
        params: &[<Self::Client as Client>::Param<'_>],
    ) -> Result<Vec<R>, Error<<Self::Client as Client>::Error>> {
        self.with_cursor(sql, params, |cursor| crate::row::materialize_all(cursor))
    }

    /// Inserts a record into `table`, returning the row as stored.
    ///
    /// See [`insert`](crate::insert::insert).
    fn insert<R: Record<Self::Client>>(
        &mut self,
        table: &str,
        record: &R,
    ) -> Result<R, Error<<Self::Client as Client>::Error>> {
        crate::insert::insert(self, table, record)
    }
}
