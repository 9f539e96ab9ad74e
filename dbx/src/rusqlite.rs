#![allow(clippy::redundant_closure)]
//! SQLite backend, built on `rusqlite`.
//!
//! SQLite numbers `$1`, `$2`, ... parameters in order of first appearance,
//! so positional parameters work as long as they're written in order, as
//! the INSERT builder does.  `RETURNING` needs SQLite 3.35 or later.

use fallible_streaming_iterator::FallibleStreamingIterator;

use crate::client::{Cursor, Executor, FromColumn, Target, ToParam};
use crate::error;
use crate::row::decode_row;

/// The type of errors from a `Client`.
pub type Error = error::Error<rusqlite::Error>;

impl<T> FromColumn<Client> for T
where
    T: rusqlite::types::FromSql,
{
    fn from_column(&mut self, row: &rusqlite::Row<'_>, index: usize) -> Result<(), Error> {
        *self = row.get(index).map_err(Error::decode)?;
        Ok(())
    }
}

impl<T> ToParam<Client> for T
where
    T: rusqlite::types::ToSql,
{
    fn to_param(&self) -> &dyn rusqlite::types::ToSql {
        self
    }
}

/// A SQLite connection that reads and writes records.
#[derive(Debug)]
pub struct Client(rusqlite::Connection);

impl crate::client::Client for Client {
    type Row<'a> = rusqlite::Row<'a>;
    type Param<'a> = &'a dyn rusqlite::types::ToSql;
    type Error = rusqlite::Error;
}

impl AsMut<rusqlite::Connection> for Client {
    fn as_mut(&mut self) -> &mut rusqlite::Connection {
        &mut self.0
    }
}

impl AsRef<rusqlite::Connection> for Client {
    fn as_ref(&self) -> &rusqlite::Connection {
        &self.0
    }
}

impl From<rusqlite::Connection> for Client {
    fn from(inner: rusqlite::Connection) -> Self {
        Client(inner)
    }
}

impl Client {
    /// Opens the SQLite database file at `path`, creating it if needed.
    ///
    /// ```rust,no_run
    /// # fn main() -> Result<(), dbx::rusqlite::Error> {
    /// let client = dbx::rusqlite::Client::open("holdings.db3")?;
    /// assert!(client.as_ref().is_autocommit());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Fails with an error of kind [`Connect`](crate::error::ErrorKind::Connect)
    /// if SQLite can't open the file.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Error> {
        rusqlite::Connection::open(path)
            .map(Client)
            .map_err(Error::connect)
    }

    /// Opens the database file at `path` with explicit [`rusqlite::OpenFlags`],
    /// e.g. to open it read-only.
    pub fn open_with_flags<P: AsRef<std::path::Path>>(
        path: P,
        flags: rusqlite::OpenFlags,
    ) -> Result<Self, Error> {
        rusqlite::Connection::open_with_flags(path, flags)
            .map(Client)
            .map_err(Error::connect)
    }

    /// Opens a fresh private database that lives in memory.
    pub fn open_in_memory() -> Result<Self, Error> {
        rusqlite::Connection::open_in_memory()
            .map(Client)
            .map_err(Error::connect)
    }

    pub fn open_in_memory_with_flags(flags: rusqlite::OpenFlags) -> Result<Self, Error> {
        rusqlite::Connection::open_in_memory_with_flags(flags)
            .map(Client)
            .map_err(Error::connect)
    }

    /// Starts a transaction on this connection.
    ///
    /// Records can be read and inserted through the transaction just as
    /// through the client.  Nothing is kept unless it's committed.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, Error> {
        Ok(Transaction(
            self.0.transaction().map_err(Error::transaction)?,
        ))
    }

    /// Starts a transaction with the given locking behavior, e.g.
    /// `Immediate` to take the write lock up front.
    pub fn transaction_with_behavior(
        &mut self,
        behavior: rusqlite::TransactionBehavior,
    ) -> Result<Transaction<'_>, Error> {
        let txn = self
            .0
            .transaction_with_behavior(behavior)
            .map_err(Error::transaction)?;
        Ok(Transaction(txn))
    }
}

impl Executor for Client {
    type Client = Client;

    fn with_cursor<T, F>(
        &mut self,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
        f: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
    {
        with_cursor(&self.0, sql, params, f)
    }

    fn execute(&mut self, sql: &str, params: &[&dyn rusqlite::types::ToSql]) -> Result<u64, Error> {
        execute(&self.0, sql, params)
    }
}

/// A transaction on a SQLite connection.
///
/// Dropping it without calling `commit` rolls it back.
#[derive(Debug)]
pub struct Transaction<'a>(rusqlite::Transaction<'a>);

impl<'a> Transaction<'a> {
    /// Commits everything done in the transaction.
    pub fn commit(self) -> Result<(), Error> {
        self.0.commit().map_err(Error::transaction)
    }

    /// Discards everything done in the transaction.
    ///
    /// Unlike dropping it, this reports a failed rollback.
    pub fn rollback(self) -> Result<(), Error> {
        self.0.rollback().map_err(Error::transaction)
    }
}

impl<'a> Executor for Transaction<'a> {
    type Client = Client;

    fn with_cursor<T, F>(
        &mut self,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
        f: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
    {
        with_cursor(&self.0, sql, params, f)
    }

    fn execute(&mut self, sql: &str, params: &[&dyn rusqlite::types::ToSql]) -> Result<u64, Error> {
        execute(&self.0, sql, params)
    }
}

fn with_cursor<T, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
    f: F,
) -> Result<T, Error>
where
    F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
{
    tracing::debug!(sql, params = params.len(), "query");

    let mut statement = conn.prepare(sql).map_err(Error::execute)?;
    let columns = statement
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let rows = statement.query(params).map_err(Error::execute)?;

    let mut cursor = SqliteCursor {
        rows: Some(rows),
        columns,
        error: None,
    };
    let result = f(&mut cursor);
    cursor.close();
    result
}

fn execute(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<u64, Error> {
    tracing::debug!(sql, params = params.len(), "execute");

    let rows_affected = conn.execute(sql, params).map_err(Error::execute)?;
    Ok(rows_affected as u64)
}

// Unmatched columns are still read, into an untyped value.
fn discard(row: &rusqlite::Row<'_>, index: usize) -> Result<(), Error> {
    row.get::<_, rusqlite::types::Value>(index)
        .map(drop)
        .map_err(Error::decode)
}

struct SqliteCursor<'s> {
    rows: Option<rusqlite::Rows<'s>>,
    columns: Vec<String>,
    error: Option<rusqlite::Error>,
}

impl<'s> Cursor<Client> for SqliteCursor<'s> {
    fn advance(&mut self) -> bool {
        let Some(rows) = self.rows.as_mut() else {
            return false;
        };

        match FallibleStreamingIterator::advance(rows) {
            Ok(()) => FallibleStreamingIterator::get(rows).is_some(),
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn decode_into(&mut self, targets: &mut [Target<'_, Client>]) -> Result<(), Error> {
        let row = self
            .rows
            .as_ref()
            .and_then(|rows| FallibleStreamingIterator::get(rows))
            .ok_or_else(|| Error::decode_str("no current row to decode", None))?;

        decode_row::<Client, _>(row, targets, discard)
    }

    fn terminal_error(&mut self) -> Option<Error> {
        self.error.take().map(Error::execute)
    }

    fn close(&mut self) {
        self.rows = None;
    }
}
