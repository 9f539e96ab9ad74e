//! A synchronous client for PostgreSQL.

use postgres::fallible_iterator::FallibleIterator;
use postgres::types::{FromSql, FromSqlOwned, ToSql, Type};

use crate::client::{Cursor, Executor, FromColumn, Target, ToParam};
use crate::error;
use crate::row::decode_row;

/// The type of errors from a `Client`.
pub type Error = error::Error<postgres::Error>;

impl<T> FromColumn<Client> for T
where
    T: FromSqlOwned,
{
    fn from_column(
        &mut self,
        row: &postgres::Row,
        index: usize,
    ) -> Result<(), Error> {
        *self = row.try_get(index).map_err(Error::decode)?;
        Ok(())
    }
}

impl<T> ToParam<Client> for T
where
    T: ToSql + Sync,
{
    fn to_param(&self) -> &(dyn ToSql + Sync) {
        self
    }
}

/// Accepts a value of any type and keeps none of it.
struct Ignored;

impl<'a> FromSql<'a> for Ignored {
    fn from_sql(
        _ty: &Type,
        _raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(Ignored)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(Ignored)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// A PostgreSQL connection that reads and writes records.
pub struct Client {
    client: postgres::Client,
}

impl AsMut<postgres::Client> for Client {
    fn as_mut(&mut self) -> &mut postgres::Client {
        &mut self.client
    }
}

impl crate::client::Client for Client {
    type Row<'a> = postgres::Row;
    type Param<'a> = &'a (dyn ToSql + Sync);
    type Error = postgres::Error;
}

impl AsRef<postgres::Client> for Client {
    fn as_ref(&self) -> &postgres::Client {
        &self.client
    }
}

impl From<postgres::Client> for Client {
    fn from(client: postgres::Client) -> Self {
        Self::new(client)
    }
}

impl Client {
    /// Wraps an already connected `postgres::Client`.
    pub fn new(client: postgres::Client) -> Self {
        Client { client }
    }

    /// Connects using a libpq-style connection string, which is handed
    /// to `postgres` unchanged.
    ///
    /// ```no_run
    /// # fn main() -> Result<(), dbx::postgres::Error> {
    /// # use postgres::NoTls;
    /// # use dbx::postgres::Client;
    /// // Connect to the database.
    /// let mut client = Client::connect("host=localhost user=postgres", NoTls)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect<T>(params: &str, tls_mode: T) -> Result<Self, Error>
    where
        T: postgres::tls::MakeTlsConnect<postgres::Socket> + 'static + Send,
        T::TlsConnect: Send,
        T::Stream: Send,
        <T::TlsConnect as postgres::tls::TlsConnect<postgres::Socket>>::Future: Send,
    {
        let client = postgres::Client::connect(params, tls_mode)
            .map_err(Error::connect)?;
        Ok(Self::new(client))
    }

    /// Opens a connection using an already built `postgres::Config`.
    pub fn configure<T>(config: &postgres::Config, tls_mode: T) -> Result<Self, Error>
    where
        T: postgres::tls::MakeTlsConnect<postgres::Socket> + 'static + Send,
        T::TlsConnect: Send,
        T::Stream: Send,
        <T::TlsConnect as postgres::tls::TlsConnect<postgres::Socket>>::Future: Send,
    {
        let client = config.connect(tls_mode).map_err(Error::connect)?;
        Ok(Self::new(client))
    }

    /// Determines if the connection to the server has already closed.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    /// Checks the connection is still usable by running a trivial query,
    /// giving up after `timeout`.
    pub fn is_valid(&mut self, timeout: std::time::Duration) -> Result<(), Error> {
        self.client.is_valid(timeout).map_err(Error::execute)
    }

    /// Starts a transaction on this connection.
    ///
    /// Records can be read and inserted through the transaction just as
    /// through the client.  Nothing is kept unless it's committed.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, Error> {
        Ok(Transaction {
            txn: self.client.transaction().map_err(Error::transaction)?,
        })
    }

    /// Returns a builder for a transaction with custom settings.
    ///
    /// Use it to pick the isolation level or make the transaction
    /// read-only before starting it.
    pub fn build_transaction(&mut self) -> TransactionBuilder<'_> {
        TransactionBuilder {
            builder: self.client.build_transaction(),
        }
    }
}

/// Settings for a transaction that hasn't started yet.
pub struct TransactionBuilder<'a> {
    builder: postgres::TransactionBuilder<'a>,
}

impl<'a> TransactionBuilder<'a> {
    pub fn isolation_level(self, isolation_level: postgres::IsolationLevel) -> Self {
        TransactionBuilder {
            builder: self.builder.isolation_level(isolation_level),
        }
    }

    pub fn read_only(self, read_only: bool) -> Self {
        TransactionBuilder {
            builder: self.builder.read_only(read_only),
        }
    }

    /// Only has an effect on serializable, read-only transactions.
    pub fn deferrable(self, deferrable: bool) -> Self {
        TransactionBuilder {
            builder: self.builder.deferrable(deferrable),
        }
    }

    /// Begins the transaction.
    pub fn start(self) -> Result<Transaction<'a>, Error> {
        Ok(Transaction {
            txn: self.builder.start().map_err(Error::transaction)?,
        })
    }
}

impl Executor for Client {
    type Client = Client;

    fn with_cursor<T, F>(
        &mut self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        f: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
    {
        with_cursor(&mut self.client, sql, params, f)
    }

    fn execute(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        execute(&mut self.client, sql, params)
    }
}

/// A transaction on a PostgreSQL connection.
///
/// Dropping it without calling `commit` rolls it back.
pub struct Transaction<'a> {
    txn: postgres::Transaction<'a>,
}

impl<'a> Transaction<'a> {
    /// Commits everything done in the transaction.
    pub fn commit(self) -> Result<(), Error> {
        self.txn.commit().map_err(Error::transaction)
    }

    /// Discards everything done in the transaction.
    ///
    /// Unlike dropping it, this reports a failed rollback.
    pub fn rollback(self) -> Result<(), Error> {
        self.txn.rollback().map_err(Error::transaction)
    }
}

impl<'a> Executor for Transaction<'a> {
    type Client = Client;

    fn with_cursor<T, F>(
        &mut self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        f: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
    {
        with_cursor(&mut self.txn, sql, params, f)
    }

    fn execute(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        execute(&mut self.txn, sql, params)
    }
}

fn with_cursor<G, T, F>(
    client: &mut G,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
    f: F,
) -> Result<T, Error>
where
    G: postgres::GenericClient,
    F: FnOnce(&mut dyn Cursor<Client>) -> Result<T, Error>,
{
    tracing::debug!(sql, params = params.len(), "query");

    let statement = client.prepare(sql).map_err(Error::execute)?;
    let columns = statement
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    let rows = client
        .query_raw(&statement, params.iter().map(|param| *param as &dyn ToSql))
        .map_err(Error::execute)?;

    let mut cursor = PgCursor {
        rows: Some(rows),
        columns,
        current: None,
        error: None,
    };
    let result = f(&mut cursor);
    cursor.close();
    result
}

fn execute<G>(client: &mut G, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error>
where
    G: postgres::GenericClient,
{
    tracing::debug!(sql, params = params.len(), "execute");

    client.execute(sql, params).map_err(Error::execute)
}

fn discard(row: &postgres::Row, index: usize) -> Result<(), Error> {
    row.try_get::<_, Ignored>(index)
        .map(drop)
        .map_err(Error::decode)
}

struct PgCursor<'a> {
    rows: Option<postgres::RowIter<'a>>,
    columns: Vec<String>,
    current: Option<postgres::Row>,
    error: Option<postgres::Error>,
}

impl<'a> Cursor<Client> for PgCursor<'a> {
    fn advance(&mut self) -> bool {
        self.current = None;
        let Some(rows) = self.rows.as_mut() else {
            return false;
        };

        match rows.next() {
            Ok(row) => {
                self.current = row;
                self.current.is_some()
            }
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
            .current
            .as_ref()
            .ok_or_else(|| Error::decode_str("no current row to decode", None))?;

        decode_row::<Client, _>(row, targets, discard)
    }

    fn terminal_error(&mut self) -> Option<Error> {
        self.error.take().map(Error::execute)
    }

    fn close(&mut self) {
        self.current = None;
        self.rows = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use dbx_derive::Record;
    use postgres::NoTls;

    #[derive(Debug, Default, Record)]
    struct Todo {
        id: i32,
        label: String,
    }

    #[test]
    #[ignore = "needs a PostgreSQL server at DBX_POSTGRES"]
    fn end_to_end() {
        const TODO_TEXT: &str = "get things done, please!";

        let params = std::env::var("DBX_POSTGRES")
            .unwrap_or_else(|_| "host=localhost user=dbx_test password=dbx_test".into());
        let mut client = Client::connect(&params, NoTls).unwrap();

        client
            .execute(
                "CREATE TABLE test_postgres (id SERIAL PRIMARY KEY, label TEXT NOT NULL, extra TEXT)",
                &[],
            )
            .unwrap();

        let inserted = client
            .insert("test_postgres", &InsertTodo { label: TODO_TEXT.into() })
            .unwrap();
        assert_eq!(TODO_TEXT, inserted.label);

        let todos: Vec<Todo> = client.select("SELECT * FROM test_postgres", &[]).unwrap();
        assert_eq!(1, todos.len());
        assert_eq!(TODO_TEXT, todos[0].label);

        let missing = client
            .get::<Todo>("SELECT * FROM test_postgres WHERE id = $1", &[&-1i32])
            .unwrap_err();
        assert!(missing.is_no_rows());

        client.execute("DROP TABLE test_postgres", &[]).unwrap();
    }

    #[test]
    #[ignore = "needs a PostgreSQL server at DBX_POSTGRES"]
    fn read_only_transactions_reject_inserts() {
        let params = std::env::var("DBX_POSTGRES")
            .unwrap_or_else(|_| "host=localhost user=dbx_test password=dbx_test".into());
        let mut client = Client::connect(&params, NoTls).unwrap();

        let mut txn = client
            .build_transaction()
            .isolation_level(postgres::IsolationLevel::Serializable)
            .read_only(true)
            .start()
            .unwrap();

        let err = txn
            .insert("test_read_only", &InsertTodo { label: "nope".into() })
            .unwrap_err();
        assert_eq!(crate::error::ErrorKind::Execute, err.kind());
        txn.rollback().unwrap();
    }

    #[derive(Debug, Default, Record)]
    struct InsertTodo {
        label: String,
    }
}
