//! Building INSERT statements from records.

use crate::client::{Client, Executor};
use crate::error::Error;
use crate::record::Record;
use crate::row::materialize_one;

/// The text of a parameterized statement and its parameters, in order.
#[derive(Debug, Clone)]
pub struct InsertStatement<P> {
    pub text: String,
    pub params: Vec<P>,
}

/// Builds `INSERT INTO <table> (<columns>) VALUES ($1, ...) RETURNING *`.
///
/// Columns appear in the record's declaration order, and the parameters
/// are borrowed from the record's fields in that same order.
///
/// The table name and column names are pasted into the statement text as
/// they are, without quoting or escaping.  Only pass identifiers that are
/// safe to interpolate directly.
#[cfg_attr(
    all(feature = "derive", feature = "rusqlite"),
    doc = r##"

```
use dbx::Record;
use dbx::insert::build_insert;

#[derive(Default, Record)]
struct Holding {
    loc: String,
    currency: String,
}

let holding = Holding {
    loc: "binance".into(),
    currency: "btc".into(),
};
let statement = build_insert::<dbx::rusqlite::Client, _>("holdings", &holding);

assert_eq!(
    "INSERT INTO holdings (loc, currency) VALUES ($1, $2) RETURNING *",
    statement.text,
);
assert_eq!(2, statement.params.len());
```
"##
)]
pub fn build_insert<'r, C, R>(table: &str, record: &'r R) -> InsertStatement<C::Param<'r>>
where
    C: Client,
    R: Record<C>,
{
    let values = record.values();

    let mut columns = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());

    for (column, value) in values {
        columns.push(column);
        params.push(value);
        placeholders.push(format!("${}", params.len()));
    }

    let text = format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
        columns.join(", "),
        placeholders.join(", "),
    );

    InsertStatement { text, params }
}

/// Inserts `record` into `table`, returning the row the database stored.
///
/// The returned record is read back from the `RETURNING *` projection, so
/// it includes anything the database filled in, like defaults or
/// generated keys, for the columns the record has fields for.
pub fn insert<E, R>(
    executor: &mut E,
    table: &str,
    record: &R,
) -> Result<R, Error<<E::Client as Client>::Error>>
where
    E: Executor + ?Sized,
    R: Record<E::Client>,
{
    let statement = build_insert::<E::Client, R>(table, record);
    executor.with_cursor(&statement.text, &statement.params, |cursor| {
        materialize_one(cursor)
    })
}
