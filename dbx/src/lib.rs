#![cfg_attr(docsrs, feature(doc_cfg))]

//! Map plain Rust structs onto database rows by column name.
//!
//! A database record is represented by a plain struct that implements
//! [`Record`](Record), which is generally derived.  The record lists its
//! fields under their logical column names in a
//! [`FieldCatalog`](record::FieldCatalog), and we use that listing in two
//! directions:
//!
//! * reading, where each column of a result row is decoded into the field
//!   of the same name (see [`row`]), and
//! * writing, where the fields' values become the parameters of an
//!   `INSERT ... RETURNING *` statement (see [`insert`](mod@insert)).
//!
//! Matching is by name, not position, and it's forgiving.  Result columns
//! with no matching field are read and thrown away, and fields with no
//! matching column are left at their `Default` value.  So a query may
//! select more or fewer columns than the record has fields.
#![cfg_attr(
    feature = "derive",
    doc = r##"

```
use dbx::Record;

#[derive(Debug, Default, Record)]
struct Holding {
    ts: String,
    loc: String,
    currency: String,
    amount: f64,
    notes: Option<String>,
}
```
"##
)]
//!
//! Once you have a record type in hand, you'll need a connection to run
//! queries on.  That's an [`Executor`](client::Executor), whose
//! [`Client`](client::Client) names the backend's row, parameter, and
//! error types.
//!
//! dbx supports the following database client crates:
//!
//! | DB | Backend Crate | Feature | Client |
//! | -- | ------------- | ------- | ------ |
//! | PostgreSQL | [postgres](https://crates.io/crates/postgres) | `postgres` | [`dbx::postgres::Client`](postgres::Client) |
//! | SQLite | [rusqlite](https://crates.io/crates/rusqlite) | `rusqlite` | [`dbx::rusqlite::Client`](rusqlite::Client) |
//!
//! ## Examples
#![cfg_attr(
    all(feature = "derive", feature = "rusqlite"),
    doc = r##"

The SQLite client, available when compiled with crate feature `rusqlite`.

```
use dbx::rusqlite::{Client, Error};
use dbx::{Executor, Record};

#[derive(Debug, Default, Record)]
struct Holding {
    ts: String,
    loc: String,
    currency: String,
    notes: Option<String>,
}

#[derive(Debug, Default, Record)]
struct NewHolding {
    loc: String,
    currency: String,
}

# fn main() -> Result<(), Error> {
// Connect to the database
let mut client = Client::open_in_memory()?;
client.execute(
    "CREATE TABLE holdings (
        ts TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        loc TEXT NOT NULL,
        currency TEXT NOT NULL,
        amount REAL NOT NULL DEFAULT 0,
        notes TEXT
    )",
    &[],
)?;

// Insert a record, getting back the row as stored.
let stored = client.insert("holdings", &NewHolding {
    loc: "binance".into(),
    currency: "btc".into(),
})?;
assert_eq!(stored.loc, "binance");

// Fields the insert left out were filled in by the database.
let holding: Holding = client.get("SELECT * FROM holdings", &[])?;
assert!(!holding.ts.is_empty());

// Run a query and map the result rows.  The extra amount column
// doesn't bother the record.
let rows: Vec<Holding> = client.select("SELECT * FROM holdings", &[])?;
assert_eq!(rows.len(), 1);
assert_eq!(rows[0].loc, "binance");

// Or read just the one row.
let row: Holding = client.get(
    "SELECT loc, currency FROM holdings WHERE currency = $1",
    &[&"btc"],
)?;
assert_eq!(row.notes, None);
#
# Ok(())
# }
```
"##
)]
#![cfg_attr(
    all(feature = "derive", feature = "postgres"),
    doc = r##"

The synchronous PostgreSQL client, available when compiled
with crate feature `postgres`.

```no_run
use postgres::NoTls;
use dbx::postgres::{Client, Error};
use dbx::{Executor, Record};

#[derive(Debug, Default, Record)]
struct Holding {
    loc: String,
    currency: String,
}

# fn main() -> Result<(), Error> {
// Connect to the database
let mut client =
    Client::connect("host=localhost user=postgres", NoTls)?;

let stored = client.insert("holdings", &Holding {
    loc: "binance".into(),
    currency: "btc".into(),
})?;

let rows: Vec<Holding> = client.select("SELECT * FROM holdings", &[])?;
assert_eq!(rows[0].loc, stored.loc);
#
# Ok(())
# }
```
"##
)]

extern crate self as dbx;

pub mod client;
pub mod error;
pub mod insert;
pub mod record;
pub mod row;

#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres;
#[cfg(feature = "rusqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "rusqlite")))]
pub mod rusqlite;

#[cfg(test)]
mod test;

pub use client::{Client, Cursor, Executor};
pub use error::Error;
pub use record::{FieldCatalog, Record};

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use dbx_derive::Record;
