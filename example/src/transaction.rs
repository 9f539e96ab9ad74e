use dbx::rusqlite::{Client, Error};
use dbx::Executor;

use crate::holdings::{Holding, NewHolding};

pub fn main(client: &mut Client) -> Result<(), Error> {
    let before = count(client)?;

    let mut txn = client.transaction()?;
    let stored = txn.insert(
        "holdings",
        &NewHolding {
            loc: "coinbase".into(),
            currency: "sol".into(),
            amount: 3.0,
        },
    )?;
    println!("Inserted inside transaction: {stored:?}");

    let visible: Vec<Holding> =
        txn.select("SELECT * FROM holdings WHERE loc = $1", &[&"coinbase"])?;
    println!("Visible inside transaction: {}", visible.len());
    txn.rollback()?;

    let after = count(client)?;
    println!("Holdings before: {before}, after rollback: {after}");

    Ok(())
}

fn count(client: &mut Client) -> Result<i64, Error> {
    #[derive(Debug, Default, dbx::Record)]
    struct Count {
        count: i64,
    }

    let row: Count = client.get("SELECT count(*) AS count FROM holdings", &[])?;
    Ok(row.count)
}
