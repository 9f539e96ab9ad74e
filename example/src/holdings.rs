use dbx::rusqlite::{Client, Error};
use dbx::{Executor, Record};

/// A holding, leaving out the table's `amount` column.
#[derive(Debug, Default, Record)]
pub struct Holding {
    pub ts: String,
    pub loc: String,
    pub currency: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Record)]
pub struct NewHolding {
    pub loc: String,
    pub currency: String,
    pub amount: f64,
}

pub fn setup(client: &mut Client) -> Result<(), Error> {
    client.execute(
        "CREATE TABLE IF NOT EXISTS holdings (
            ts TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            loc TEXT NOT NULL,
            currency TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            notes TEXT
        )",
        &[],
    )?;
    Ok(())
}

pub fn main(client: &mut Client) -> Result<(), Error> {
    for (loc, currency, amount) in [("binance", "btc", 0.5), ("kraken", "eth", 12.0)] {
        let stored = client.insert(
            "holdings",
            &NewHolding {
                loc: loc.into(),
                currency: currency.into(),
                amount,
            },
        )?;
        println!("Inserted {stored:?}");
    }

    let holding: Holding = client.get("SELECT * FROM holdings LIMIT 1", &[])?;
    println!("Single holding (no amount): {holding:?}");

    let holdings: Vec<Holding> =
        client.select("SELECT * FROM holdings ORDER BY ts DESC LIMIT 3", &[])?;
    println!("Found {} holdings (amount column ignored):", holdings.len());
    for (i, holding) in holdings.iter().enumerate() {
        println!("{}. {}: {} at {}", i + 1, holding.loc, holding.currency, holding.ts);
    }

    match client.get::<Holding>("SELECT * FROM holdings WHERE loc = $1", &[&"nowhere"]) {
        Err(err) if err.is_no_rows() => println!("No holdings at nowhere"),
        Err(err) => return Err(err),
        Ok(holding) => println!("Unexpected holding {holding:?}"),
    }

    Ok(())
}
