use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dbx::rusqlite::Client;

mod holdings;
mod transaction;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::Registry::default()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut client = match database_path() {
        Some(path) => {
            tracing::info!(path = path.as_str(), "opening database");
            Client::open(path)?
        }
        None => {
            tracing::info!("opening in-memory database");
            Client::open_in_memory()?
        }
    };

    holdings::setup(&mut client)?;
    holdings::main(&mut client)?;
    transaction::main(&mut client)?;

    Ok(())
}

/// The first argument, or `DBX_DATABASE` if there isn't one.
fn database_path() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DBX_DATABASE").ok())
}
