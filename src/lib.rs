pub mod balance;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod parse;
pub mod progress;
pub mod store;
pub mod volume;

#[cfg(test)]
mod test_utils;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

pub use config::JournalConfig;
pub use engine::{refresh, RefreshOutcome, Snapshot, TrainingReport};
pub use error::{ConfigError, JournalError, Result};
pub use store::{JournalStore, SqliteStore};

pub async fn run() -> Result<()> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  // Logs go to stderr so the report on stdout stays parseable
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let config = JournalConfig::from_env()?;
  let store = SqliteStore::connect(&config).await?;

  let now = Utc::now();
  let outcome = refresh(&store, now).await?;
  for failure in &outcome.failures {
    tracing::warn!(block_id = %failure.block_id, "Block completion will be retried on the next run");
  }

  let report = TrainingReport::compute(&outcome.snapshot, now, &config);
  println!("{}", serde_json::to_string_pretty(&report)?);

  store.close().await;
  Ok(())
}
