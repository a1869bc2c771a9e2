//! Runtime configuration read from the environment (and `.env`, loaded by
//! [`crate::run`] before this is read).

use std::env;

use crate::error::ConfigError;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DATABASE_URL_VAR: &str = "TRAINING_JOURNAL_DATABASE_URL";
pub const BALANCE_WINDOW_VAR: &str = "TRAINING_JOURNAL_BALANCE_WINDOW_DAYS";
pub const MAX_CONNECTIONS_VAR: &str = "TRAINING_JOURNAL_MAX_CONNECTIONS";

const DEFAULT_DATABASE_URL: &str = "sqlite://training-journal.db?mode=rwc";
const DEFAULT_BALANCE_WINDOW_DAYS: i64 = 28;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
  pub database_url: String,
  /// Trailing window for the muscle balance when no block is active
  pub balance_window_days: i64,
  pub max_connections: u32,
}

impl Default for JournalConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      balance_window_days: DEFAULT_BALANCE_WINDOW_DAYS,
      max_connections: DEFAULT_MAX_CONNECTIONS,
    }
  }
}

impl JournalConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();
    Ok(Self {
      database_url: env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.database_url),
      balance_window_days: positive_var(BALANCE_WINDOW_VAR)?.unwrap_or(defaults.balance_window_days),
      max_connections: positive_var::<u32>(MAX_CONNECTIONS_VAR)?.unwrap_or(defaults.max_connections),
    })
  }
}

/// Unset -> `None`; set but not a positive number -> error
fn positive_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
  T: std::str::FromStr + PartialOrd + Default,
{
  let Ok(raw) = env::var(key) else {
    return Ok(None);
  };
  let invalid = |message: &str| ConfigError::InvalidValue {
    key: key.to_string(),
    message: message.to_string(),
  };
  let value: T = raw.trim().parse().map_err(|_| invalid("not a number"))?;
  if value <= T::default() {
    return Err(invalid("must be greater than zero"));
  }
  Ok(Some(value))
}
