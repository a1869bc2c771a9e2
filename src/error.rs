//! Error types for the training journal.
//!
//! Malformed user data never reaches this type: the analytics layer degrades
//! bad numbers and dangling references to neutral values. These errors cover
//! the store, configuration and decoding of persisted rows.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Database migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  /// A stored value could not be decoded into the domain model
  #[error("Failed to decode column '{column}': {message}")]
  Decode { column: String, message: String },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },
}

impl JournalError {
  pub fn decode(column: &str, message: impl Into<String>) -> Self {
    JournalError::Decode {
      column: column.to_string(),
      message: message.into(),
    }
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {message}")]
  InvalidValue { key: String, message: String },
}

pub type Result<T, E = JournalError> = std::result::Result<T, E>;
