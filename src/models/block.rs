use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named training period. `end_date == None` means the block is ongoing.
///
/// Lifecycle state is never stored here; see [`crate::lifecycle::classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
  pub id: String,
  pub name: String,
  pub start_date: DateTime<Utc>,
  pub end_date: Option<DateTime<Utc>>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub completed_date: Option<DateTime<Utc>>,
}

impl Block {
  /// Explicit completion by the user. Ongoing blocks get their end pinned to
  /// the completion moment.
  pub fn mark_completed(&mut self, at: DateTime<Utc>) {
    self.completed_date = Some(at);
    if self.end_date.is_none() {
      self.end_date = Some(at);
    }
    self.updated_at = at;
  }

  /// Put a completed block back into progress. An end date that has already
  /// passed (pinned by [`Block::mark_completed`] or simply expired) is cleared
  /// so the block runs as ongoing; a future end date is kept.
  pub fn reopen(&mut self, at: DateTime<Utc>) {
    self.completed_date = None;
    if self.end_date.is_some_and(|end| end <= at) {
      self.end_date = None;
    }
    self.updated_at = at;
  }

  pub fn is_ongoing(&self) -> bool {
    self.end_date.is_none()
  }
}
