//! Test utilities and helpers for unit and store tests
//!
//! This module provides common test infrastructure including:
//! - In-memory SQLite store setup/teardown
//! - An in-memory `JournalStore` with injectable failures
//! - Mock data factories
//! - Helper assertions

use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::engine::Snapshot;
use crate::error::{JournalError, Result};
use crate::models::{
  Block, Exercise, ExerciseMode, MuscleGroup, TemplateEntry, Workout, WorkoutLog, WorkoutTemplate,
};
use crate::store::{JournalStore, SqliteStore};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite store with all migrations applied
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_store() -> SqliteStore {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  SqliteStore::from_pool(pool)
}

pub async fn teardown_test_store(store: SqliteStore) {
  store.close().await;
}

/// Write the whole of [`mock_snapshot`] into `store`
pub async fn seed_test_journal(store: &SqliteStore) {
  let snapshot = mock_snapshot();
  for exercise in &snapshot.exercises {
    store.save_exercise(exercise).await.expect("Failed to seed exercise");
  }
  for block in &snapshot.blocks {
    store.save_block(block).await.expect("Failed to seed block");
  }
  for template in &snapshot.templates {
    store.save_template(template).await.expect("Failed to seed template");
  }
  for workout in &snapshot.workouts {
    store.save_workout(workout).await.expect("Failed to seed workout");
  }
}

/// ---------------------------------------------------------------------------
/// In-Memory Store
/// ---------------------------------------------------------------------------

pub struct MemoryStore {
  state: Mutex<Snapshot>,
  failing: HashSet<String>,
  unavailable: bool,
}

impl MemoryStore {
  pub fn new(snapshot: Snapshot) -> Self {
    Self {
      state: Mutex::new(snapshot),
      failing: HashSet::new(),
      unavailable: false,
    }
  }

  /// Completion writes for `block_id` fail
  pub fn failing_on(mut self, block_id: &str) -> Self {
    self.failing.insert(block_id.to_string());
    self
  }

  /// Every read fails
  pub fn unavailable(mut self) -> Self {
    self.unavailable = true;
    self
  }

  pub fn with_blocks(self, blocks: Vec<Block>) -> Self {
    self.state.lock().unwrap().blocks = blocks;
    self
  }

  pub fn snapshot(&self) -> Snapshot {
    self.state.lock().unwrap().clone()
  }

  fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T> {
    if self.unavailable {
      return Err(JournalError::decode("snapshot", "store unavailable"));
    }
    let state = self.state.lock().unwrap();
    Ok(f(&state))
  }
}

impl JournalStore for MemoryStore {
  async fn fetch_blocks(&self) -> Result<Vec<Block>> {
    self.read(|s| s.blocks.clone())
  }

  async fn fetch_workouts(&self) -> Result<Vec<Workout>> {
    self.read(|s| s.workouts.clone())
  }

  async fn fetch_templates(&self) -> Result<Vec<WorkoutTemplate>> {
    self.read(|s| s.templates.clone())
  }

  async fn fetch_exercises(&self) -> Result<Vec<Exercise>> {
    self.read(|s| s.exercises.clone())
  }

  async fn persist_block_completion(&self, block_id: &str, completed_at: DateTime<Utc>) -> Result<()> {
    if self.failing.contains(block_id) {
      return Err(JournalError::Database(sqlx::Error::PoolTimedOut));
    }
    let mut state = self.state.lock().unwrap();
    let block = state
      .blocks
      .iter_mut()
      .find(|b| b.id == block_id)
      .ok_or_else(|| JournalError::NotFound {
        kind: "Block",
        id: block_id.to_string(),
      })?;
    if block.completed_date.is_none() {
      block.completed_date = Some(completed_at);
    }
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

static LOG_IDS: AtomicUsize = AtomicUsize::new(1);

/// Midnight UTC on the given day
pub fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn block_between(id: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Block {
  Block {
    id: id.to_string(),
    name: id.to_string(),
    start_date: start,
    end_date: end,
    notes: None,
    created_at: start,
    updated_at: start,
    completed_date: None,
  }
}

pub fn mock_exercise(
  id: &str,
  primary: &[MuscleGroup],
  secondary: &[MuscleGroup],
  mode: ExerciseMode,
) -> Exercise {
  Exercise {
    id: id.to_string(),
    name: id.to_string(),
    primary_muscles: primary.iter().copied().collect::<BTreeSet<_>>(),
    secondary_muscles: secondary.iter().copied().collect::<BTreeSet<_>>(),
    mode,
  }
}

/// A log with a unique id. Empty `reps`/`weight` are stored as missing.
pub fn log_entry(exercise_id: &str, sets: Option<i64>, reps: &str, weight: &str, is_double: bool) -> WorkoutLog {
  let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
  WorkoutLog {
    id: format!("log-{}", LOG_IDS.fetch_add(1, Ordering::Relaxed)),
    exercise_id: exercise_id.to_string(),
    exercise_name: exercise_id.to_string(),
    sets,
    reps: text(reps),
    weight: text(weight),
    is_double,
    note: None,
  }
}

pub fn workout_on(id: &str, date: DateTime<Utc>, logs: Vec<WorkoutLog>) -> Workout {
  Workout {
    id: id.to_string(),
    name: None,
    date,
    block_id: None,
    logs,
  }
}

pub fn template_workout(
  id: &str,
  template_name: &str,
  block_id: &str,
  date: DateTime<Utc>,
  logs: Vec<WorkoutLog>,
) -> Workout {
  Workout {
    name: Some(template_name.to_string()),
    block_id: Some(block_id.to_string()),
    ..workout_on(id, date, logs)
  }
}

fn template(id: &str, name: &str, block_id: &str, exercise_ids: &[&str]) -> WorkoutTemplate {
  WorkoutTemplate {
    id: id.to_string(),
    name: name.to_string(),
    block_id: block_id.to_string(),
    entries: exercise_ids
      .iter()
      .map(|e| TemplateEntry {
        exercise_id: e.to_string(),
        exercise_name: e.to_string(),
        sets: Some(3),
        reps: Some("8-10".to_string()),
        weight: None,
        is_double: false,
        note: None,
      })
      .collect(),
  }
}

/// A small journal:
/// - `base` runs Jan 1 - Jan 28 2026 with two templates and three sessions
/// - `build` starts Feb 1 with no end, `peak` runs Mar 1 - Mar 28
/// - "Lower A" volume goes 1000 -> 1200 between its two sessions
pub fn mock_snapshot() -> Snapshot {
  use MuscleGroup::*;

  Snapshot {
    blocks: vec![
      block_between("base", utc_date(2026, 1, 1), Some(utc_date(2026, 1, 28))),
      block_between("build", utc_date(2026, 2, 1), None),
      block_between("peak", utc_date(2026, 3, 1), Some(utc_date(2026, 3, 28))),
    ],
    exercises: vec![
      mock_exercise("squat", &[Quads, Glutes], &[Core], ExerciseMode::Reps),
      mock_exercise("plank", &[Core], &[], ExerciseMode::Time),
      mock_exercise("bench", &[Chest], &[Triceps, Shoulders], ExerciseMode::Reps),
      mock_exercise("row", &[Back], &[Biceps], ExerciseMode::Reps),
    ],
    templates: vec![
      template("tpl-lower", "Lower A", "base", &["squat", "plank"]),
      template("tpl-upper", "Upper A", "base", &["bench", "row"]),
    ],
    workouts: vec![
      template_workout("w1", "Lower A", "base", utc_date(2026, 1, 5), vec![
        log_entry("squat", Some(2), "10", "25", true),
        log_entry("plank", Some(3), "60", "", false),
      ]),
      template_workout("w2", "Upper A", "base", utc_date(2026, 1, 7), vec![
        log_entry("bench", Some(3), "8", "60", false),
        log_entry("row", Some(3), "10", "20", true),
      ]),
      template_workout("w3", "Lower A", "base", utc_date(2026, 1, 12), vec![
        log_entry("squat", Some(3), "10", "20", true),
        log_entry("plank", Some(3), "75", "", false),
      ]),
    ],
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_seed_journal_populates_store() {
    let store = setup_test_store().await;
    seed_test_journal(&store).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_logs")
      .fetch_one(store.pool())
      .await
      .expect("Failed to count logs");
    assert_eq!(count, 6);

    teardown_test_store(store).await;
  }

  #[test]
  fn test_log_ids_are_unique() {
    let a = log_entry("squat", Some(1), "1", "1", false);
    let b = log_entry("squat", Some(1), "1", "1", false);
    assert_ne!(a.id, b.id);
    assert_eq!(log_entry("x", None, "", "", false).weight, None);
  }

  #[tokio::test]
  async fn test_memory_store_failure_injection() {
    let store = MemoryStore::new(mock_snapshot()).failing_on("base");
    assert!(store.persist_block_completion("base", utc_date(2026, 2, 1)).await.is_err());
    assert!(store.persist_block_completion("peak", utc_date(2026, 3, 28)).await.is_ok());
    assert!(store.persist_block_completion("nope", utc_date(2026, 3, 28)).await.is_err());
  }
}
