use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exercise's recorded performance within a workout.
///
/// `reps` and `weight` are free text so users can write ranges ("8-10") or
/// annotations ("20kg"); they are parsed leniently for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
  pub id: String,
  pub exercise_id: String,
  pub exercise_name: String,
  pub sets: Option<i64>,
  pub reps: Option<String>,
  pub weight: Option<String>,
  /// Weight is one of a pair of equal loads (two dumbbells, two kettlebells)
  #[serde(default)]
  pub is_double: bool,
  pub note: Option<String>,
}

/// A single logged session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
  pub id: String,
  /// Name of the template this session instantiates, if any
  pub name: Option<String>,
  pub date: DateTime<Utc>,
  pub block_id: Option<String>,
  #[serde(default)]
  pub logs: Vec<WorkoutLog>,
}

impl Workout {
  pub fn belongs_to(&self, block_id: &str) -> bool {
    self.block_id.as_deref() == Some(block_id)
  }
}

/// A planned exercise inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
  pub exercise_id: String,
  pub exercise_name: String,
  pub sets: Option<i64>,
  pub reps: Option<String>,
  pub weight: Option<String>,
  #[serde(default)]
  pub is_double: bool,
  pub note: Option<String>,
}

/// A named, ordered exercise plan scoped to exactly one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
  pub id: String,
  pub name: String,
  pub block_id: String,
  #[serde(default)]
  pub entries: Vec<TemplateEntry>,
}
