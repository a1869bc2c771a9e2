//! Training volume and rep totals
//!
//! Volume is `sets * reps * effective weight`. A log only contributes volume
//! when it has a positive weight, positive reps and is not time-based; rep
//! totals are counted for every log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Exercise, ExerciseMode, Workout, WorkoutLog};
use crate::parse::parse_number;

/// ---------------------------------------------------------------------------
/// Exercise Mode Lookup
/// ---------------------------------------------------------------------------

/// Exercise id -> mode. Exercises missing from reference data count as `Reps`.
#[derive(Debug, Clone, Default)]
pub struct ExerciseModes {
  modes: HashMap<String, ExerciseMode>,
}

impl ExerciseModes {
  pub fn from_exercises(exercises: &[Exercise]) -> Self {
    Self {
      modes: exercises.iter().map(|e| (e.id.clone(), e.mode)).collect(),
    }
  }

  pub fn mode_of(&self, exercise_id: &str) -> ExerciseMode {
    self.modes.get(exercise_id).copied().unwrap_or_default()
  }
}

/// ---------------------------------------------------------------------------
/// Per-Log Metrics
/// ---------------------------------------------------------------------------

fn sets_of(log: &WorkoutLog) -> f64 {
  log.sets.unwrap_or(0) as f64
}

/// Logged weight, doubled for paired loads
pub fn effective_weight(log: &WorkoutLog) -> f64 {
  let weight = parse_number(log.weight.as_deref());
  if log.is_double {
    weight * 2.0
  } else {
    weight
  }
}

pub fn log_volume(log: &WorkoutLog, mode: ExerciseMode) -> f64 {
  let weight = effective_weight(log);
  let reps = parse_number(log.reps.as_deref());
  if weight > 0.0 && reps > 0.0 && mode != ExerciseMode::Time {
    sets_of(log) * reps * weight
  } else {
    0.0
  }
}

/// `sets * reps`, regardless of weight or mode
pub fn rep_total(log: &WorkoutLog) -> f64 {
  sets_of(log) * parse_number(log.reps.as_deref())
}

/// ---------------------------------------------------------------------------
/// Per-Workout Totals
/// ---------------------------------------------------------------------------

pub fn workout_volume(workout: &Workout, modes: &ExerciseModes) -> f64 {
  workout
    .logs
    .iter()
    .fold(0.0, |acc, log| acc + log_volume(log, modes.mode_of(&log.exercise_id)))
}

pub fn workout_reps(workout: &Workout) -> f64 {
  workout.logs.iter().fold(0.0, |acc, log| acc + rep_total(log))
}

/// Sum of workout volumes, accumulated in input order
pub fn total_volume<'a, I>(workouts: I, modes: &ExerciseModes) -> f64
where
  I: IntoIterator<Item = &'a Workout>,
{
  workouts
    .into_iter()
    .fold(0.0, |acc, w| acc + workout_volume(w, modes))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkoutTotals {
  pub volume: f64,
  pub reps: f64,
  pub sets: i64,
  /// Logs that produced nonzero weighted volume
  pub weighted_logs: usize,
}

impl WorkoutTotals {
  pub fn compute(workout: &Workout, modes: &ExerciseModes) -> Self {
    let mut totals = Self::default();
    for log in &workout.logs {
      let volume = log_volume(log, modes.mode_of(&log.exercise_id));
      totals.volume += volume;
      totals.reps += rep_total(log);
      totals.sets += log.sets.unwrap_or(0);
      if volume > 0.0 {
        totals.weighted_logs += 1;
      }
    }
    totals
  }

  pub fn has_weighted_volume(&self) -> bool {
    self.weighted_logs > 0
  }
}
