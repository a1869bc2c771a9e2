//! Muscle balance aggregation
//!
//! Counts working sets per muscle group (primary and secondary separately)
//! across a filtered set of workouts, and condenses the primary distribution
//! into a 0-100 balance score: 100 when every trained group got the same
//! number of sets, falling toward 0 as the distribution gets spikier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::{Exercise, MuscleGroup, Workout};

/// ---------------------------------------------------------------------------
/// Workout Filter
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum WorkoutFilter {
  All,
  Block(String),
  Since(DateTime<Utc>),
  /// Inclusive on both ends
  Between {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  },
  Custom(fn(&Workout) -> bool),
}

impl WorkoutFilter {
  pub fn matches(&self, workout: &Workout) -> bool {
    match self {
      WorkoutFilter::All => true,
      WorkoutFilter::Block(block_id) => workout.belongs_to(block_id),
      WorkoutFilter::Since(from) => workout.date >= *from,
      WorkoutFilter::Between { from, to } => workout.date >= *from && workout.date <= *to,
      WorkoutFilter::Custom(predicate) => predicate(workout),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Aggregation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleBalance {
  pub primary: BTreeMap<MuscleGroup, i64>,
  pub secondary: BTreeMap<MuscleGroup, i64>,
  pub score: i64,
}

pub fn aggregate(workouts: &[Workout], exercises: &[Exercise], filter: &WorkoutFilter) -> MuscleBalance {
  let lookup: HashMap<&str, &Exercise> = exercises.iter().map(|e| (e.id.as_str(), e)).collect();

  let mut primary: BTreeMap<MuscleGroup, i64> = BTreeMap::new();
  let mut secondary: BTreeMap<MuscleGroup, i64> = BTreeMap::new();
  let mut skipped = 0usize;

  for workout in workouts.iter().filter(|w| filter.matches(w)) {
    for log in &workout.logs {
      let Some(exercise) = lookup.get(log.exercise_id.as_str()) else {
        skipped += 1;
        continue;
      };
      let sets = log.sets.unwrap_or(0);
      if sets <= 0 {
        continue;
      }
      for muscle in &exercise.primary_muscles {
        *primary.entry(*muscle).or_insert(0) += sets;
      }
      for muscle in &exercise.secondary_muscles {
        *secondary.entry(*muscle).or_insert(0) += sets;
      }
    }
  }

  if skipped > 0 {
    tracing::debug!(skipped, "Skipped logs referencing unknown exercises");
  }

  let score = balance_score(&primary);
  MuscleBalance {
    primary,
    secondary,
    score,
  }
}

/// Share of `muscle` in `counts`, 0.0 when nothing was counted
pub fn percent(muscle: MuscleGroup, counts: &BTreeMap<MuscleGroup, i64>) -> f64 {
  let total: i64 = counts.values().sum();
  if total == 0 {
    return 0.0;
  }
  counts.get(&muscle).copied().unwrap_or(0) as f64 / total as f64
}

/// Balance score over the groups that received primary sets; untrained
/// groups are ignored. No trained group at all scores 100.
pub fn balance_score(primary: &BTreeMap<MuscleGroup, i64>) -> i64 {
  let counts: Vec<f64> = primary
    .values()
    .filter(|c| **c > 0)
    .map(|c| *c as f64)
    .collect();

  if counts.is_empty() {
    return 100;
  }

  let n = counts.len() as f64;
  let mean = counts.iter().sum::<f64>() / n;
  let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
  let cv = variance.sqrt() / mean;

  (((1.0 - cv) * 100.0).round() as i64).clamp(0, 100)
}

impl MuscleBalance {
  pub fn total_sets(&self) -> i64 {
    self.primary.values().sum()
  }

  pub fn primary_percent(&self, muscle: MuscleGroup) -> f64 {
    percent(muscle, &self.primary)
  }

  pub fn secondary_percent(&self, muscle: MuscleGroup) -> f64 {
    percent(muscle, &self.secondary)
  }

  /// Tracked groups with the fewest primary sets, untrained groups included
  pub fn least_trained(&self, n: usize) -> Vec<(MuscleGroup, i64)> {
    let mut ranked = self.ranked();
    ranked.sort_by_key(|(_, count)| *count);
    ranked.into_iter().take(n).collect()
  }

  pub fn most_trained(&self, n: usize) -> Vec<(MuscleGroup, i64)> {
    let mut ranked = self.ranked();
    ranked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    ranked.into_iter().filter(|(_, count)| *count > 0).take(n).collect()
  }

  fn ranked(&self) -> Vec<(MuscleGroup, i64)> {
    MuscleGroup::ALL
      .iter()
      .map(|m| (*m, self.primary.get(m).copied().unwrap_or(0)))
      .collect()
  }
}
