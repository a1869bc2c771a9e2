//! Template Progress Comparator
//!
//! Compares the two most recent completions of a template within a block.
//!
//! Key rules:
//! - Workouts are matched to templates by name, scoped to the block
//! - Fewer than two completions means "not enough history", not an error
//! - A latest value of zero means "nothing comparable was logged" and yields
//!   no delta, which keeps it distinct from flat progress
//! - Weighted volume is compared when the latest session logged any;
//!   otherwise rep totals are compared

use serde::{Deserialize, Serialize};

use crate::models::Workout;
use crate::volume::{log_volume, rep_total, workout_reps, workout_volume, ExerciseModes, WorkoutTotals};

// ---------------------------------------------------------------------------
/// Metric and Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMetric {
    Volume,
    Reps,
}

impl std::fmt::Display for ProgressMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volume => write!(f, "volume"),
            Self::Reps => write!(f, "reps"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improved,
    Declined,
    Flat,
}

impl Direction {
    fn of(delta: i64) -> Self {
        match delta {
            d if d > 0 => Direction::Improved,
            d if d < 0 => Direction::Declined,
            _ => Direction::Flat,
        }
    }
}

// ---------------------------------------------------------------------------
/// Occurrences
// ---------------------------------------------------------------------------

/// Completions of `template_name` in `block_id`, newest first.
/// Same-day sessions keep their input order.
pub fn template_occurrences<'a>(
    workouts: &'a [Workout],
    template_name: &str,
    block_id: &str,
) -> Vec<&'a Workout> {
    let mut matches: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.belongs_to(block_id) && w.name.as_deref() == Some(template_name))
        .collect();
    matches.sort_by(|a, b| b.date.cmp(&a.date));
    matches
}

fn latest_pair<'a>(
    workouts: &'a [Workout],
    template_name: &str,
    block_id: &str,
) -> Option<(&'a Workout, &'a Workout)> {
    let occurrences = template_occurrences(workouts, template_name, block_id);
    match occurrences.as_slice() {
        [latest, previous, ..] => Some((*latest, *previous)),
        _ => None,
    }
}

fn delta_of(latest: f64, previous: f64) -> Option<i64> {
    if latest == 0.0 {
        None
    } else {
        Some((latest - previous).round() as i64)
    }
}

// ---------------------------------------------------------------------------
/// Template Deltas
// ---------------------------------------------------------------------------

/// Weighted volume of the latest completion minus the one before it
pub fn volume_delta(
    workouts: &[Workout],
    template_name: &str,
    block_id: &str,
    modes: &ExerciseModes,
) -> Option<i64> {
    let (latest, previous) = latest_pair(workouts, template_name, block_id)?;
    delta_of(workout_volume(latest, modes), workout_volume(previous, modes))
}

/// Rep total of the latest completion minus the one before it
pub fn reps_delta(workouts: &[Workout], template_name: &str, block_id: &str) -> Option<i64> {
    let (latest, previous) = latest_pair(workouts, template_name, block_id)?;
    delta_of(workout_reps(latest), workout_reps(previous))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProgress {
    pub template_name: String,
    pub metric: ProgressMetric,
    pub latest: f64,
    pub previous: f64,
    pub delta: i64,
    pub occurrences: usize,
}

impl TemplateProgress {
    pub fn direction(&self) -> Direction {
        Direction::of(self.delta)
    }
}

/// Progress on whichever metric applies to the latest completion
pub fn template_progress(
    workouts: &[Workout],
    template_name: &str,
    block_id: &str,
    modes: &ExerciseModes,
) -> Option<TemplateProgress> {
    let occurrences = template_occurrences(workouts, template_name, block_id);
    let [latest, previous, ..] = occurrences.as_slice() else {
        return None;
    };

    let latest_totals = WorkoutTotals::compute(latest, modes);
    let previous_totals = WorkoutTotals::compute(previous, modes);

    let (metric, latest_value, previous_value) = if latest_totals.has_weighted_volume() {
        (ProgressMetric::Volume, latest_totals.volume, previous_totals.volume)
    } else {
        (ProgressMetric::Reps, latest_totals.reps, previous_totals.reps)
    };

    let delta = delta_of(latest_value, previous_value)?;
    Some(TemplateProgress {
        template_name: template_name.to_string(),
        metric,
        latest: latest_value,
        previous: previous_value,
        delta,
        occurrences: occurrences.len(),
    })
}

// ---------------------------------------------------------------------------
/// Per-Exercise Deltas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub exercise_id: String,
    pub exercise_name: String,
    pub metric: ProgressMetric,
    pub delta: i64,
}

fn exercise_totals(workout: &Workout, exercise_id: &str, modes: &ExerciseModes) -> Option<(f64, f64)> {
    let mode = modes.mode_of(exercise_id);
    let mut found = false;
    let mut volume = 0.0;
    let mut reps = 0.0;
    for log in workout.logs.iter().filter(|l| l.exercise_id == exercise_id) {
        found = true;
        volume += log_volume(log, mode);
        reps += rep_total(log);
    }
    found.then_some((volume, reps))
}

/// Deltas per exercise between the latest two completions, in the order the
/// latest session logged them. Exercises absent from either session are skipped.
pub fn exercise_progress(
    workouts: &[Workout],
    template_name: &str,
    block_id: &str,
    modes: &ExerciseModes,
) -> Vec<ExerciseProgress> {
    let Some((latest, previous)) = latest_pair(workouts, template_name, block_id) else {
        return Vec::new();
    };

    let mut seen: Vec<&str> = Vec::new();
    let mut results = Vec::new();

    for log in &latest.logs {
        let id = log.exercise_id.as_str();
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);

        let (Some(current), Some(before)) = (
            exercise_totals(latest, id, modes),
            exercise_totals(previous, id, modes),
        ) else {
            continue;
        };

        let (metric, delta) = if current.0 > 0.0 {
            (ProgressMetric::Volume, delta_of(current.0, before.0))
        } else {
            (ProgressMetric::Reps, delta_of(current.1, before.1))
        };

        if let Some(delta) = delta {
            results.push(ExerciseProgress {
                exercise_id: id.to_string(),
                exercise_name: log.exercise_name.clone(),
                metric,
                delta,
            });
        }
    }

    results
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
