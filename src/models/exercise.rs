use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ---------------------------------------------------------------------------
/// Muscle Groups
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
  Chest,
  Back,
  Shoulders,
  Biceps,
  Triceps,
  Forearms,
  Core,
  Quads,
  Hamstrings,
  Glutes,
  Calves,
}

impl MuscleGroup {
  pub const ALL: [MuscleGroup; 11] = [
    MuscleGroup::Chest,
    MuscleGroup::Back,
    MuscleGroup::Shoulders,
    MuscleGroup::Biceps,
    MuscleGroup::Triceps,
    MuscleGroup::Forearms,
    MuscleGroup::Core,
    MuscleGroup::Quads,
    MuscleGroup::Hamstrings,
    MuscleGroup::Glutes,
    MuscleGroup::Calves,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      MuscleGroup::Chest => "chest",
      MuscleGroup::Back => "back",
      MuscleGroup::Shoulders => "shoulders",
      MuscleGroup::Biceps => "biceps",
      MuscleGroup::Triceps => "triceps",
      MuscleGroup::Forearms => "forearms",
      MuscleGroup::Core => "core",
      MuscleGroup::Quads => "quads",
      MuscleGroup::Hamstrings => "hamstrings",
      MuscleGroup::Glutes => "glutes",
      MuscleGroup::Calves => "calves",
    }
  }
}

impl std::fmt::Display for MuscleGroup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for MuscleGroup {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let needle = s.trim().to_lowercase();
    MuscleGroup::ALL
      .iter()
      .copied()
      .find(|m| m.as_str() == needle)
      .ok_or_else(|| format!("Unknown muscle group: {}", s))
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Reference Data
/// ---------------------------------------------------------------------------

/// How an exercise is measured. Time-based work (holds, carries for time)
/// never contributes weighted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseMode {
  #[default]
  Reps,
  Time,
}

impl std::fmt::Display for ExerciseMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Reps => write!(f, "reps"),
      Self::Time => write!(f, "time"),
    }
  }
}

impl std::str::FromStr for ExerciseMode {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "reps" => Ok(Self::Reps),
      "time" => Ok(Self::Time),
      _ => Err(format!("Unknown exercise mode: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: String,
  pub name: String,
  pub primary_muscles: BTreeSet<MuscleGroup>,
  pub secondary_muscles: BTreeSet<MuscleGroup>,
  #[serde(default)]
  pub mode: ExerciseMode,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_muscle_group_parse_is_case_insensitive() {
    assert_eq!("Chest".parse::<MuscleGroup>(), Ok(MuscleGroup::Chest));
    assert_eq!(" hamstrings ".parse::<MuscleGroup>(), Ok(MuscleGroup::Hamstrings));
    assert!("neck".parse::<MuscleGroup>().is_err());
  }

  #[test]
  fn test_exercise_mode_defaults_to_reps() {
    let json = r#"{"id":"e1","name":"Plank","primary_muscles":["core"],"secondary_muscles":[]}"#;
    let exercise: Exercise = serde_json::from_str(json).unwrap();
    assert_eq!(exercise.mode, ExerciseMode::Reps);
    assert!(exercise.primary_muscles.contains(&MuscleGroup::Core));
  }

  #[test]
  fn test_exercise_mode_display_roundtrips_through_from_str() {
    for mode in [ExerciseMode::Reps, ExerciseMode::Time] {
      assert_eq!(mode.to_string().parse::<ExerciseMode>(), Ok(mode));
    }
  }
}
