pub mod block;
pub mod exercise;
pub mod workout;

pub use block::Block;
pub use exercise::{Exercise, ExerciseMode, MuscleGroup};
pub use workout::{TemplateEntry, Workout, WorkoutLog, WorkoutTemplate};
