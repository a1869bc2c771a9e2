//! Snapshot orchestration
//!
//! One run loads the whole journal, settles expired blocks, then computes the
//! report from the settled snapshot. All analytics are pure functions over
//! the snapshot; the store is touched only by [`Snapshot::load`] and
//! [`refresh`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::balance::{aggregate, MuscleBalance, WorkoutFilter};
use crate::config::JournalConfig;
use crate::error::Result;
use crate::lifecycle::{
  apply_completions, auto_complete_expired, classify, current_block, week_progress, BlockState,
  WeekProgress,
};
use crate::models::{Block, Exercise, MuscleGroup, Workout, WorkoutTemplate};
use crate::progress::{exercise_progress, template_progress, ExerciseProgress, TemplateProgress};
use crate::store::JournalStore;
use crate::volume::{total_volume, ExerciseModes};

/// ---------------------------------------------------------------------------
/// Snapshot
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
  pub blocks: Vec<Block>,
  pub workouts: Vec<Workout>,
  pub templates: Vec<WorkoutTemplate>,
  pub exercises: Vec<Exercise>,
}

impl Snapshot {
  pub async fn load<S: JournalStore>(store: &S) -> Result<Self> {
    let snapshot = Self {
      blocks: store.fetch_blocks().await?,
      workouts: store.fetch_workouts().await?,
      templates: store.fetch_templates().await?,
      exercises: store.fetch_exercises().await?,
    };

    tracing::info!(
      blocks = snapshot.blocks.len(),
      workouts = snapshot.workouts.len(),
      templates = snapshot.templates.len(),
      exercises = snapshot.exercises.len(),
      "Loaded journal snapshot"
    );
    Ok(snapshot)
  }

  /// Drop a block and its templates. Workouts tagged with it stay.
  pub fn remove_block(&mut self, block_id: &str) -> Option<Block> {
    let index = self.blocks.iter().position(|b| b.id == block_id)?;
    self.templates.retain(|t| t.block_id != block_id);
    Some(self.blocks.remove(index))
  }

  pub fn templates_for<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a WorkoutTemplate> + 'a {
    self.templates.iter().filter(move |t| t.block_id == block_id)
  }

  pub fn workouts_for<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a Workout> + 'a {
    self.workouts.iter().filter(move |w| w.belongs_to(block_id))
  }
}

/// ---------------------------------------------------------------------------
/// Refresh (auto-completion)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFailure {
  pub block_id: String,
  pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
  /// Snapshot with every intended completion applied
  pub snapshot: Snapshot,
  /// Blocks whose completion was persisted
  pub completed: Vec<String>,
  /// Blocks whose completion could not be persisted; a later run retries them
  pub failures: Vec<CompletionFailure>,
}

/// Load the journal and settle expired blocks.
///
/// Each completion is persisted on its own; one failure does not stop the
/// rest. The returned snapshot treats every planned completion as applied,
/// including failed ones, which matches what [`classify`] derives from the
/// end date anyway.
pub async fn refresh<S: JournalStore>(store: &S, now: DateTime<Utc>) -> Result<RefreshOutcome> {
  let mut snapshot = Snapshot::load(store).await?;
  let planned = auto_complete_expired(&snapshot.blocks, now);

  let mut completed = Vec::new();
  let mut failures = Vec::new();

  for completion in &planned {
    match store
      .persist_block_completion(&completion.block_id, completion.completed_at)
      .await
    {
      Ok(()) => completed.push(completion.block_id.clone()),
      Err(e) => {
        tracing::warn!(block_id = %completion.block_id, error = %e, "Failed to persist block completion");
        failures.push(CompletionFailure {
          block_id: completion.block_id.clone(),
          error: e.to_string(),
        });
      }
    }
  }

  apply_completions(&mut snapshot.blocks, &planned);

  if !planned.is_empty() {
    tracing::info!(
      completed = completed.len(),
      failed = failures.len(),
      "Auto-completed expired blocks"
    );
  }

  Ok(RefreshOutcome {
    snapshot,
    completed,
    failures,
  })
}

/// ---------------------------------------------------------------------------
/// Training Report
/// ---------------------------------------------------------------------------

/// Muscle groups listed in each direction of the balance hint
const BALANCE_HINT_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockOverview {
  pub id: String,
  pub name: String,
  pub state: BlockState,
  pub week_progress: WeekProgress,
  /// Display text, e.g. "Week 3 of 4" or "Ongoing"
  pub week_label: String,
  pub workout_count: usize,
  pub total_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateReport {
  pub template_id: String,
  pub progress: Option<TemplateProgress>,
  pub exercises: Vec<ExerciseProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
  pub generated_at: DateTime<Utc>,
  pub blocks: Vec<BlockOverview>,
  pub current_block_id: Option<String>,
  /// Current block if there is one, otherwise the trailing balance window
  pub muscle_balance: MuscleBalance,
  /// Fewest primary sets first, untrained groups included
  pub neglected_muscles: Vec<(MuscleGroup, i64)>,
  pub most_trained_muscles: Vec<(MuscleGroup, i64)>,
  pub templates: Vec<TemplateReport>,
}

impl TrainingReport {
  pub fn compute(snapshot: &Snapshot, now: DateTime<Utc>, config: &JournalConfig) -> Self {
    let modes = ExerciseModes::from_exercises(&snapshot.exercises);

    let blocks = snapshot
      .blocks
      .iter()
      .map(|block| {
        let progress = week_progress(block, now);
        BlockOverview {
          id: block.id.clone(),
          name: block.name.clone(),
          state: classify(block, now),
          week_progress: progress,
          week_label: progress.to_string(),
          workout_count: snapshot.workouts_for(&block.id).count(),
          total_volume: total_volume(snapshot.workouts_for(&block.id), &modes),
        }
      })
      .collect();

    let current = current_block(&snapshot.blocks, now);

    let filter = match current {
      Some(block) => WorkoutFilter::Block(block.id.clone()),
      None => WorkoutFilter::Since(now - Duration::days(config.balance_window_days)),
    };
    let muscle_balance = aggregate(&snapshot.workouts, &snapshot.exercises, &filter);
    let neglected_muscles = muscle_balance.least_trained(BALANCE_HINT_SIZE);
    let most_trained_muscles = muscle_balance.most_trained(BALANCE_HINT_SIZE);

    let templates = current
      .map(|block| {
        snapshot
          .templates_for(&block.id)
          .map(|t| TemplateReport {
            template_id: t.id.clone(),
            progress: template_progress(&snapshot.workouts, &t.name, &block.id, &modes),
            exercises: exercise_progress(&snapshot.workouts, &t.name, &block.id, &modes),
          })
          .collect()
      })
      .unwrap_or_default();

    Self {
      generated_at: now,
      blocks,
      current_block_id: current.map(|b| b.id.clone()),
      muscle_balance,
      neglected_muscles,
      most_trained_muscles,
      templates,
    }
  }
}
