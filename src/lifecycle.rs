//! Block lifecycle resolution
//!
//! Every call site derives a block's state through [`classify`]. A block is
//! completed when it carries a completion date OR its end date has passed;
//! either signal is enough.
//!
//! Auto-completion is split into a pure planning step
//! ([`auto_complete_expired`]) and an in-memory application step
//! ([`apply_completions`]). Persisting the plan is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::models::Block;

/// ---------------------------------------------------------------------------
/// Block State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BlockState {
  Planned,
  Active,
  Completed { completed_at: DateTime<Utc> },
}

impl BlockState {
  pub fn is_completed(&self) -> bool {
    matches!(self, BlockState::Completed { .. })
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BlockState::Planned => "planned",
      BlockState::Active => "active",
      BlockState::Completed { .. } => "completed",
    }
  }
}

impl std::fmt::Display for BlockState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

pub fn classify(block: &Block, now: DateTime<Utc>) -> BlockState {
  if let Some(completed_at) = block.completed_date {
    return BlockState::Completed { completed_at };
  }
  if let Some(end) = block.end_date {
    if now >= end {
      return BlockState::Completed { completed_at: end };
    }
  }
  if block.start_date > now {
    BlockState::Planned
  } else {
    BlockState::Active
  }
}

/// ---------------------------------------------------------------------------
/// Week Progress
/// ---------------------------------------------------------------------------

/// Calendar days from `from` to `to` (UTC dates, negative when `to` is earlier)
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
  (to.date_naive() - from.date_naive()).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekProgress {
  /// Block has no end date
  Ongoing,
  Scheduled {
    current_week: i64,
    /// Week count shown to the user
    total_weeks: i64,
    /// Inclusive length of the block in days
    total_days: i64,
  },
}

impl std::fmt::Display for WeekProgress {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      WeekProgress::Ongoing => write!(f, "Ongoing"),
      WeekProgress::Scheduled {
        current_week,
        total_weeks,
        ..
      } => write!(f, "Week {} of {}", current_week, total_weeks),
    }
  }
}

pub fn week_progress(block: &Block, now: DateTime<Utc>) -> WeekProgress {
  let Some(end) = block.end_date else {
    return WeekProgress::Ongoing;
  };

  let total_days = (days_between(block.start_date, end) + 1).max(1);
  let total_weeks = ((total_days + 6) / 7).max(1);
  let elapsed_days = days_between(block.start_date, now).max(0);
  let current_week = (elapsed_days / 7 + 1).min(total_weeks);

  WeekProgress::Scheduled {
    current_week,
    total_weeks,
    total_days,
  }
}

/// ---------------------------------------------------------------------------
/// Auto-Completion
/// ---------------------------------------------------------------------------

/// An intended completion, to be persisted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCompletion {
  pub block_id: String,
  pub completed_at: DateTime<Utc>,
}

impl BlockCompletion {
  /// Returns true when the block changed
  pub fn apply(&self, block: &mut Block) -> bool {
    if block.id != self.block_id || block.completed_date.is_some() {
      return false;
    }
    block.completed_date = Some(self.completed_at);
    block.updated_at = block.updated_at.max(self.completed_at);
    true
  }
}

/// Blocks whose end date has passed but carry no completion date yet.
/// Pure: nothing is mutated.
pub fn auto_complete_expired(blocks: &[Block], now: DateTime<Utc>) -> Vec<BlockCompletion> {
  blocks
    .iter()
    .filter(|b| b.completed_date.is_none())
    .filter_map(|b| match b.end_date {
      Some(end) if now >= end => Some(BlockCompletion {
        block_id: b.id.clone(),
        completed_at: end,
      }),
      _ => None,
    })
    .collect()
}

/// Apply completions in memory. Returns the ids that actually changed.
pub fn apply_completions(blocks: &mut [Block], completions: &[BlockCompletion]) -> Vec<String> {
  let mut changed = Vec::new();
  for completion in completions {
    for block in blocks.iter_mut() {
      if completion.apply(block) {
        changed.push(block.id.clone());
      }
    }
  }
  changed
}

/// ---------------------------------------------------------------------------
/// Grouping
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BlockPartition<'a> {
  /// Most recently started first
  pub active: Vec<&'a Block>,
  /// Soonest first
  pub planned: Vec<&'a Block>,
  /// Most recently completed first
  pub completed: Vec<&'a Block>,
}

pub fn partition_blocks(blocks: &[Block], now: DateTime<Utc>) -> BlockPartition<'_> {
  let mut partition = BlockPartition::default();
  let mut completed: Vec<(DateTime<Utc>, &Block)> = Vec::new();

  for block in blocks {
    match classify(block, now) {
      BlockState::Active => partition.active.push(block),
      BlockState::Planned => partition.planned.push(block),
      BlockState::Completed { completed_at } => completed.push((completed_at, block)),
    }
  }

  partition.active.sort_by_key(|b| Reverse(b.start_date));
  partition.planned.sort_by_key(|b| b.start_date);
  completed.sort_by_key(|(at, _)| Reverse(*at));
  partition.completed = completed.into_iter().map(|(_, b)| b).collect();

  partition
}

/// The active block that started most recently
pub fn current_block(blocks: &[Block], now: DateTime<Utc>) -> Option<&Block> {
  blocks
    .iter()
    .filter(|b| classify(b, now) == BlockState::Active)
    .max_by_key(|b| b.start_date)
}
