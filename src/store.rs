use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::{BTreeSet, HashMap};

use crate::config::JournalConfig;
use crate::error::{JournalError, Result};
use crate::models::{Block, Exercise, ExerciseMode, MuscleGroup, TemplateEntry, Workout, WorkoutLog, WorkoutTemplate};

/// Snapshot reads and completion writes the engine needs from persistence.
///
/// Reads return the full collection; there is no paging or filtering.
/// `persist_block_completion` must be idempotent.
#[allow(async_fn_in_trait)]
pub trait JournalStore {
  async fn fetch_blocks(&self) -> Result<Vec<Block>>;
  async fn fetch_workouts(&self) -> Result<Vec<Workout>>;
  async fn fetch_templates(&self) -> Result<Vec<WorkoutTemplate>>;
  async fn fetch_exercises(&self) -> Result<Vec<Exercise>>;
  async fn persist_block_completion(&self, block_id: &str, completed_at: DateTime<Utc>) -> Result<()>;
}

/// ---------------------------------------------------------------------------
/// SQLite Store
/// ---------------------------------------------------------------------------

pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Open the connection pool and run migrations
  pub async fn connect(config: &JournalConfig) -> Result<Self> {
    tracing::info!(url = %config.database_url, "Initializing database");

    let pool = SqlitePoolOptions::new()
      .max_connections(config.max_connections)
      .connect(&config.database_url)
      .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database initialized successfully");
    Ok(Self { pool })
  }

  /// Wrap an existing pool. Migrations are assumed to have run.
  pub fn from_pool(pool: SqlitePool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  pub async fn close(self) {
    self.pool.close().await;
  }

  pub async fn save_exercise(&self, exercise: &Exercise) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO exercises (id, name, primary_muscles_json, secondary_muscles_json, mode)
      VALUES (?1, ?2, ?3, ?4, ?5)
      ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        primary_muscles_json = excluded.primary_muscles_json,
        secondary_muscles_json = excluded.secondary_muscles_json,
        mode = excluded.mode
      "#,
    )
    .bind(&exercise.id)
    .bind(&exercise.name)
    .bind(serde_json::to_string(&exercise.primary_muscles)?)
    .bind(serde_json::to_string(&exercise.secondary_muscles)?)
    .bind(exercise.mode.to_string())
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn save_block(&self, block: &Block) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO blocks (id, name, start_date, end_date, notes, created_at, updated_at, completed_date)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        start_date = excluded.start_date,
        end_date = excluded.end_date,
        notes = excluded.notes,
        updated_at = excluded.updated_at,
        completed_date = excluded.completed_date
      "#,
    )
    .bind(&block.id)
    .bind(&block.name)
    .bind(block.start_date.to_rfc3339())
    .bind(block.end_date.map(|d| d.to_rfc3339()))
    .bind(&block.notes)
    .bind(block.created_at.to_rfc3339())
    .bind(block.updated_at.to_rfc3339())
    .bind(block.completed_date.map(|d| d.to_rfc3339()))
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn save_template(&self, template: &WorkoutTemplate) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO workout_templates (id, name, block_id, entries_json)
      VALUES (?1, ?2, ?3, ?4)
      ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        block_id = excluded.block_id,
        entries_json = excluded.entries_json
      "#,
    )
    .bind(&template.id)
    .bind(&template.name)
    .bind(&template.block_id)
    .bind(serde_json::to_string(&template.entries)?)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  /// Insert or replace a workout together with its logs
  pub async fn save_workout(&self, workout: &Workout) -> Result<()> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
      INSERT INTO workouts (id, name, date, block_id)
      VALUES (?1, ?2, ?3, ?4)
      ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        date = excluded.date,
        block_id = excluded.block_id
      "#,
    )
    .bind(&workout.id)
    .bind(&workout.name)
    .bind(workout.date.to_rfc3339())
    .bind(&workout.block_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM workout_logs WHERE workout_id = ?1")
      .bind(&workout.id)
      .execute(&mut *tx)
      .await?;

    for (position, log) in workout.logs.iter().enumerate() {
      sqlx::query(
        r#"
        INSERT INTO workout_logs (
          id, workout_id, position, exercise_id, exercise_name,
          sets, reps, weight, is_double, note
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
      )
      .bind(&log.id)
      .bind(&workout.id)
      .bind(position as i64)
      .bind(&log.exercise_id)
      .bind(&log.exercise_name)
      .bind(log.sets)
      .bind(&log.reps)
      .bind(&log.weight)
      .bind(log.is_double)
      .bind(&log.note)
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await?;
    Ok(())
  }

  /// Delete a block and the templates scoped to it. Workouts tagged with the
  /// block are kept.
  pub async fn delete_block(&self, block_id: &str) -> Result<()> {
    let mut tx = self.pool.begin().await?;

    sqlx::query("DELETE FROM workout_templates WHERE block_id = ?1")
      .bind(block_id)
      .execute(&mut *tx)
      .await?;

    let result = sqlx::query("DELETE FROM blocks WHERE id = ?1")
      .bind(block_id)
      .execute(&mut *tx)
      .await?;

    if result.rows_affected() == 0 {
      return Err(JournalError::NotFound {
        kind: "Block",
        id: block_id.to_string(),
      });
    }

    tx.commit().await?;
    Ok(())
  }
}

impl JournalStore for SqliteStore {
  async fn fetch_blocks(&self) -> Result<Vec<Block>> {
    let rows = sqlx::query(
      r#"
      SELECT id, name, start_date, end_date, notes, created_at, updated_at, completed_date
      FROM blocks
      ORDER BY start_date
      "#,
    )
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(block_from_row).collect()
  }

  async fn fetch_workouts(&self) -> Result<Vec<Workout>> {
    let log_rows = sqlx::query(
      r#"
      SELECT id, workout_id, exercise_id, exercise_name, sets, reps, weight, is_double, note
      FROM workout_logs
      ORDER BY workout_id, position
      "#,
    )
    .fetch_all(&self.pool)
    .await?;

    let mut logs: HashMap<String, Vec<WorkoutLog>> = HashMap::new();
    for row in &log_rows {
      let workout_id: String = row.try_get("workout_id")?;
      logs.entry(workout_id).or_default().push(WorkoutLog {
        id: row.try_get("id")?,
        exercise_id: row.try_get("exercise_id")?,
        exercise_name: row.try_get("exercise_name")?,
        sets: row.try_get("sets")?,
        reps: row.try_get("reps")?,
        weight: row.try_get("weight")?,
        is_double: row.try_get("is_double")?,
        note: row.try_get("note")?,
      });
    }

    let rows = sqlx::query("SELECT id, name, date, block_id FROM workouts ORDER BY date")
      .fetch_all(&self.pool)
      .await?;

    let mut workouts = Vec::with_capacity(rows.len());
    for row in &rows {
      let id: String = row.try_get("id")?;
      let date: String = row.try_get("date")?;
      workouts.push(Workout {
        logs: logs.remove(&id).unwrap_or_default(),
        id,
        name: row.try_get("name")?,
        date: parse_timestamp("date", &date)?,
        block_id: row.try_get("block_id")?,
      });
    }

    tracing::debug!(count = workouts.len(), "Loaded workouts");
    Ok(workouts)
  }

  async fn fetch_templates(&self) -> Result<Vec<WorkoutTemplate>> {
    let rows = sqlx::query(
      "SELECT id, name, block_id, entries_json FROM workout_templates ORDER BY block_id, name",
    )
    .fetch_all(&self.pool)
    .await?;

    let mut templates = Vec::with_capacity(rows.len());
    for row in &rows {
      let entries_json: String = row.try_get("entries_json")?;
      let entries: Vec<TemplateEntry> = serde_json::from_str(&entries_json)
        .map_err(|e| JournalError::decode("entries_json", e.to_string()))?;
      templates.push(WorkoutTemplate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        block_id: row.try_get("block_id")?,
        entries,
      });
    }

    Ok(templates)
  }

  async fn fetch_exercises(&self) -> Result<Vec<Exercise>> {
    let rows = sqlx::query(
      r#"
      SELECT id, name, primary_muscles_json, secondary_muscles_json, mode
      FROM exercises
      ORDER BY name
      "#,
    )
    .fetch_all(&self.pool)
    .await?;

    let mut exercises = Vec::with_capacity(rows.len());
    for row in &rows {
      let mode: String = row.try_get("mode")?;
      exercises.push(Exercise {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        primary_muscles: muscles_from_row(row, "primary_muscles_json")?,
        secondary_muscles: muscles_from_row(row, "secondary_muscles_json")?,
        mode: mode
          .parse::<ExerciseMode>()
          .map_err(|e| JournalError::decode("mode", e))?,
      });
    }

    Ok(exercises)
  }

  async fn persist_block_completion(&self, block_id: &str, completed_at: DateTime<Utc>) -> Result<()> {
    let stamp = completed_at.to_rfc3339();
    let result = sqlx::query(
      r#"
      UPDATE blocks
      SET completed_date = ?1,
          updated_at = CASE WHEN updated_at > ?1 THEN updated_at ELSE ?1 END
      WHERE id = ?2 AND completed_date IS NULL
      "#,
    )
    .bind(&stamp)
    .bind(block_id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      // Already completed is fine; a missing block is not
      let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocks WHERE id = ?1")
        .bind(block_id)
        .fetch_one(&self.pool)
        .await?;
      if exists == 0 {
        return Err(JournalError::NotFound {
          kind: "Block",
          id: block_id.to_string(),
        });
      }
    }

    tracing::debug!(block_id, completed_at = %stamp, "Persisted block completion");
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Row Decoding
/// ---------------------------------------------------------------------------

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| JournalError::decode(column, format!("{} ({})", e, value)))
}

fn optional_timestamp(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>> {
  let value: Option<String> = row.try_get(column)?;
  value.map(|v| parse_timestamp(column, &v)).transpose()
}

fn block_from_row(row: &SqliteRow) -> Result<Block> {
  let start_date: String = row.try_get("start_date")?;
  let created_at: String = row.try_get("created_at")?;
  let updated_at: String = row.try_get("updated_at")?;

  Ok(Block {
    id: row.try_get("id")?,
    name: row.try_get("name")?,
    start_date: parse_timestamp("start_date", &start_date)?,
    end_date: optional_timestamp(row, "end_date")?,
    notes: row.try_get("notes")?,
    created_at: parse_timestamp("created_at", &created_at)?,
    updated_at: parse_timestamp("updated_at", &updated_at)?,
    completed_date: optional_timestamp(row, "completed_date")?,
  })
}

fn muscles_from_row(row: &SqliteRow, column: &str) -> Result<BTreeSet<MuscleGroup>> {
  let json: String = row.try_get(column)?;
  serde_json::from_str(&json).map_err(|e| JournalError::decode(column, e.to_string()))
}
