// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged workouts, their sets, and coach reviews.

use super::{is_foreign_key_violation, map_unique, Database, StoreError, StoreResult};
use crate::models::{
    HistoryEntry, ReviewStatus, Workout, WorkoutReview, WorkoutSet, WorkoutSetInput,
    WorkoutSummary,
};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn row_to_workout(row: &SqliteRow) -> Result<Workout, sqlx::Error> {
    Ok(Workout {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        date: row.try_get("date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_workout_set(row: &SqliteRow) -> Result<WorkoutSet, sqlx::Error> {
    Ok(WorkoutSet {
        id: row.try_get("id")?,
        workout_id: row.try_get("workout_id")?,
        exercise_id: row.try_get("exercise_id")?,
        exercise_name: row.try_get("exercise_name")?,
        set_number: row.try_get("set_number")?,
        reps: row.try_get("reps")?,
        weight: row.try_get("weight")?,
        notes: row.try_get("notes")?,
    })
}

/// Stored status strings are guarded by a CHECK constraint; anything else
/// means the row was written outside this crate.
fn decode_status(raw: &str) -> Result<ReviewStatus, sqlx::Error> {
    ReviewStatus::parse(raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown review status {raw:?}").into(),
    })
}

fn row_to_review(row: &SqliteRow) -> Result<WorkoutReview, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(WorkoutReview {
        id: row.try_get("id")?,
        workout_id: row.try_get("workout_id")?,
        coach_id: row.try_get("coach_id")?,
        coach_name: row.try_get("coach_name")?,
        status: decode_status(&status)?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Start a workout for `date`. One workout per athlete per day.
    pub async fn create_workout(
        &self,
        athlete_id: i64,
        date: NaiveDate,
        notes: &str,
    ) -> StoreResult<Workout> {
        let id = sqlx::query(
            "INSERT INTO workouts (athlete_id, date, notes, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(athlete_id)
        .bind(date)
        .bind(notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                map_unique(e, StoreError::DuplicateName)
            }
        })?
        .last_insert_rowid();

        tracing::info!(athlete_id, workout_id = id, %date, "Created workout");
        self.get_workout(id).await
    }

    pub async fn get_workout(&self, id: i64) -> StoreResult<Workout> {
        let row = sqlx::query("SELECT * FROM workouts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_workout(&row)?)
    }

    /// Workouts of an athlete, newest first, with set count and review status.
    pub async fn list_workouts(&self, athlete_id: i64) -> StoreResult<Vec<WorkoutSummary>> {
        let rows = sqlx::query(
            "SELECT w.id, w.date, w.notes, \
                    (SELECT COUNT(*) FROM workout_sets s WHERE s.workout_id = w.id) AS set_count, \
                    r.status AS review_status \
             FROM workouts w LEFT JOIN workout_reviews r ON r.workout_id = w.id \
             WHERE w.athlete_id = ? ORDER BY w.date DESC",
        )
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .iter()
            .map(|row| -> Result<WorkoutSummary, sqlx::Error> {
                let status: Option<String> = row.try_get("review_status")?;
                Ok(WorkoutSummary {
                    id: row.try_get("id")?,
                    date: row.try_get("date")?,
                    notes: row.try_get("notes")?,
                    set_count: row.try_get("set_count")?,
                    review_status: status.as_deref().map(decode_status).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// Append a set to a workout. Set numbers run across the whole workout.
    pub async fn add_workout_set(
        &self,
        workout_id: i64,
        input: &WorkoutSetInput,
    ) -> StoreResult<WorkoutSet> {
        let mut tx = self.pool.begin().await?;

        let (next,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(set_number), 0) + 1 FROM workout_sets WHERE workout_id = ?",
        )
        .bind(workout_id)
        .fetch_one(&mut *tx)
        .await?;

        let id = sqlx::query(
            "INSERT INTO workout_sets (workout_id, exercise_id, set_number, reps, weight, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(workout_id)
        .bind(input.exercise_id)
        .bind(next)
        .bind(input.reps)
        .bind(input.weight)
        .bind(&input.notes)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                StoreError::Database(e)
            }
        })?
        .last_insert_rowid();

        let row = sqlx::query(
            "SELECT s.*, e.name AS exercise_name \
             FROM workout_sets s JOIN exercises e ON e.id = s.exercise_id WHERE s.id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let set = row_to_workout_set(&row)?;

        tx.commit().await?;
        Ok(set)
    }

    pub async fn list_workout_sets(&self, workout_id: i64) -> StoreResult<Vec<WorkoutSet>> {
        let rows = sqlx::query(
            "SELECT s.*, e.name AS exercise_name \
             FROM workout_sets s JOIN exercises e ON e.id = s.exercise_id \
             WHERE s.workout_id = ? ORDER BY s.set_number",
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_workout_set).collect::<Result<_, _>>()?)
    }

    /// Every logged set of one exercise by one athlete, newest workout first.
    pub async fn exercise_history(
        &self,
        athlete_id: i64,
        exercise_id: i64,
    ) -> StoreResult<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            "SELECT w.id AS workout_id, w.date, s.set_number, s.reps, s.weight, s.notes \
             FROM workout_sets s JOIN workouts w ON w.id = s.workout_id \
             WHERE w.athlete_id = ? AND s.exercise_id = ? \
             ORDER BY w.date DESC, s.set_number",
        )
        .bind(athlete_id)
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| -> Result<HistoryEntry, sqlx::Error> {
                Ok(HistoryEntry {
                    workout_id: row.try_get("workout_id")?,
                    date: row.try_get("date")?,
                    set_number: row.try_get("set_number")?,
                    reps: row.try_get("reps")?,
                    weight: row.try_get("weight")?,
                    notes: row.try_get("notes")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ─── Reviews ─────────────────────────────────────────────────

    /// Create or replace the review of a workout.
    ///
    /// A second submission overwrites status, notes and reviewer; the
    /// original `created_at` is kept.
    pub async fn upsert_review(
        &self,
        workout_id: i64,
        coach_id: i64,
        status: ReviewStatus,
        notes: &str,
    ) -> StoreResult<WorkoutReview> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO workout_reviews (workout_id, coach_id, status, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (workout_id) DO UPDATE SET \
                 coach_id = excluded.coach_id, status = excluded.status, \
                 notes = excluded.notes, updated_at = excluded.updated_at",
        )
        .bind(workout_id)
        .bind(coach_id)
        .bind(status.as_str())
        .bind(notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                StoreError::Database(e)
            }
        })?;

        tracing::info!(workout_id, coach_id, status = %status, "Saved workout review");
        self.get_review(workout_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_review(&self, workout_id: i64) -> StoreResult<Option<WorkoutReview>> {
        let row = sqlx::query(
            "SELECT r.*, CASE WHEN u.display_name = '' THEN u.username ELSE u.display_name END AS coach_name \
             FROM workout_reviews r JOIN users u ON u.id = r.coach_id \
             WHERE r.workout_id = ?",
        )
        .bind(workout_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_review).transpose()?)
    }

    pub async fn count_reviews(&self, workout_id: i64) -> StoreResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workout_reviews WHERE workout_id = ?")
                .bind(workout_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
