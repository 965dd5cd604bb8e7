// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete ↔ exercise assignments.
//!
//! Rows are never deleted by these operations: deactivation flips the
//! `active` flag so the history is kept. A partial unique index keeps at
//! most one active row per (athlete, exercise).

use super::{map_unique, Database, StoreError, StoreResult};
use crate::models::{AssignedAthlete, Assignment};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const ASSIGNMENT_SELECT: &str = "SELECT ae.id, ae.athlete_id, ae.exercise_id, e.name AS exercise_name, \
     ae.target_reps, ae.active, ae.assigned_at, ae.deactivated_at \
     FROM athlete_exercises ae JOIN exercises e ON e.id = ae.exercise_id";

fn row_to_assignment(row: &SqliteRow) -> Result<Assignment, sqlx::Error> {
    Ok(Assignment {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        exercise_id: row.try_get("exercise_id")?,
        exercise_name: row.try_get("exercise_name")?,
        target_reps: row.try_get("target_reps")?,
        active: row.try_get("active")?,
        assigned_at: row.try_get("assigned_at")?,
        deactivated_at: row.try_get("deactivated_at")?,
    })
}

impl Database {
    /// Assign an exercise to an athlete.
    ///
    /// Returns `AlreadyAssigned` when the pair already has an active row;
    /// callers treat that as a successful no-op.
    pub async fn assign_exercise(
        &self,
        athlete_id: i64,
        exercise_id: i64,
        target_reps: Option<i64>,
    ) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let (athletes, exercises): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM athletes WHERE id = ?), \
                    (SELECT COUNT(*) FROM exercises WHERE id = ?)",
        )
        .bind(athlete_id)
        .bind(exercise_id)
        .fetch_one(&mut *tx)
        .await?;
        if athletes == 0 || exercises == 0 {
            return Err(StoreError::NotFound);
        }

        let active: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM athlete_exercises WHERE athlete_id = ? AND exercise_id = ? AND active = 1",
        )
        .bind(athlete_id)
        .bind(exercise_id)
        .fetch_optional(&mut *tx)
        .await?;
        if active.is_some() {
            return Err(StoreError::AlreadyAssigned);
        }

        let id = sqlx::query(
            "INSERT INTO athlete_exercises (athlete_id, exercise_id, target_reps, active, assigned_at) \
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(athlete_id)
        .bind(exercise_id)
        .bind(target_reps)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, StoreError::AlreadyAssigned))?
        .last_insert_rowid();

        tx.commit().await?;

        tracing::info!(athlete_id, exercise_id, assignment_id = id, "Assigned exercise");
        Ok(id)
    }

    pub async fn get_assignment(&self, id: i64) -> StoreResult<Assignment> {
        let row = sqlx::query(&format!("{ASSIGNMENT_SELECT} WHERE ae.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_assignment(&row)?)
    }

    /// Every assignment of an athlete, active ones first.
    pub async fn list_assignments(&self, athlete_id: i64) -> StoreResult<Vec<Assignment>> {
        let rows = sqlx::query(&format!(
            "{ASSIGNMENT_SELECT} WHERE ae.athlete_id = ? \
             ORDER BY ae.active DESC, e.name COLLATE NOCASE, ae.id DESC"
        ))
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_assignment).collect::<Result<_, _>>()?)
    }

    /// Mark an assignment inactive. Already-inactive rows are left alone.
    pub async fn deactivate_assignment(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE athlete_exercises SET active = 0, deactivated_at = COALESCE(deactivated_at, ?) \
             WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(assignment_id = id, "Deactivated assignment");
        Ok(())
    }

    /// Mark an assignment active again.
    ///
    /// Fails with `AlreadyAssigned` if a different row for the same pair
    /// became active in the meantime.
    pub async fn reactivate_assignment(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE athlete_exercises SET active = 1, deactivated_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, StoreError::AlreadyAssigned))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(assignment_id = id, "Reactivated assignment");
        Ok(())
    }

    /// Athletes with an active assignment to `exercise_id`.
    pub async fn list_assigned_athletes(&self, exercise_id: i64) -> StoreResult<Vec<AssignedAthlete>> {
        let rows = sqlx::query(
            "SELECT ae.id AS assignment_id, a.id AS athlete_id, a.name AS athlete_name, ae.target_reps \
             FROM athlete_exercises ae JOIN athletes a ON a.id = ae.athlete_id \
             WHERE ae.exercise_id = ? AND ae.active = 1 \
             ORDER BY a.name COLLATE NOCASE",
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await?;

        let athletes = rows
            .iter()
            .map(|row| -> Result<AssignedAthlete, sqlx::Error> {
                Ok(AssignedAthlete {
                    assignment_id: row.try_get("assignment_id")?,
                    athlete_id: row.try_get("athlete_id")?,
                    athlete_name: row.try_get("athlete_name")?,
                    target_reps: row.try_get("target_reps")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(athletes)
    }
}
