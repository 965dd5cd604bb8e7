// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog and exercise ↔ equipment links.

use super::{is_foreign_key_violation, map_unique, Database, StoreError, StoreResult};
use crate::models::{EquipmentLink, Exercise, ExerciseInput, Tier};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Page size for the exercise list.
pub const EXERCISE_PAGE_SIZE: i64 = 50;

fn row_to_exercise(row: &SqliteRow) -> Result<Exercise, sqlx::Error> {
    let tier: Option<String> = row.try_get("tier")?;
    Ok(Exercise {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        tier: tier.as_deref().and_then(Tier::parse),
        form_notes: row.try_get("form_notes")?,
        demo_url: row.try_get("demo_url")?,
        rest_seconds: row.try_get("rest_seconds")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    pub async fn create_exercise(&self, input: &ExerciseInput) -> StoreResult<Exercise> {
        let id = sqlx::query(
            "INSERT INTO exercises (name, tier, form_notes, demo_url, rest_seconds, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(input.tier.map(|t| t.as_str()))
        .bind(&input.form_notes)
        .bind(&input.demo_url)
        .bind(input.rest_seconds)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, StoreError::DuplicateName))?
        .last_insert_rowid();

        tracing::info!(exercise_id = id, name = %input.name, "Created exercise");
        self.get_exercise(id).await
    }

    pub async fn get_exercise(&self, id: i64) -> StoreResult<Exercise> {
        let row = sqlx::query("SELECT * FROM exercises WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_exercise(&row)?)
    }

    /// One page of exercises ordered by name, starting at `offset`.
    pub async fn list_exercises(&self, offset: i64) -> StoreResult<Vec<Exercise>> {
        let rows = sqlx::query(
            "SELECT * FROM exercises ORDER BY name COLLATE NOCASE LIMIT ? OFFSET ?",
        )
        .bind(EXERCISE_PAGE_SIZE)
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_exercise).collect::<Result<_, _>>()?)
    }

    /// Every exercise, for select boxes.
    pub async fn list_all_exercises(&self) -> StoreResult<Vec<Exercise>> {
        let rows = sqlx::query("SELECT * FROM exercises ORDER BY name COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_exercise).collect::<Result<_, _>>()?)
    }

    pub async fn count_exercises(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn update_exercise(&self, id: i64, input: &ExerciseInput) -> StoreResult<Exercise> {
        let result = sqlx::query(
            "UPDATE exercises SET name = ?, tier = ?, form_notes = ?, demo_url = ?, rest_seconds = ? \
             WHERE id = ?",
        )
        .bind(input.name.trim())
        .bind(input.tier.map(|t| t.as_str()))
        .bind(&input.form_notes)
        .bind(&input.demo_url)
        .bind(input.rest_seconds)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, StoreError::DuplicateName))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_exercise(id).await
    }

    /// Delete an exercise that no logged set or template references.
    ///
    /// Assignments, accessory plans and equipment links cascade.
    pub async fn delete_exercise(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let (references,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM workout_sets WHERE exercise_id = ?1) \
                  + (SELECT COUNT(*) FROM prescribed_sets WHERE exercise_id = ?1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if references > 0 {
            tracing::debug!(exercise_id = id, references, "Exercise still referenced");
            return Err(StoreError::InUse);
        }

        sqlx::query("DELETE FROM exercises WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::InUse
                } else {
                    StoreError::Database(e)
                }
            })?;

        tx.commit().await?;
        tracing::info!(exercise_id = id, "Deleted exercise");
        Ok(())
    }

    pub async fn list_exercise_equipment(&self, exercise_id: i64) -> StoreResult<Vec<EquipmentLink>> {
        let rows = sqlx::query(
            "SELECT ee.equipment_id, e.name, ee.optional \
             FROM exercise_equipment ee JOIN equipment e ON e.id = ee.equipment_id \
             WHERE ee.exercise_id = ? ORDER BY e.name COLLATE NOCASE",
        )
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await?;

        let links = rows
            .iter()
            .map(|row| -> Result<EquipmentLink, sqlx::Error> {
                Ok(EquipmentLink {
                    equipment_id: row.try_get("equipment_id")?,
                    name: row.try_get("name")?,
                    optional: row.try_get("optional")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    /// Attach equipment to an exercise, or change its required/optional
    /// tag when already attached.
    pub async fn link_equipment(
        &self,
        exercise_id: i64,
        equipment_id: i64,
        optional: bool,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO exercise_equipment (exercise_id, equipment_id, optional) VALUES (?, ?, ?) \
             ON CONFLICT (exercise_id, equipment_id) DO UPDATE SET optional = excluded.optional",
        )
        .bind(exercise_id)
        .bind(equipment_id)
        .bind(optional)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }

    pub async fn unlink_equipment(&self, exercise_id: i64, equipment_id: i64) -> StoreResult<()> {
        let result =
            sqlx::query("DELETE FROM exercise_equipment WHERE exercise_id = ? AND equipment_id = ?")
                .bind(exercise_id)
                .bind(equipment_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
