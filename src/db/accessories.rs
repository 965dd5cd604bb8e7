//! Accessory plans (per-athlete, per-day supplementary work).

use super::{is_foreign_key_violation, Database, StoreError, StoreResult};
use crate::models::{AccessoryPlan, AccessoryPlanInput};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const PLAN_SELECT: &str = "SELECT p.*, e.name AS exercise_name \
     FROM accessory_plans p JOIN exercises e ON e.id = p.exercise_id";

fn row_to_plan(row: &SqliteRow) -> Result<AccessoryPlan, sqlx::Error> {
    Ok(AccessoryPlan {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        day: row.try_get("day")?,
        exercise_id: row.try_get("exercise_id")?,
        exercise_name: row.try_get("exercise_name")?,
        target_sets: row.try_get("target_sets")?,
        target_reps: row.try_get("target_reps")?,
        target_weight: row.try_get("target_weight")?,
        notes: row.try_get("notes")?,
        sort_order: row.try_get("sort_order")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Add an exercise to an athlete's plan for one day.
    ///
    /// The same exercise may be active once per day; a second add fails
    /// with `DuplicateName`. A previously deactivated row for the same
    /// (day, exercise) is revived with the new prescription instead.
    pub async fn create_accessory_plan(
        &self,
        athlete_id: i64,
        input: &AccessoryPlanInput,
    ) -> StoreResult<AccessoryPlan> {
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO accessory_plans \
             (athlete_id, day, exercise_id, target_sets, target_reps, target_weight, notes, sort_order, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?) \
             ON CONFLICT (athlete_id, day, exercise_id) DO UPDATE SET \
                 target_sets = excluded.target_sets, target_reps = excluded.target_reps, \
                 target_weight = excluded.target_weight, notes = excluded.notes, \
                 sort_order = excluded.sort_order, active = 1 \
             WHERE accessory_plans.active = 0 \
             RETURNING id",
        )
        .bind(athlete_id)
        .bind(input.day)
        .bind(input.exercise_id)
        .bind(input.target_sets)
        .bind(&input.target_reps)
        .bind(&input.target_weight)
        .bind(&input.notes)
        .bind(input.sort_order)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                StoreError::Database(e)
            }
        })?;
        let id = id.ok_or(StoreError::DuplicateName)?;

        tracing::info!(athlete_id, plan_id = id, day = input.day, "Created accessory plan");
        self.get_accessory_plan(id).await
    }

    pub async fn get_accessory_plan(&self, id: i64) -> StoreResult<AccessoryPlan> {
        let row = sqlx::query(&format!("{PLAN_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_plan(&row)?)
    }

    /// Active plans for an athlete, ordered by day then sort order.
    pub async fn list_accessory_plans(&self, athlete_id: i64) -> StoreResult<Vec<AccessoryPlan>> {
        let rows = sqlx::query(&format!(
            "{PLAN_SELECT} WHERE p.athlete_id = ? AND p.active = 1 \
             ORDER BY p.day, p.sort_order, p.id"
        ))
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_plan).collect::<Result<_, _>>()?)
    }

    pub async fn deactivate_accessory_plan(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE accessory_plans SET active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_accessory_plan(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM accessory_plans WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
