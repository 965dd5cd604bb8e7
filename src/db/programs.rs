// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Program templates, prescribed sets and athlete program assignments.

use super::{is_foreign_key_violation, map_unique, Database, StoreError, StoreResult};
use crate::models::{
    PrescribedSet, PrescribedSetInput, ProgramAssignment, ProgramTemplate, TemplateInput,
};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const ASSIGNMENT_SELECT: &str = "SELECT ap.id, ap.athlete_id, ap.template_id, t.name AS template_name, \
     ap.start_date, ap.active, ap.created_at \
     FROM athlete_programs ap JOIN program_templates t ON t.id = ap.template_id";

fn row_to_template(row: &SqliteRow) -> Result<ProgramTemplate, sqlx::Error> {
    Ok(ProgramTemplate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        num_weeks: row.try_get("num_weeks")?,
        num_days: row.try_get("num_days")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_set(row: &SqliteRow) -> Result<PrescribedSet, sqlx::Error> {
    Ok(PrescribedSet {
        id: row.try_get("id")?,
        template_id: row.try_get("template_id")?,
        week: row.try_get("week")?,
        day: row.try_get("day")?,
        set_number: row.try_get("set_number")?,
        exercise_id: row.try_get("exercise_id")?,
        exercise_name: row.try_get("exercise_name")?,
        reps: row.try_get("reps")?,
        percentage: row.try_get("percentage")?,
        notes: row.try_get("notes")?,
    })
}

fn row_to_program_assignment(row: &SqliteRow) -> Result<ProgramAssignment, sqlx::Error> {
    Ok(ProgramAssignment {
        id: row.try_get("id")?,
        athlete_id: row.try_get("athlete_id")?,
        template_id: row.try_get("template_id")?,
        template_name: row.try_get("template_name")?,
        start_date: row.try_get("start_date")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    // ─── Templates ───────────────────────────────────────────────

    pub async fn create_template(&self, input: &TemplateInput) -> StoreResult<ProgramTemplate> {
        let id = sqlx::query(
            "INSERT INTO program_templates (name, description, num_weeks, num_days, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.num_weeks)
        .bind(input.num_days)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, StoreError::DuplicateName))?
        .last_insert_rowid();

        tracing::info!(template_id = id, name = %input.name, "Created program template");
        self.get_template(id).await
    }

    pub async fn get_template(&self, id: i64) -> StoreResult<ProgramTemplate> {
        let row = sqlx::query("SELECT * FROM program_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_template(&row)?)
    }

    pub async fn list_templates(&self) -> StoreResult<Vec<ProgramTemplate>> {
        let rows = sqlx::query("SELECT * FROM program_templates ORDER BY name COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_template).collect::<Result<_, _>>()?)
    }

    /// Update a template. Shrinking the bounds below an existing set is
    /// refused with `InUse`.
    pub async fn update_template(
        &self,
        id: i64,
        input: &TemplateInput,
    ) -> StoreResult<ProgramTemplate> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM program_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let (outside,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM prescribed_sets WHERE template_id = ? AND (week > ? OR day > ?)",
        )
        .bind(id)
        .bind(input.num_weeks)
        .bind(input.num_days)
        .fetch_one(&mut *tx)
        .await?;
        if outside > 0 {
            return Err(StoreError::InUse);
        }

        sqlx::query(
            "UPDATE program_templates SET name = ?, description = ?, num_weeks = ?, num_days = ? WHERE id = ?",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.num_weeks)
        .bind(input.num_days)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, StoreError::DuplicateName))?;

        tx.commit().await?;
        self.get_template(id).await
    }

    /// Delete a template unless an athlete has it actively assigned.
    /// Inactive assignments and the template's sets are removed with it.
    pub async fn delete_template(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM program_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let (active,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM athlete_programs WHERE template_id = ? AND active = 1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(StoreError::TemplateInUse);
        }

        sqlx::query("DELETE FROM program_templates WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(template_id = id, "Deleted program template");
        Ok(())
    }

    // ─── Prescribed Sets ─────────────────────────────────────────

    /// Every set of a template across all weeks.
    pub async fn list_prescribed_sets(&self, template_id: i64) -> StoreResult<Vec<PrescribedSet>> {
        let rows = sqlx::query(
            "SELECT s.*, e.name AS exercise_name \
             FROM prescribed_sets s JOIN exercises e ON e.id = s.exercise_id \
             WHERE s.template_id = ? ORDER BY s.week, s.day, s.set_number",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_set).collect::<Result<_, _>>()?)
    }

    /// Add a set. The caller checks week/day against the template bounds;
    /// a set number already used in that (week, day) is `DuplicateName`.
    pub async fn add_prescribed_set(
        &self,
        template_id: i64,
        input: &PrescribedSetInput,
    ) -> StoreResult<i64> {
        let id = sqlx::query(
            "INSERT INTO prescribed_sets \
             (template_id, week, day, set_number, exercise_id, reps, percentage, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(template_id)
        .bind(input.week)
        .bind(input.day)
        .bind(input.set_number)
        .bind(input.exercise_id)
        .bind(input.reps)
        .bind(input.percentage)
        .bind(&input.notes)
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
        Ok(id)
    }

    pub async fn delete_prescribed_set(&self, template_id: i64, set_id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM prescribed_sets WHERE id = ? AND template_id = ?")
            .bind(set_id)
            .bind(template_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ─── Athlete Programs ────────────────────────────────────────

    /// Start a program for an athlete. At most one may be active.
    pub async fn assign_program(
        &self,
        athlete_id: i64,
        template_id: i64,
        start_date: NaiveDate,
    ) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let (athletes, templates): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM athletes WHERE id = ?), \
                    (SELECT COUNT(*) FROM program_templates WHERE id = ?)",
        )
        .bind(athlete_id)
        .bind(template_id)
        .fetch_one(&mut *tx)
        .await?;
        if athletes == 0 || templates == 0 {
            return Err(StoreError::NotFound);
        }

        let active: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM athlete_programs WHERE athlete_id = ? AND active = 1",
        )
        .bind(athlete_id)
        .fetch_optional(&mut *tx)
        .await?;
        if active.is_some() {
            return Err(StoreError::AlreadyActive);
        }

        let id = sqlx::query(
            "INSERT INTO athlete_programs (athlete_id, template_id, start_date, active, created_at) \
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(athlete_id)
        .bind(template_id)
        .bind(start_date)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, StoreError::AlreadyActive))?
        .last_insert_rowid();

        tx.commit().await?;

        tracing::info!(athlete_id, template_id, %start_date, "Assigned program");
        Ok(id)
    }

    pub async fn active_program(&self, athlete_id: i64) -> StoreResult<Option<ProgramAssignment>> {
        let row = sqlx::query(&format!(
            "{ASSIGNMENT_SELECT} WHERE ap.athlete_id = ? AND ap.active = 1"
        ))
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_program_assignment).transpose()?)
    }

    pub async fn list_program_assignments(
        &self,
        athlete_id: i64,
    ) -> StoreResult<Vec<ProgramAssignment>> {
        let rows = sqlx::query(&format!(
            "{ASSIGNMENT_SELECT} WHERE ap.athlete_id = ? ORDER BY ap.active DESC, ap.start_date DESC"
        ))
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(row_to_program_assignment)
            .collect::<Result<_, _>>()?)
    }

    /// End an athlete's program assignment.
    pub async fn deactivate_program(&self, athlete_id: i64, assignment_id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE athlete_programs SET active = 0 WHERE id = ? AND athlete_id = ?",
        )
        .bind(assignment_id)
        .bind(athlete_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(athlete_id, assignment_id, "Deactivated program");
        Ok(())
    }
}
