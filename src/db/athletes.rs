// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profiles.

use super::{Database, StoreError, StoreResult};
use crate::models::{Athlete, AthleteInput, Tier};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn row_to_athlete(row: &SqliteRow) -> Result<Athlete, sqlx::Error> {
    let tier: Option<String> = row.try_get("tier")?;
    Ok(Athlete {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        tier: tier.as_deref().and_then(Tier::parse),
        notes: row.try_get("notes")?,
        goal: row.try_get("goal")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    pub async fn create_athlete(&self, input: &AthleteInput) -> StoreResult<Athlete> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO athletes (name, tier, notes, goal, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(input.tier.map(|t| t.as_str()))
        .bind(&input.notes)
        .bind(&input.goal)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::info!(athlete_id = id, name = %input.name, "Created athlete");
        self.get_athlete(id).await
    }

    pub async fn get_athlete(&self, id: i64) -> StoreResult<Athlete> {
        let row = sqlx::query("SELECT * FROM athletes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_athlete(&row)?)
    }

    /// All athletes ordered by name, optionally restricted to one tier.
    pub async fn list_athletes(&self, tier: Option<Tier>) -> StoreResult<Vec<Athlete>> {
        let rows = match tier {
            Some(tier) => {
                sqlx::query("SELECT * FROM athletes WHERE tier = ? ORDER BY name COLLATE NOCASE")
                    .bind(tier.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM athletes ORDER BY name COLLATE NOCASE")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.iter().map(row_to_athlete).collect::<Result<_, _>>()?)
    }

    pub async fn update_athlete(&self, id: i64, input: &AthleteInput) -> StoreResult<Athlete> {
        let result = sqlx::query(
            "UPDATE athletes SET name = ?, tier = ?, notes = ?, goal = ?, updated_at = ? WHERE id = ?",
        )
        .bind(input.name.trim())
        .bind(input.tier.map(|t| t.as_str()))
        .bind(&input.notes)
        .bind(&input.goal)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_athlete(id).await
    }

    /// Delete an athlete; dependent rows go with it via ON DELETE CASCADE.
    pub async fn delete_athlete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM athletes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(athlete_id = id, "Deleted athlete");
        Ok(())
    }

    /// Advance an athlete exactly one tier. Returns the new tier.
    pub async fn promote_athlete(&self, id: i64) -> StoreResult<Tier> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> =
            sqlx::query_scalar::<_, Option<String>>("SELECT tier FROM athletes WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;
        let current = current.as_deref().and_then(Tier::parse);

        let next = Tier::next(current).ok_or(StoreError::AlreadyAtMaxTier)?;

        sqlx::query("UPDATE athletes SET tier = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(athlete_id = id, from = ?current, to = %next, "Promoted athlete");
        Ok(next)
    }
}
