// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts.

use super::{map_unique, Database, StoreError, StoreResult};
use crate::models::{NewUser, User};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const USER_COLUMNS: &str = "id, username, password_hash, display_name, is_coach, is_admin, \
     athlete_id, avatar_filename, created_at, updated_at";

fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        is_coach: row.try_get("is_coach")?,
        is_admin: row.try_get("is_admin")?,
        athlete_id: row.try_get("athlete_id")?,
        avatar_filename: row.try_get("avatar_filename")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Create an account. The very first account becomes coach and admin.
    pub async fn create_user(&self, new_user: &NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let bootstrap = existing == 0;

        let id = sqlx::query(
            "INSERT INTO users (username, password_hash, display_name, is_coach, is_admin, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_user.username.trim())
        .bind(&new_user.password_hash)
        .bind(new_user.display_name.trim())
        .bind(bootstrap)
        .bind(bootstrap)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, StoreError::DuplicateUsername))?
        .last_insert_rowid();

        tx.commit().await?;

        if bootstrap {
            tracing::info!(user_id = id, "First account created as coach/admin");
        }
        self.get_user(id).await
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_user(&row)?)
    }

    /// Case-insensitive lookup for login.
    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row_to_user(&row)?)
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username COLLATE NOCASE"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_user).collect::<Result<_, _>>()?)
    }

    pub async fn update_display_name(&self, id: i64, display_name: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE users SET display_name = ?, updated_at = ? WHERE id = ?")
                .bind(display_name.trim())
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Record a new avatar file name and return the previous one so the
    /// caller can remove it from disk.
    pub async fn set_avatar(&self, id: i64, filename: &str) -> StoreResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar::<_, Option<String>>("SELECT avatar_filename FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;

        sqlx::query("UPDATE users SET avatar_filename = ?, updated_at = ? WHERE id = ?")
            .bind(filename)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    /// Whether `filename` is the current avatar of some user.
    pub async fn avatar_exists(&self, filename: &str) -> StoreResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE avatar_filename = ?")
                .bind(filename)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Admin update of role flags and athlete link.
    ///
    /// Linking to an athlete already linked to another user is a
    /// uniqueness conflict; a missing athlete is `NotFound`.
    pub async fn update_user_access(
        &self,
        id: i64,
        is_coach: bool,
        athlete_id: Option<i64>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_coach = ?, athlete_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(is_coach)
        .bind(athlete_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if super::is_foreign_key_violation(&e) {
                StoreError::NotFound
            } else {
                map_unique(e, StoreError::AlreadyAssigned)
            }
        })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
