//! Equipment catalog.

use super::{map_unique, Database, StoreError, StoreResult};
use crate::models::Equipment;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn row_to_equipment(row: &SqliteRow) -> Result<Equipment, sqlx::Error> {
    Ok(Equipment {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

impl Database {
    pub async fn create_equipment(&self, name: &str, description: &str) -> StoreResult<Equipment> {
        let id = sqlx::query("INSERT INTO equipment (name, description) VALUES (?, ?)")
            .bind(name.trim())
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, StoreError::DuplicateName))?
            .last_insert_rowid();
        self.get_equipment(id).await
    }

    pub async fn get_equipment(&self, id: i64) -> StoreResult<Equipment> {
        let row = sqlx::query("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row_to_equipment(&row)?)
    }

    pub async fn list_equipment(&self) -> StoreResult<Vec<Equipment>> {
        let rows = sqlx::query("SELECT * FROM equipment ORDER BY name COLLATE NOCASE")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_equipment).collect::<Result<_, _>>()?)
    }

    pub async fn update_equipment(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> StoreResult<Equipment> {
        let result = sqlx::query("UPDATE equipment SET name = ?, description = ? WHERE id = ?")
            .bind(name.trim())
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, StoreError::DuplicateName))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_equipment(id).await
    }

    /// Remove equipment; its exercise links cascade.
    pub async fn delete_equipment(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
