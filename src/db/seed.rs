//! First-run provisioning of the default exercise and equipment catalog.

use super::{Database, StoreResult};
use crate::models::Tier;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;

/// Catalog shipped with the binary.
pub const DEFAULT_CATALOG: &str = include_str!("../../seed/catalog.json");

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    equipment: Vec<SeedEquipment>,
    #[serde(default)]
    exercises: Vec<SeedExercise>,
}

#[derive(Debug, Deserialize)]
struct SeedEquipment {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SeedExercise {
    name: String,
    #[serde(default)]
    tier: Option<Tier>,
    #[serde(default)]
    form_notes: String,
    #[serde(default)]
    equipment: Vec<SeedLink>,
}

#[derive(Debug, Deserialize)]
struct SeedLink {
    name: String,
    #[serde(default)]
    optional: bool,
}

impl Database {
    /// Insert the catalog when both the exercise and equipment tables are
    /// empty. Returns whether anything was written.
    pub async fn seed_catalog(&self, json: &str) -> StoreResult<bool> {
        let catalog: Catalog = serde_json::from_str(json)?;

        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM exercises) + (SELECT COUNT(*) FROM equipment)",
        )
        .fetch_one(&mut *tx)
        .await?;
        if existing > 0 {
            tracing::debug!("Catalog already present, skipping seed");
            return Ok(false);
        }

        let mut equipment_ids: HashMap<String, i64> = HashMap::new();
        for item in &catalog.equipment {
            let id = sqlx::query("INSERT INTO equipment (name, description) VALUES (?, ?)")
                .bind(&item.name)
                .bind(&item.description)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            equipment_ids.insert(item.name.clone(), id);
        }

        let now = Utc::now();
        for exercise in &catalog.exercises {
            let exercise_id = sqlx::query(
                "INSERT INTO exercises (name, tier, form_notes, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&exercise.name)
            .bind(exercise.tier.map(|t| t.as_str()))
            .bind(&exercise.form_notes)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            for link in &exercise.equipment {
                let Some(equipment_id) = equipment_ids.get(&link.name) else {
                    tracing::warn!(
                        exercise = %exercise.name,
                        equipment = %link.name,
                        "Seed exercise references unknown equipment"
                    );
                    continue;
                };
                sqlx::query(
                    "INSERT INTO exercise_equipment (exercise_id, equipment_id, optional) VALUES (?, ?, ?)",
                )
                .bind(exercise_id)
                .bind(equipment_id)
                .bind(link.optional)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            equipment = catalog.equipment.len(),
            exercises = catalog.exercises.len(),
            "Seeded default catalog"
        );
        Ok(true)
    }
}
