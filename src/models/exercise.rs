// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog and equipment.

use super::athlete::Tier;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub tier: Option<Tier>,
    pub form_notes: String,
    pub demo_url: String,
    pub rest_seconds: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExerciseInput {
    pub name: String,
    pub tier: Option<Tier>,
    pub form_notes: String,
    pub demo_url: String,
    pub rest_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// One equipment row attached to an exercise.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentLink {
    pub equipment_id: i64,
    pub name: String,
    pub optional: bool,
}

/// Equipment for an exercise, split by whether it is needed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquipmentSplit {
    pub required: Vec<EquipmentLink>,
    pub optional: Vec<EquipmentLink>,
}

/// Partition equipment links into required and optional lists,
/// each sorted by name.
pub fn split_equipment(links: Vec<EquipmentLink>) -> EquipmentSplit {
    let (mut optional, mut required): (Vec<_>, Vec<_>) =
        links.into_iter().partition(|l| l.optional);
    required.sort_by(|a, b| a.name.cmp(&b.name));
    optional.sort_by(|a, b| a.name.cmp(&b.name));
    EquipmentSplit { required, optional }
}
