// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-day accessory work prescribed to an athlete.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Days are numbered 1 (Monday) through 7 (Sunday).
pub const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct AccessoryPlan {
    pub id: i64,
    pub athlete_id: i64,
    pub day: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub target_sets: i64,
    pub target_reps: String,
    pub target_weight: String,
    pub notes: String,
    pub sort_order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccessoryPlanInput {
    pub day: i64,
    pub exercise_id: i64,
    pub target_sets: i64,
    pub target_reps: String,
    pub target_weight: String,
    pub notes: String,
    pub sort_order: i64,
}

/// Plans for a single day.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub day: i64,
    pub day_name: &'static str,
    pub plans: Vec<AccessoryPlan>,
}

pub fn day_name(day: i64) -> &'static str {
    match day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

/// Group plans by day. Days come out ascending and only days with at
/// least one plan are present; within a day plans are ordered by
/// `sort_order`, then id.
pub fn group_by_day(mut plans: Vec<AccessoryPlan>) -> Vec<DayGroup> {
    plans.sort_by_key(|p| (p.day, p.sort_order, p.id));

    let mut groups: Vec<DayGroup> = Vec::new();
    for plan in plans {
        match groups.last_mut() {
            Some(group) if group.day == plan.day => group.plans.push(plan),
            _ => groups.push(DayGroup {
                day: plan.day,
                day_name: day_name(plan.day),
                plans: vec![plan],
            }),
        }
    }
    groups
}
