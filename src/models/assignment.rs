//! Athlete ↔ exercise assignments.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An athlete's assignment to an exercise, joined with the exercise name.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: i64,
    pub athlete_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub target_reps: Option<i64>,
    pub active: bool,
    pub assigned_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// An athlete currently assigned to a given exercise (exercise detail page).
#[derive(Debug, Clone, Serialize)]
pub struct AssignedAthlete {
    pub assignment_id: i64,
    pub athlete_id: i64,
    pub athlete_name: String,
    pub target_reps: Option<i64>,
}
