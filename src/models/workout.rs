//! Logged workouts, their sets, and coach reviews.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: i64,
    pub athlete_id: i64,
    pub date: NaiveDate,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub set_number: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct WorkoutSetInput {
    pub exercise_id: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub notes: String,
}

/// One logged set in an athlete's history for a single exercise.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub workout_id: i64,
    pub date: NaiveDate,
    pub set_number: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    NeedsWork,
}

impl ReviewStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::NeedsWork => "needs_work",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "needs_work" => Some(Self::NeedsWork),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coach feedback on a workout. At most one per workout.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutReview {
    pub id: i64,
    pub workout_id: i64,
    pub coach_id: i64,
    pub coach_name: String,
    pub status: ReviewStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workout summary row for list pages.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub id: i64,
    pub date: NaiveDate,
    pub notes: String,
    pub set_count: i64,
    pub review_status: Option<ReviewStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_status_parse() {
        assert_eq!(ReviewStatus::parse("approved"), Some(ReviewStatus::Approved));
        assert_eq!(
            ReviewStatus::parse("needs_work"),
            Some(ReviewStatus::NeedsWork)
        );
        assert_eq!(ReviewStatus::parse("Approved"), None);
        assert_eq!(ReviewStatus::parse(""), None);
    }
}
