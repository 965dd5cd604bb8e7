// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Program templates, their prescribed sets, and athlete program
//! assignments.
//!
//! The week view is built here as a pure transform over the rows fetched
//! for a template so that it can be tested without a database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub const MAX_WEEKS: i64 = 52;
pub const MAX_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct ProgramTemplate {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub num_weeks: i64,
    pub num_days: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TemplateInput {
    pub name: String,
    pub description: String,
    pub num_weeks: i64,
    pub num_days: i64,
}

/// One (week, day, set_number) entry of a template.
#[derive(Debug, Clone, Serialize)]
pub struct PrescribedSet {
    pub id: i64,
    pub template_id: i64,
    pub week: i64,
    pub day: i64,
    pub set_number: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub reps: Option<i64>,
    /// Percentage of the athlete's training max
    pub percentage: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct PrescribedSetInput {
    pub week: i64,
    pub day: i64,
    pub set_number: i64,
    pub exercise_id: i64,
    pub reps: Option<i64>,
    pub percentage: Option<f64>,
    pub notes: String,
}

/// A template assigned to an athlete.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramAssignment {
    pub id: i64,
    pub athlete_id: i64,
    pub template_id: i64,
    pub template_name: String,
    pub start_date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One day column of the week view.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub day: i64,
    pub sets: Vec<PrescribedSet>,
    /// Seeds the add-set form; one past the highest set number of this day.
    pub next_set_number: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub week: i64,
    pub num_weeks: i64,
    pub prev_week: Option<i64>,
    pub next_week: Option<i64>,
    pub days: Vec<DayView>,
}

/// Resolve the `?week=` query value against a template's bounds.
///
/// Missing or unparsable input selects week 1; out-of-range values are
/// clamped to `[1, num_weeks]`.
pub fn resolve_week(raw: Option<&str>, num_weeks: i64) -> i64 {
    let upper = num_weeks.max(1);
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|w| w.clamp(1, upper))
        .unwrap_or(1)
}

/// Week of a program an athlete is in on `today`, counting the start
/// date's week as 1. Clamped to the template's bounds.
pub fn current_week(start_date: NaiveDate, today: NaiveDate, num_weeks: i64) -> i64 {
    let elapsed = (today - start_date).num_days();
    (elapsed.div_euclid(7) + 1).clamp(1, num_weeks.max(1))
}

/// Next free set number for a day given the sets already in it.
pub fn next_set_number(sets: &[PrescribedSet]) -> i64 {
    sets.iter().map(|s| s.set_number).max().unwrap_or(0) + 1
}

/// Partition a template's sets into the day columns of one week.
///
/// `sets` may contain every week of the template; only `week` is kept.
/// Every day in `1..=num_days` gets a column even when empty. Sets
/// recorded on a day beyond the template's bounds are dropped.
pub fn build_week_view(template: &ProgramTemplate, sets: &[PrescribedSet], week: i64) -> WeekView {
    let mut days: Vec<DayView> = (1..=template.num_days)
        .map(|day| DayView {
            day,
            sets: Vec::new(),
            next_set_number: 1,
        })
        .collect();

    for set in sets.iter().filter(|s| s.week == week) {
        if let Some(column) = usize::try_from(set.day - 1)
            .ok()
            .and_then(|idx| days.get_mut(idx))
        {
            column.sets.push(set.clone());
        }
    }

    for column in &mut days {
        column.sets.sort_by_key(|s| (s.set_number, s.id));
        column.next_set_number = next_set_number(&column.sets);
    }

    WeekView {
        week,
        num_weeks: template.num_weeks,
        prev_week: (week > 1).then(|| week - 1),
        next_week: (week < template.num_weeks).then(|| week + 1),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(num_weeks: i64, num_days: i64) -> ProgramTemplate {
        ProgramTemplate {
            id: 1,
            name: "Base".to_string(),
            description: String::new(),
            num_weeks,
            num_days,
            created_at: Utc::now(),
        }
    }

    fn set(id: i64, week: i64, day: i64, set_number: i64) -> PrescribedSet {
        PrescribedSet {
            id,
            template_id: 1,
            week,
            day,
            set_number,
            exercise_id: 1,
            exercise_name: "Back Squat".to_string(),
            reps: Some(5),
            percentage: Some(75.0),
            notes: String::new(),
        }
    }

    #[test]
    fn test_resolve_week_defaults_and_clamps() {
        assert_eq!(resolve_week(None, 4), 1);
        assert_eq!(resolve_week(Some("abc"), 4), 1);
        assert_eq!(resolve_week(Some(""), 4), 1);
        assert_eq!(resolve_week(Some("0"), 4), 1);
        assert_eq!(resolve_week(Some("-3"), 4), 1);
        assert_eq!(resolve_week(Some("3"), 4), 3);
        assert_eq!(resolve_week(Some("99"), 4), 4);
    }

    #[test]
    fn test_current_week_counts_from_start() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let day = |d: u32| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        assert_eq!(current_week(start, day(5), 8), 1);
        assert_eq!(current_week(start, day(11), 8), 1);
        assert_eq!(current_week(start, day(12), 8), 2);
        // Before the start and past the end both clamp.
        assert_eq!(current_week(start, day(1), 8), 1);
        assert_eq!(current_week(start, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(), 8), 8);
    }

    #[test]
    fn test_week_view_partitions_by_day() {
        let t = template(2, 3);
        let sets = vec![
            set(1, 1, 1, 1),
            set(2, 1, 1, 2),
            set(3, 1, 3, 1),
            set(4, 2, 1, 1),
        ];

        let view = build_week_view(&t, &sets, 1);

        assert_eq!(view.days.len(), 3);
        assert_eq!(view.days[0].sets.len(), 2);
        assert!(view.days[1].sets.is_empty());
        assert_eq!(view.days[2].sets.len(), 1);
        assert_eq!(view.prev_week, None);
        assert_eq!(view.next_week, Some(2));
    }

    #[test]
    fn test_next_set_number_is_one_past_max() {
        let t = template(1, 2);
        // Gap at 2: next number must still clear the maximum.
        let sets = vec![set(1, 1, 1, 1), set(2, 1, 1, 3)];

        let view = build_week_view(&t, &sets, 1);

        assert_eq!(view.days[0].next_set_number, 4);
        assert_eq!(view.days[1].next_set_number, 1);
        assert!(view.days[0]
            .sets
            .iter()
            .all(|s| s.set_number != view.days[0].next_set_number));
    }

    #[test]
    fn test_week_view_drops_sets_beyond_day_bounds() {
        let t = template(1, 2);
        let sets = vec![set(1, 1, 5, 1), set(2, 1, 0, 1)];

        let view = build_week_view(&t, &sets, 1);

        assert!(view.days.iter().all(|d| d.sets.is_empty()));
    }

    #[test]
    fn test_week_view_sorts_by_set_number() {
        let t = template(1, 1);
        let sets = vec![set(10, 1, 1, 3), set(11, 1, 1, 1), set(12, 1, 1, 2)];

        let view = build_week_view(&t, &sets, 1);

        let order: Vec<i64> = view.days[0].sets.iter().map(|s| s.set_number).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
