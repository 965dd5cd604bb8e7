// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Who may see or change which athlete's data.
//!
//! Three kinds of user exist: managers (coaches and admins), non-coach
//! users linked to one athlete, and unlinked users. Handlers always fetch
//! the target first so a missing athlete is a 404 for everyone, then ask
//! one of these predicates.

use crate::models::User;

/// Coaches and admins manage every athlete.
pub fn can_manage_athlete(user: &User) -> bool {
    user.is_coach || user.is_admin
}

/// Managers, or the user linked to `athlete_id`.
pub fn can_access_athlete(user: &User, athlete_id: i64) -> bool {
    can_manage_athlete(user) || user.athlete_id == Some(athlete_id)
}

/// Filter a cross-athlete list down to what `user` may see.
///
/// Managers keep everything, linked users keep their own rows, unlinked
/// users get an empty list.
pub fn visible_to<T>(user: &User, rows: Vec<T>, athlete_of: impl Fn(&T) -> i64) -> Vec<T> {
    if can_manage_athlete(user) {
        return rows;
    }
    match user.athlete_id {
        Some(own) => rows.into_iter().filter(|row| athlete_of(row) == own).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_coach: bool, is_admin: bool, athlete_id: Option<i64>) -> User {
        User {
            id: 1,
            username: "u".to_string(),
            password_hash: String::new(),
            display_name: String::new(),
            is_coach,
            is_admin,
            athlete_id,
            avatar_filename: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_coach_and_admin_manage_everyone() {
        assert!(can_manage_athlete(&user(true, false, None)));
        assert!(can_manage_athlete(&user(false, true, None)));
        assert!(can_access_athlete(&user(true, false, None), 42));
        assert!(can_access_athlete(&user(false, true, None), 42));
    }

    #[test]
    fn test_linked_user_only_reaches_own_athlete() {
        let linked = user(false, false, Some(7));
        assert!(!can_manage_athlete(&linked));
        for athlete in 1..20 {
            assert_eq!(can_access_athlete(&linked, athlete), athlete == 7);
        }
    }

    #[test]
    fn test_unlinked_user_reaches_nobody() {
        let unlinked = user(false, false, None);
        assert!(!can_manage_athlete(&unlinked));
        assert!(!can_access_athlete(&unlinked, 1));
    }

    #[test]
    fn test_visible_to_filters_rows() {
        let rows = vec![(1, "a"), (2, "b"), (1, "c")];

        let all = visible_to(&user(true, false, None), rows.clone(), |r| r.0);
        assert_eq!(all.len(), 3);

        let own = visible_to(&user(false, false, Some(1)), rows.clone(), |r| r.0);
        assert_eq!(own, vec![(1, "a"), (1, "c")]);

        let none = visible_to(&user(false, false, None), rows, |r| r.0);
        assert!(none.is_empty());
    }
}
