// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Who can see and change which athlete.

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_linked_user_sees_only_own_athlete() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    let bob = common::create_athlete(&state, "Bob").await;
    let user = common::create_linked_user(&state, "alice", alice.id).await;
    let cookie = common::session(&state, &user);

    for path in ["", "/accessories", "/workouts"] {
        let response = common::get(&app, &format!("/athletes/{}{path}", alice.id), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "own athlete{path}");

        let response = common::get(&app, &format!("/athletes/{}{path}", bob.id), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "other athlete{path}");
        assert_eq!(common::body_text(response).await, "forbidden");
    }
}

#[tokio::test]
async fn test_missing_athlete_is_404_before_403() {
    let (app, state, _uploads) = common::create_test_app().await;
    let user = common::create_user(&state, "unlinked").await;
    let cookie = common::session(&state, &user);

    let response = common::get(&app, "/athletes/424242", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(common::body_text(response).await.starts_with("error: "));
}

#[tokio::test]
async fn test_athlete_list_is_filtered_by_viewer() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    common::create_athlete(&state, "Bob").await;
    let coach = common::create_coach(&state, "coach").await;
    let linked = common::create_linked_user(&state, "alice", alice.id).await;
    let unlinked = common::create_user(&state, "nobody").await;

    let count = |page: serde_json::Value| page["page"]["data"]["athletes"].as_array().unwrap().len();

    let page = common::body_json(common::get(&app, "/athletes", Some(&common::session(&state, &coach))).await).await;
    assert_eq!(count(page), 2);

    let page = common::body_json(common::get(&app, "/athletes", Some(&common::session(&state, &linked))).await).await;
    assert_eq!(count(page.clone()), 1);
    assert_eq!(page["page"]["data"]["athletes"][0]["name"], "Alice");

    let page = common::body_json(common::get(&app, "/athletes", Some(&common::session(&state, &unlinked))).await).await;
    assert_eq!(count(page), 0);
}

#[tokio::test]
async fn test_non_coach_cannot_manage() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    let user = common::create_linked_user(&state, "alice", alice.id).await;
    let cookie = common::session(&state, &user);
    let squat = common::exercise_id(&state, "Back Squat").await;

    let attempts = [
        (format!("/athletes/{}/promote", alice.id), String::new()),
        (format!("/athletes/{}/delete", alice.id), String::new()),
        (format!("/athletes/{}/assignments", alice.id), format!("exercise_id={squat}")),
        (
            format!("/athletes/{}/accessories", alice.id),
            format!("day=1&exercise_id={squat}&target_sets=3"),
        ),
        ("/exercises".to_string(), "name=Lunge".to_string()),
        ("/programs".to_string(), "name=Base&num_weeks=4&num_days=3".to_string()),
    ];
    for (path, body) in attempts {
        let response = common::post_form(&app, &path, Some(&cookie), &body).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }

    // Nothing changed.
    let athlete = state.db.get_athlete(alice.id).await.unwrap();
    assert_eq!(athlete.tier, None);
    assert!(state.db.list_assignments(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_pages_need_admin() {
    let (app, state, _uploads) = common::create_test_app().await;
    let admin = common::admin(&state).await;
    let coach = common::create_coach(&state, "coach").await;
    let alice = common::create_athlete(&state, "Alice").await;
    let target = common::create_user(&state, "target").await;

    let response = common::get(&app, "/admin/users", Some(&common::session(&state, &coach))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = common::post_form(
        &app,
        "/admin/users/999999",
        Some(&common::session(&state, &coach)),
        "athlete_id=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::post_form(
        &app,
        &format!("/admin/users/{}", target.id),
        Some(&common::session(&state, &admin)),
        &format!("athlete_id={}", alice.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let target = state.db.get_user(target.id).await.unwrap();
    assert_eq!(target.athlete_id, Some(alice.id));
    assert!(!target.is_coach);
}

#[tokio::test]
async fn test_dashboard_routes_by_role() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    let coach = common::create_coach(&state, "coach").await;
    let linked = common::create_linked_user(&state, "alice", alice.id).await;
    let unlinked = common::create_user(&state, "nobody").await;

    let page = common::body_json(common::get(&app, "/", Some(&common::session(&state, &coach))).await).await;
    assert_eq!(page["template"], "dashboard/coach");
    assert_eq!(page["page"]["data"]["athlete_count"], 1);

    let response = common::get(&app, "/", Some(&common::session(&state, &linked))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), format!("/athletes/{}", alice.id));

    let page = common::body_json(common::get(&app, "/", Some(&common::session(&state, &unlinked))).await).await;
    assert_eq!(page["template"], "dashboard/athlete");
    assert!(page["page"]["data"]["athlete_id"].is_null());
}

#[tokio::test]
async fn test_exercise_page_lists_only_visible_athletes() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    let bob = common::create_athlete(&state, "Bob").await;
    let squat = common::exercise_id(&state, "Back Squat").await;
    for athlete in [&alice, &bob] {
        state.db.assign_exercise(athlete.id, squat, Some(5)).await.unwrap();
    }

    let coach = common::create_coach(&state, "coach").await;
    let linked = common::create_linked_user(&state, "alice", alice.id).await;
    let unlinked = common::create_user(&state, "drifter").await;

    let assigned = |user: coach_hub::models::User| {
        let app = app.clone();
        let cookie = common::session(&state, &user);
        async move {
            let response = common::get(&app, &format!("/exercises/{squat}"), Some(&cookie)).await;
            assert_eq!(response.status(), StatusCode::OK);
            let page = common::body_json(response).await;
            let mut ids: Vec<i64> = page["page"]["data"]["assigned_athletes"]
                .as_array()
                .unwrap()
                .iter()
                .map(|a| a["athlete_id"].as_i64().unwrap())
                .collect();
            ids.sort();
            ids
        }
    };

    assert_eq!(assigned(coach).await, vec![alice.id, bob.id]);
    assert_eq!(assigned(linked).await, vec![alice.id]);
    assert_eq!(assigned(unlinked).await, Vec::<i64>::new());
}

#[tokio::test]
async fn test_malformed_assignment_form_is_bad_request() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let alice = common::create_athlete(&state, "Alice").await;

    let response = common::post_form(
        &app,
        &format!("/athletes/{}/assignments", alice.id),
        Some(&common::session(&state, &coach)),
        "exercise_id=abc",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(common::body_text(response).await.starts_with("error: "));
    assert!(state.db.list_assignments(alice.id).await.unwrap().is_empty());
}
