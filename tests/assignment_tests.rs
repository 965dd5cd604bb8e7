// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise assignments, accessory plans and tier promotion.

use axum::http::StatusCode;
use coach_hub::models::Tier;

mod common;

async fn active_count(state: &coach_hub::AppState, athlete_id: i64, exercise_id: i64) -> usize {
    state
        .db
        .list_assignments(athlete_id)
        .await
        .unwrap()
        .iter()
        .filter(|a| a.exercise_id == exercise_id && a.active)
        .count()
}

async fn tier_of(state: &coach_hub::AppState, athlete_id: i64) -> Option<Tier> {
    state.db.get_athlete(athlete_id).await.unwrap().tier
}

#[tokio::test]
async fn test_assigning_twice_is_a_noop() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);
    let alice = common::create_athlete(&state, "Alice").await;
    let squat = common::exercise_id(&state, "Back Squat").await;
    let path = format!("/athletes/{}/assignments", alice.id);
    let body = format!("exercise_id={squat}&target_reps=5");

    for _ in 0..2 {
        let response = common::post_form(&app, &path, Some(&cookie), &body).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(common::location(&response).starts_with(&format!("/athletes/{}?success=", alice.id)));
    }

    assert_eq!(active_count(&state, alice.id, squat).await, 1);
}

#[tokio::test]
async fn test_deactivate_reactivate_cycle() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);
    let alice = common::create_athlete(&state, "Alice").await;
    let squat = common::exercise_id(&state, "Back Squat").await;

    let id = state.db.assign_exercise(alice.id, squat, None).await.unwrap();

    let response = common::post_form(
        &app,
        &format!("/athletes/{}/assignments/{id}/deactivate", alice.id),
        Some(&cookie),
        "",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(active_count(&state, alice.id, squat).await, 0);
    // The row is kept.
    assert_eq!(state.db.list_assignments(alice.id).await.unwrap().len(), 1);

    for _ in 0..2 {
        let response = common::post_form(
            &app,
            &format!("/athletes/{}/assignments/{id}/reactivate", alice.id),
            Some(&cookie),
            "",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(active_count(&state, alice.id, squat).await, 1);
    }
}

#[tokio::test]
async fn test_reactivate_after_reassign_keeps_one_active_row() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);
    let alice = common::create_athlete(&state, "Alice").await;
    let squat = common::exercise_id(&state, "Back Squat").await;

    let old = state.db.assign_exercise(alice.id, squat, None).await.unwrap();
    state.db.deactivate_assignment(old).await.unwrap();
    state.db.assign_exercise(alice.id, squat, Some(3)).await.unwrap();

    let response = common::post_form(
        &app,
        &format!("/athletes/{}/assignments/{old}/reactivate", alice.id),
        Some(&cookie),
        "",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(active_count(&state, alice.id, squat).await, 1);
}

#[tokio::test]
async fn test_assignment_of_other_athlete_is_404() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);
    let alice = common::create_athlete(&state, "Alice").await;
    let bob = common::create_athlete(&state, "Bob").await;
    let squat = common::exercise_id(&state, "Back Squat").await;

    let id = state.db.assign_exercise(alice.id, squat, None).await.unwrap();

    let response = common::post_form(
        &app,
        &format!("/athletes/{}/assignments/{id}/deactivate", bob.id),
        Some(&cookie),
        "",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(active_count(&state, alice.id, squat).await, 1);
}

#[tokio::test]
async fn test_non_coach_sees_only_active_assignments() {
    let (app, state, _uploads) = common::create_test_app().await;
    let alice = common::create_athlete(&state, "Alice").await;
    let user = common::create_linked_user(&state, "alice", alice.id).await;
    let squat = common::exercise_id(&state, "Back Squat").await;
    let bench = common::exercise_id(&state, "Bench Press").await;

    state.db.assign_exercise(alice.id, squat, None).await.unwrap();
    let bench_id = state.db.assign_exercise(alice.id, bench, None).await.unwrap();
    state.db.deactivate_assignment(bench_id).await.unwrap();

    let page = common::body_json(
        common::get(&app, &format!("/athletes/{}", alice.id), Some(&common::session(&state, &user))).await,
    )
    .await;

    let assignments = page["page"]["data"]["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["exercise_name"], "Back Squat");
    assert!(page["page"]["data"]["manage"].is_null());
}

#[tokio::test]
async fn test_promotion_scenario() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);

    let response = common::post_form(&app, "/athletes", Some(&cookie), "name=Alice&tier=foundational").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let alice = state.db.list_athletes(None).await.unwrap().remove(0);
    assert_eq!(alice.tier, Some(Tier::Foundational));
    let promote = format!("/athletes/{}/promote", alice.id);

    let response = common::post_form(&app, &promote, Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(tier_of(&state, alice.id).await, Some(Tier::Intermediate));

    let response = common::post_form(&app, &promote, Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(tier_of(&state, alice.id).await, Some(Tier::SportPerformance));

    for _ in 0..2 {
        let response = common::post_form(&app, &promote, Some(&cookie), "").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(tier_of(&state, alice.id).await, Some(Tier::SportPerformance));
    }
}

#[tokio::test]
async fn test_create_athlete_with_bad_tier_rerenders() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;

    let response = common::post_form(
        &app,
        "/athletes",
        Some(&common::session(&state, &coach)),
        "name=Alice&tier=legendary",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = common::body_json(response).await;
    assert_eq!(page["template"], "athletes/form");
    assert_eq!(page["page"]["data"]["form"]["name"], "Alice");
    assert!(state.db.list_athletes(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_accessory_on_same_day_is_rejected() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let cookie = common::session(&state, &coach);
    let alice = common::create_athlete(&state, "Alice").await;
    let pullup = common::exercise_id(&state, "Pull-up").await;
    let path = format!("/athletes/{}/accessories", alice.id);

    let body = format!("day=2&exercise_id={pullup}&target_sets=3&target_reps=8");
    let response = common::post_form(&app, &path, Some(&cookie), &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = common::post_form(&app, &path, Some(&cookie), &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = common::body_json(response).await;
    assert_eq!(page["template"], "athletes/accessories");

    // Another day is fine.
    let body = format!("day=4&exercise_id={pullup}&target_sets=3");
    let response = common::post_form(&app, &path, Some(&cookie), &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let plans = state.db.list_accessory_plans(alice.id).await.unwrap();
    assert_eq!(plans.len(), 2);
}

#[tokio::test]
async fn test_accessory_day_out_of_range_is_rejected() {
    let (app, state, _uploads) = common::create_test_app().await;
    let coach = common::create_coach(&state, "coach").await;
    let alice = common::create_athlete(&state, "Alice").await;
    let pullup = common::exercise_id(&state, "Pull-up").await;

    let response = common::post_form(
        &app,
        &format!("/athletes/{}/accessories", alice.id),
        Some(&common::session(&state, &coach)),
        &format!("day=8&exercise_id={pullup}&target_sets=3"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.db.list_accessory_plans(alice.id).await.unwrap().is_empty());
}
