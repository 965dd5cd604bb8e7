// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged workouts and coach reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::authz::{can_access_athlete, can_manage_athlete};
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{ReviewStatus, Workout, WorkoutSetInput};
use crate::render::{page, page_with_status, redirect_success, Flash};
use crate::routes::support::{
    ensure, fetch_athlete, or_not_found, parse_date_or_today, parse_optional_f64,
    parse_optional_i64, Form,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/athletes/{id}/workouts",
            get(list_workouts).post(create_workout),
        )
        .route("/athletes/{id}/workouts/{workout_id}", get(show_workout))
        .route("/athletes/{id}/workouts/{workout_id}/sets", post(add_set))
        .route(
            "/athletes/{id}/workouts/{workout_id}/review",
            post(submit_review),
        )
}

#[derive(Debug, Deserialize)]
pub struct WorkoutForm {
    #[serde(default)]
    date: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutSetForm {
    exercise_id: i64,
    #[serde(default)]
    reps: String,
    #[serde(default)]
    weight: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    status: String,
    #[serde(default)]
    notes: String,
}

/// Load a workout and make sure it was logged for the athlete in the path.
async fn fetch_workout(state: &AppState, athlete_id: i64, workout_id: i64) -> Result<Workout> {
    let workout = state
        .db
        .get_workout(workout_id)
        .await
        .map_err(or_not_found("Workout"))?;
    if workout.athlete_id != athlete_id {
        return Err(AppError::not_found("Workout"));
    }
    Ok(workout)
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_access_athlete(&user, id))?;

    let workouts = state.db.list_workouts(id).await?;
    page(
        &state,
        Some(&user),
        &flash,
        "workouts/index",
        json!({
            "athlete": athlete,
            "workouts": workouts,
            "today": chrono::Utc::now().date_naive(),
        }),
    )
}

/// One workout per athlete per day; logging a second one for the same
/// date re-shows the list with 422.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<WorkoutForm>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_access_athlete(&user, id))?;

    let date = parse_date_or_today(&form.date)?;
    match state.db.create_workout(id, date, form.notes.trim()).await {
        Ok(workout) => Ok(redirect_success(
            &format!("/athletes/{id}/workouts/{}", workout.id),
            "Workout started",
        )),
        Err(StoreError::DuplicateName) => {
            let flash = Flash {
                error: Some(format!("A workout is already logged for {date}")),
                ..Flash::default()
            };
            let workouts = state.db.list_workouts(id).await?;
            page_with_status(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(&user),
                &flash,
                "workouts/index",
                json!({ "athlete": athlete, "workouts": workouts, "today": date }),
            )
        }
        Err(e) => Err(e.into()),
    }
}

async fn show_workout(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, workout_id)): Path<(i64, i64)>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    let workout = fetch_workout(&state, id, workout_id).await?;
    ensure(can_access_athlete(&user, id))?;

    let sets = state.db.list_workout_sets(workout_id).await?;
    let review = state.db.get_review(workout_id).await?;
    let exercises = state.db.list_all_exercises().await?;

    page(
        &state,
        Some(&user),
        &flash,
        "workouts/show",
        json!({
            "athlete": athlete,
            "workout": workout,
            "sets": sets,
            "review": review,
            "exercises": exercises,
            "can_review": can_manage_athlete(&user),
            "statuses": [ReviewStatus::Approved, ReviewStatus::NeedsWork],
        }),
    )
}

async fn add_set(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, workout_id)): Path<(i64, i64)>,
    Form(form): Form<WorkoutSetForm>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    fetch_workout(&state, id, workout_id).await?;
    ensure(can_access_athlete(&user, id))?;

    let input = WorkoutSetInput {
        exercise_id: form.exercise_id,
        reps: parse_optional_i64(&form.reps, "Reps")?,
        weight: parse_optional_f64(&form.weight, "Weight")?,
        notes: form.notes.trim().to_string(),
    };
    if input.reps.is_some_and(|r| r < 0) || input.weight.is_some_and(|w| w < 0.0) {
        return Err(AppError::BadRequest(
            "Reps and weight cannot be negative".to_string(),
        ));
    }

    let set = state
        .db
        .add_workout_set(workout_id, &input)
        .await
        .map_err(or_not_found("Exercise"))?;
    Ok(redirect_success(
        &format!("/athletes/{id}/workouts/{workout_id}"),
        &format!("Logged set {} of {}", set.set_number, set.exercise_name),
    ))
}

/// Create or replace the coach review. Resubmitting overwrites the
/// existing review rather than adding a second one.
async fn submit_review(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, workout_id)): Path<(i64, i64)>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    fetch_workout(&state, id, workout_id).await?;
    ensure(can_manage_athlete(&user))?;

    let status = ReviewStatus::parse(form.status.trim()).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown review status '{}'", form.status.trim()))
    })?;

    let review = state
        .db
        .upsert_review(workout_id, user.id, status, form.notes.trim())
        .await?;
    tracing::info!(workout_id, coach_id = user.id, status = %review.status, "Reviewed workout");

    Ok(redirect_success(
        &format!("/athletes/{id}/workouts/{workout_id}"),
        "Review saved",
    ))
}
