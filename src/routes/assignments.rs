// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise assignments for an athlete, and per-exercise history.

use axum::{
    extract::{Path, Query, State},
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
use crate::models::Assignment;
use crate::render::{page, redirect_success, Flash};
use crate::routes::support::{ensure, fetch_athlete, or_not_found, parse_optional_i64, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/athletes/{id}/assignments", post(assign_exercise))
        .route(
            "/athletes/{id}/assignments/{assignment_id}/deactivate",
            post(deactivate_assignment),
        )
        .route(
            "/athletes/{id}/assignments/{assignment_id}/reactivate",
            post(reactivate_assignment),
        )
        .route(
            "/athletes/{id}/exercises/{exercise_id}/history",
            get(exercise_history),
        )
}

#[derive(Debug, Deserialize)]
pub struct AssignForm {
    exercise_id: i64,
    #[serde(default)]
    target_reps: String,
}

/// Assigning an exercise that is already actively assigned is a no-op
/// that still redirects as success.
async fn assign_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<AssignForm>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let target_reps = parse_optional_i64(&form.target_reps, "Target reps")?;
    if target_reps.is_some_and(|r| r < 1) {
        return Err(AppError::BadRequest("Target reps must be positive".to_string()));
    }

    let back = format!("/athletes/{id}");
    match state
        .db
        .assign_exercise(id, form.exercise_id, target_reps)
        .await
    {
        Ok(_) => Ok(redirect_success(&back, "Exercise assigned")),
        Err(StoreError::AlreadyAssigned) => {
            tracing::debug!(athlete_id = id, exercise_id = form.exercise_id, "Already assigned");
            Ok(redirect_success(&back, "Exercise already assigned"))
        }
        Err(StoreError::NotFound) => Err(AppError::not_found("Exercise")),
        Err(e) => Err(e.into()),
    }
}

/// Load an assignment and make sure it belongs to the athlete in the path.
async fn fetch_assignment(state: &AppState, athlete_id: i64, assignment_id: i64) -> Result<Assignment> {
    let assignment = state
        .db
        .get_assignment(assignment_id)
        .await
        .map_err(or_not_found("Assignment"))?;
    if assignment.athlete_id != athlete_id {
        return Err(AppError::not_found("Assignment"));
    }
    Ok(assignment)
}

async fn deactivate_assignment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, assignment_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    let assignment = fetch_assignment(&state, id, assignment_id).await?;
    ensure(can_manage_athlete(&user))?;

    state.db.deactivate_assignment(assignment.id).await?;
    Ok(redirect_success(
        &format!("/athletes/{id}"),
        &format!("{} deactivated", assignment.exercise_name),
    ))
}

/// Reactivate an old assignment. If the exercise was re-assigned in the
/// meantime the existing active row stands and this is a no-op.
async fn reactivate_assignment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, assignment_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    let assignment = fetch_assignment(&state, id, assignment_id).await?;
    ensure(can_manage_athlete(&user))?;

    let back = format!("/athletes/{id}");
    match state.db.reactivate_assignment(assignment.id).await {
        Ok(()) => Ok(redirect_success(
            &back,
            &format!("{} reactivated", assignment.exercise_name),
        )),
        Err(StoreError::AlreadyAssigned) => Ok(redirect_success(&back, "Exercise already assigned")),
        Err(e) => Err(e.into()),
    }
}

async fn exercise_history(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, exercise_id)): Path<(i64, i64)>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    let exercise = state
        .db
        .get_exercise(exercise_id)
        .await
        .map_err(or_not_found("Exercise"))?;
    ensure(can_access_athlete(&user, id))?;

    let history = state.db.exercise_history(id, exercise_id).await?;
    let best_weight = history
        .iter()
        .filter_map(|h| h.weight)
        .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w))));

    page(
        &state,
        Some(&user),
        &flash,
        "athletes/history",
        json!({
            "athlete": athlete,
            "exercise": exercise,
            "history": history,
            "best_weight": best_weight,
        }),
    )
}
