// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog pages and equipment links.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::authz::{can_manage_athlete, visible_to};
use crate::db::exercises::EXERCISE_PAGE_SIZE;
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::exercise::split_equipment;
use crate::models::{Exercise, ExerciseInput, Tier, User};
use crate::render::{page, page_with_status, redirect_success, Flash};
use crate::routes::support::{checkbox, ensure, or_not_found, validation_message, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route("/exercises/new", get(new_exercise))
        .route("/exercises/{id}", get(show_exercise).post(update_exercise))
        .route("/exercises/{id}/edit", get(edit_exercise))
        .route("/exercises/{id}/delete", post(delete_exercise))
        .route("/exercises/{id}/equipment", post(link_equipment))
        .route(
            "/exercises/{id}/equipment/{equipment_id}/delete",
            post(unlink_equipment),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ExerciseForm {
    #[validate(length(min = 1, max = 100, message = "is required (at most 100 characters)"))]
    #[serde(default)]
    name: String,
    #[serde(default)]
    tier: String,
    #[validate(length(max = 4000, message = "must be at most 4000 characters"))]
    #[serde(default)]
    form_notes: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(default)]
    demo_url: String,
    #[validate(range(min = 0, max = 3600, message = "must be between 0 and 3600"))]
    #[serde(default)]
    rest_seconds: i64,
}

impl ExerciseForm {
    fn from_exercise(exercise: &Exercise) -> Self {
        Self {
            name: exercise.name.clone(),
            tier: exercise.tier.map(|t| t.as_str().to_string()).unwrap_or_default(),
            form_notes: exercise.form_notes.clone(),
            demo_url: exercise.demo_url.clone(),
            rest_seconds: exercise.rest_seconds,
        }
    }

    /// Trim, validate and convert; `Err` is the message to show with the form.
    fn to_input(&mut self) -> std::result::Result<ExerciseInput, String> {
        self.name = self.name.trim().to_string();
        self.demo_url = self.demo_url.trim().to_string();
        self.validate().map_err(|e| validation_message(&e))?;
        let demo_url = &self.demo_url;
        if !demo_url.is_empty()
            && !(demo_url.starts_with("https://") || demo_url.starts_with("http://"))
        {
            return Err("demo_url: must be an http(s) link".to_string());
        }
        Ok(ExerciseInput {
            name: self.name.clone(),
            tier: Tier::parse_optional(&self.tier)?,
            form_notes: self.form_notes.clone(),
            demo_url: demo_url.clone(),
            rest_seconds: self.rest_seconds,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkForm {
    equipment_id: i64,
    #[serde(default)]
    optional: Option<String>,
}

fn render_form(
    state: &AppState,
    user: &User,
    status: StatusCode,
    error: Option<String>,
    action: String,
    form: &ExerciseForm,
) -> Result<Response> {
    let flash = Flash {
        error,
        ..Flash::default()
    };
    let tiers: Vec<_> = Tier::ALL
        .iter()
        .map(|t| json!({ "value": t.as_str(), "label": t.display_name() }))
        .collect();
    page_with_status(
        state,
        status,
        Some(user),
        &flash,
        "exercises/form",
        json!({ "action": action, "form": form, "tiers": tiers }),
    )
}

async fn fetch_exercise(state: &AppState, id: i64) -> Result<Exercise> {
    state
        .db
        .get_exercise(id)
        .await
        .map_err(or_not_found("Exercise"))
}

/// Paged by name. `offset` is clamped to `0..=total`.
async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let total = state.db.count_exercises().await?;
    let offset = params.offset.unwrap_or(0).clamp(0, total);
    let exercises = state.db.list_exercises(offset).await?;

    let prev_offset = (offset > 0).then(|| (offset - EXERCISE_PAGE_SIZE).max(0));
    let next = offset + EXERCISE_PAGE_SIZE;
    let next_offset = (next < total).then_some(next);

    page(
        &state,
        Some(&user),
        &flash,
        "exercises/index",
        json!({
            "exercises": exercises,
            "total": total,
            "offset": offset,
            "prev_offset": prev_offset,
            "next_offset": next_offset,
            "can_manage": can_manage_athlete(&user),
        }),
    )
}

async fn new_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    render_form(
        &state,
        &user,
        StatusCode::OK,
        None,
        "/exercises".to_string(),
        &ExerciseForm {
            rest_seconds: 90,
            ..ExerciseForm::default()
        },
    )
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(mut form): Form<ExerciseForm>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    let action = "/exercises".to_string();
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;

    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return render_form(&state, &user, unprocessable, Some(message), action, &form),
    };

    match state.db.create_exercise(&input).await {
        Ok(exercise) => Ok(redirect_success(
            &format!("/exercises/{}", exercise.id),
            "Exercise created",
        )),
        Err(StoreError::DuplicateName) => render_form(
            &state,
            &user,
            unprocessable,
            Some(format!("An exercise named {} already exists", input.name)),
            action,
            &form,
        ),
        Err(e) => Err(e.into()),
    }
}

/// Detail page. Assigned athletes are filtered to what the viewer may see.
async fn show_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let exercise = fetch_exercise(&state, id).await?;
    let can_manage = can_manage_athlete(&user);

    let equipment = split_equipment(state.db.list_exercise_equipment(id).await?);
    let athletes = visible_to(&user, state.db.list_assigned_athletes(id).await?, |a| {
        a.athlete_id
    });
    let all_equipment = if can_manage {
        state.db.list_equipment().await?
    } else {
        Vec::new()
    };

    page(
        &state,
        Some(&user),
        &flash,
        "exercises/show",
        json!({
            "exercise": exercise,
            "tier_label": exercise.tier.map(|t| t.display_name()),
            "equipment": equipment,
            "assigned_athletes": athletes,
            "all_equipment": all_equipment,
            "can_manage": can_manage,
        }),
    )
}

async fn edit_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let exercise = fetch_exercise(&state, id).await?;
    ensure(can_manage_athlete(&user))?;
    render_form(
        &state,
        &user,
        StatusCode::OK,
        None,
        format!("/exercises/{id}"),
        &ExerciseForm::from_exercise(&exercise),
    )
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(mut form): Form<ExerciseForm>,
) -> Result<Response> {
    fetch_exercise(&state, id).await?;
    ensure(can_manage_athlete(&user))?;
    let action = format!("/exercises/{id}");
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;

    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return render_form(&state, &user, unprocessable, Some(message), action, &form),
    };

    match state.db.update_exercise(id, &input).await {
        Ok(_) => Ok(redirect_success(&action, "Exercise updated")),
        Err(StoreError::DuplicateName) => render_form(
            &state,
            &user,
            unprocessable,
            Some(format!("An exercise named {} already exists", input.name)),
            action,
            &form,
        ),
        Err(e) => Err(e.into()),
    }
}

/// Exercises with logged sets or template sets cannot be deleted (409).
async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let exercise = fetch_exercise(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    match state.db.delete_exercise(id).await {
        Ok(()) => Ok(redirect_success(
            "/exercises",
            &format!("Deleted {}", exercise.name),
        )),
        Err(StoreError::InUse) => Err(AppError::Conflict(format!(
            "{} is used in logged workouts or program templates",
            exercise.name
        ))),
        Err(e) => Err(e.into()),
    }
}

async fn link_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<LinkForm>,
) -> Result<Response> {
    fetch_exercise(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let equipment = state
        .db
        .get_equipment(form.equipment_id)
        .await
        .map_err(or_not_found("Equipment"))?;
    state
        .db
        .link_equipment(id, equipment.id, checkbox(&form.optional))
        .await?;
    Ok(redirect_success(
        &format!("/exercises/{id}"),
        &format!("Linked {}", equipment.name),
    ))
}

async fn unlink_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, equipment_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_exercise(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    state
        .db
        .unlink_equipment(id, equipment_id)
        .await
        .map_err(or_not_found("Equipment link"))?;
    Ok(redirect_success(&format!("/exercises/{id}"), "Equipment removed"))
}
