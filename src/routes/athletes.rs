// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete pages: list, profile, create/edit/delete, tier promotion.

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

use crate::authz::{can_access_athlete, can_manage_athlete, visible_to};
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::accessory::group_by_day;
use crate::models::program::{build_week_view, current_week};
use crate::models::{Athlete, AthleteInput, Tier, User};
use crate::render::{page, page_with_status, redirect_error, redirect_success, Flash};
use crate::routes::support::{ensure, fetch_athlete, validation_message, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/athletes", get(list_athletes).post(create_athlete))
        .route("/athletes/new", get(new_athlete))
        .route("/athletes/{id}", get(show_athlete).post(update_athlete))
        .route("/athletes/{id}/edit", get(edit_athlete))
        .route("/athletes/{id}/delete", post(delete_athlete))
        .route("/athletes/{id}/promote", post(promote_athlete))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    tier: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct AthleteForm {
    #[validate(length(min = 1, max = 100, message = "is required (at most 100 characters)"))]
    #[serde(default)]
    name: String,
    #[serde(default)]
    tier: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    #[serde(default)]
    notes: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[serde(default)]
    goal: String,
}

impl AthleteForm {
    fn from_athlete(athlete: &Athlete) -> Self {
        Self {
            name: athlete.name.clone(),
            tier: athlete.tier.map(|t| t.as_str().to_string()).unwrap_or_default(),
            notes: athlete.notes.clone(),
            goal: athlete.goal.clone(),
        }
    }

    /// Trim, validate and convert; `Err` carries the message to show.
    fn into_input(mut self) -> std::result::Result<AthleteInput, (Self, String)> {
        self.name = self.name.trim().to_string();
        self.goal = self.goal.trim().to_string();
        if let Err(errors) = self.validate() {
            let message = validation_message(&errors);
            return Err((self, message));
        }
        let tier = match Tier::parse_optional(&self.tier) {
            Ok(tier) => tier,
            Err(message) => return Err((self, message)),
        };
        Ok(AthleteInput {
            name: self.name,
            tier,
            notes: self.notes,
            goal: self.goal,
        })
    }
}

fn tier_options() -> Vec<serde_json::Value> {
    Tier::ALL
        .iter()
        .map(|t| json!({ "value": t.as_str(), "label": t.display_name() }))
        .collect()
}

fn render_form(
    state: &AppState,
    user: &User,
    status: StatusCode,
    error: Option<String>,
    action: String,
    form: &AthleteForm,
) -> Result<Response> {
    let flash = Flash {
        error,
        ..Flash::default()
    };
    page_with_status(
        state,
        status,
        Some(user),
        &flash,
        "athletes/form",
        json!({ "action": action, "form": form, "tiers": tier_options() }),
    )
}

/// Managers see every athlete; others see only their own profile.
async fn list_athletes(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let tier = Tier::parse_optional(params.tier.as_deref().unwrap_or_default())
        .map_err(AppError::BadRequest)?;

    let athletes = state.db.list_athletes(tier).await?;
    let athletes = visible_to(&user, athletes, |a| a.id);

    page(
        &state,
        Some(&user),
        &flash,
        "athletes/index",
        json!({
            "athletes": athletes,
            "tier": tier,
            "tiers": tier_options(),
            "can_manage": can_manage_athlete(&user),
        }),
    )
}

async fn new_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    render_form(
        &state,
        &user,
        StatusCode::OK,
        None,
        "/athletes".to_string(),
        &AthleteForm::default(),
    )
}

async fn create_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<AthleteForm>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;

    let input = match form.into_input() {
        Ok(input) => input,
        Err((form, message)) => {
            return render_form(
                &state,
                &user,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(message),
                "/athletes".to_string(),
                &form,
            );
        }
    };

    let athlete = state.db.create_athlete(&input).await?;
    Ok(redirect_success(
        &format!("/athletes/{}", athlete.id),
        "Athlete created",
    ))
}

async fn show_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_access_athlete(&user, id))?;
    let can_manage = can_manage_athlete(&user);

    let mut assignments = state.db.list_assignments(id).await?;
    if !can_manage {
        assignments.retain(|a| a.active);
    }
    let accessory_days = group_by_day(state.db.list_accessory_plans(id).await?);

    let program = match state.db.active_program(id).await? {
        Some(assignment) => {
            let template = state.db.get_template(assignment.template_id).await?;
            let sets = state.db.list_prescribed_sets(template.id).await?;
            let today = chrono::Utc::now().date_naive();
            let week = current_week(assignment.start_date, today, template.num_weeks);
            Some(json!({
                "assignment": assignment,
                "template": template,
                "week_view": build_week_view(&template, &sets, week),
            }))
        }
        None => None,
    };

    let workouts: Vec<_> = state.db.list_workouts(id).await?.into_iter().take(5).collect();

    let manage = if can_manage {
        json!({
            "exercises": state.db.list_all_exercises().await?,
            "templates": state.db.list_templates().await?,
            "program_history": state.db.list_program_assignments(id).await?,
        })
    } else {
        serde_json::Value::Null
    };

    page(
        &state,
        Some(&user),
        &flash,
        "athletes/show",
        json!({
            "athlete": athlete,
            "tier_label": athlete.tier.map(|t| t.display_name()),
            "next_tier": Tier::next(athlete.tier),
            "can_manage": can_manage,
            "assignments": assignments,
            "accessory_days": accessory_days,
            "program": program,
            "recent_workouts": workouts,
            "manage": manage,
        }),
    )
}

async fn edit_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;
    render_form(
        &state,
        &user,
        StatusCode::OK,
        None,
        format!("/athletes/{id}"),
        &AthleteForm::from_athlete(&athlete),
    )
}

async fn update_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<AthleteForm>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let input = match form.into_input() {
        Ok(input) => input,
        Err((form, message)) => {
            return render_form(
                &state,
                &user,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(message),
                format!("/athletes/{id}"),
                &form,
            );
        }
    };

    state.db.update_athlete(id, &input).await?;
    Ok(redirect_success(&format!("/athletes/{id}"), "Athlete updated"))
}

async fn delete_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    state.db.delete_athlete(id).await?;
    tracing::info!(athlete_id = id, by = user.id, "Deleted athlete");
    Ok(redirect_success(
        "/athletes",
        &format!("Deleted {}", athlete.name),
    ))
}

/// Advance one tier. At the top tier the athlete is left unchanged and the
/// request fails with 422.
async fn promote_athlete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    match state.db.promote_athlete(id).await {
        Ok(tier) => Ok(redirect_success(
            &format!("/athletes/{id}"),
            &format!("Promoted to {}", tier.display_name()),
        )),
        Err(StoreError::AlreadyAtMaxTier) => Err(AppError::Unprocessable(
            "Athlete is already at the highest tier".to_string(),
        )),
        Err(StoreError::NotFound) => Ok(redirect_error("/athletes", "Athlete no longer exists")),
        Err(e) => Err(e.into()),
    }
}
