// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Accessory plans: per-day supplementary work for an athlete.

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

use crate::authz::{can_access_athlete, can_manage_athlete};
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::accessory::{day_name, group_by_day, DAYS_PER_WEEK};
use crate::models::{AccessoryPlan, AccessoryPlanInput, Athlete, User};
use crate::render::{page_with_status, redirect_success, Flash};
use crate::routes::support::{ensure, fetch_athlete, or_not_found, validation_message, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/athletes/{id}/accessories",
            get(list_accessories).post(create_accessory),
        )
        .route(
            "/athletes/{id}/accessories/{plan_id}/deactivate",
            post(deactivate_accessory),
        )
        .route(
            "/athletes/{id}/accessories/{plan_id}/delete",
            post(delete_accessory),
        )
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AccessoryForm {
    #[validate(range(min = 1, max = 7, message = "must be between 1 and 7"))]
    day: i64,
    exercise_id: i64,
    #[validate(range(min = 1, max = 20, message = "must be between 1 and 20"))]
    #[serde(default = "default_target_sets")]
    target_sets: i64,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    #[serde(default)]
    target_reps: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    #[serde(default)]
    target_weight: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    #[serde(default)]
    notes: String,
    #[serde(default)]
    sort_order: i64,
}

fn default_target_sets() -> i64 {
    3
}

impl AccessoryForm {
    fn to_input(&self) -> AccessoryPlanInput {
        AccessoryPlanInput {
            day: self.day,
            exercise_id: self.exercise_id,
            target_sets: self.target_sets,
            target_reps: self.target_reps.trim().to_string(),
            target_weight: self.target_weight.trim().to_string(),
            notes: self.notes.trim().to_string(),
            sort_order: self.sort_order,
        }
    }
}

/// The plans page, optionally re-shown with an error and the rejected form.
async fn render_plans(
    state: &AppState,
    user: &User,
    athlete: &Athlete,
    flash: &Flash,
    status: StatusCode,
    form: Option<&AccessoryForm>,
) -> Result<Response> {
    let can_manage = can_manage_athlete(user);
    let days = group_by_day(state.db.list_accessory_plans(athlete.id).await?);
    let exercises = if can_manage {
        state.db.list_all_exercises().await?
    } else {
        Vec::new()
    };
    let day_options: Vec<_> = (1..=DAYS_PER_WEEK)
        .map(|d| json!({ "value": d, "label": day_name(d) }))
        .collect();

    page_with_status(
        state,
        status,
        Some(user),
        flash,
        "athletes/accessories",
        json!({
            "athlete": athlete,
            "days": days,
            "can_manage": can_manage,
            "exercises": exercises,
            "day_options": day_options,
            "form": form,
        }),
    )
}

async fn list_accessories(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_access_athlete(&user, id))?;
    render_plans(&state, &user, &athlete, &flash, StatusCode::OK, None).await
}

/// Add a plan. The same exercise twice on one day is rejected with 422.
async fn create_accessory(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<AccessoryForm>,
) -> Result<Response> {
    let athlete = fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let rejected = |message: String| Flash {
        error: Some(message),
        ..Flash::default()
    };

    if let Err(errors) = form.validate() {
        let flash = rejected(validation_message(&errors));
        return render_plans(
            &state,
            &user,
            &athlete,
            &flash,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(&form),
        )
        .await;
    }

    match state.db.create_accessory_plan(id, &form.to_input()).await {
        Ok(plan) => Ok(redirect_success(
            &format!("/athletes/{id}/accessories"),
            &format!("Added {} on {}", plan.exercise_name, day_name(plan.day)),
        )),
        Err(StoreError::DuplicateName) => {
            let flash = rejected(format!(
                "That exercise is already planned for {}",
                day_name(form.day)
            ));
            render_plans(
                &state,
                &user,
                &athlete,
                &flash,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(&form),
            )
            .await
        }
        Err(StoreError::NotFound) => Err(AppError::not_found("Exercise")),
        Err(e) => Err(e.into()),
    }
}

async fn fetch_plan(state: &AppState, athlete_id: i64, plan_id: i64) -> Result<AccessoryPlan> {
    let plan = state
        .db
        .get_accessory_plan(plan_id)
        .await
        .map_err(or_not_found("Accessory plan"))?;
    if plan.athlete_id != athlete_id {
        return Err(AppError::not_found("Accessory plan"));
    }
    Ok(plan)
}

async fn deactivate_accessory(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, plan_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    let plan = fetch_plan(&state, id, plan_id).await?;
    ensure(can_manage_athlete(&user))?;

    state.db.deactivate_accessory_plan(plan.id).await?;
    Ok(redirect_success(
        &format!("/athletes/{id}/accessories"),
        &format!("{} removed from {}", plan.exercise_name, day_name(plan.day)),
    ))
}

async fn delete_accessory(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, plan_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    let plan = fetch_plan(&state, id, plan_id).await?;
    ensure(can_manage_athlete(&user))?;

    state.db.delete_accessory_plan(plan.id).await?;
    Ok(redirect_success(
        &format!("/athletes/{id}/accessories"),
        "Accessory plan deleted",
    ))
}
