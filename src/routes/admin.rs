// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User administration: coach flag and athlete links.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::render::{page, redirect_error, redirect_success, Flash};
use crate::routes::support::{checkbox, ensure, or_not_found, parse_optional_i64, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", post(update_user))
}

#[derive(Debug, Deserialize)]
pub struct AccessForm {
    #[serde(default)]
    is_coach: Option<String>,
    /// Empty unlinks the account.
    #[serde(default)]
    athlete_id: String,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    ensure(user.is_admin)?;

    let users: Vec<_> = state
        .db
        .list_users()
        .await?
        .into_iter()
        .map(|u| {
            json!({
                "id": u.id,
                "username": u.username,
                "display_name": u.display_name,
                "is_coach": u.is_coach,
                "is_admin": u.is_admin,
                "athlete_id": u.athlete_id,
            })
        })
        .collect();
    let athletes = state.db.list_athletes(None).await?;

    page(
        &state,
        Some(&user),
        &flash,
        "admin/users",
        json!({ "users": users, "athletes": athletes }),
    )
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<AccessForm>,
) -> Result<Response> {
    let target = state.db.get_user(id).await.map_err(or_not_found("User"))?;
    ensure(user.is_admin)?;

    let athlete_id = parse_optional_i64(&form.athlete_id, "Athlete")?;
    let is_coach = checkbox(&form.is_coach);

    match state.db.update_user_access(id, is_coach, athlete_id).await {
        Ok(()) => {
            tracing::info!(
                user_id = id,
                by = user.id,
                is_coach,
                ?athlete_id,
                "Updated user access"
            );
            Ok(redirect_success(
                "/admin/users",
                &format!("Updated {}", target.username),
            ))
        }
        Err(StoreError::AlreadyAssigned) => Ok(redirect_error(
            "/admin/users",
            "That athlete is already linked to another account",
        )),
        Err(StoreError::NotFound) => Err(AppError::not_found("Athlete")),
        Err(e) => Err(e.into()),
    }
}
