// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Equipment catalog management.

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

use crate::authz::can_manage_athlete;
use crate::db::StoreError;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::render::{page_with_status, redirect_success, Flash};
use crate::routes::support::{ensure, or_not_found, validation_message, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/equipment", get(list_equipment).post(create_equipment))
        .route("/equipment/{id}", post(update_equipment))
        .route("/equipment/{id}/delete", post(delete_equipment))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EquipmentForm {
    #[validate(length(min = 1, max = 100, message = "is required (at most 100 characters)"))]
    #[serde(default)]
    name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    #[serde(default)]
    description: String,
}

impl EquipmentForm {
    fn trim_fields(&mut self) {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
    }
}

async fn render_list(
    state: &AppState,
    user: &User,
    status: StatusCode,
    flash: &Flash,
    form: Option<&EquipmentForm>,
) -> Result<Response> {
    let equipment = state.db.list_equipment().await?;
    page_with_status(
        state,
        status,
        Some(user),
        flash,
        "equipment/index",
        json!({ "equipment": equipment, "form": form }),
    )
}

fn rejected(message: String) -> Flash {
    Flash {
        error: Some(message),
        ..Flash::default()
    }
}

async fn list_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    render_list(&state, &user, StatusCode::OK, &flash, None).await
}

async fn create_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(mut form): Form<EquipmentForm>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;
    form.trim_fields();

    if let Err(errors) = form.validate() {
        let flash = rejected(validation_message(&errors));
        return render_list(&state, &user, unprocessable, &flash, Some(&form)).await;
    }

    match state
        .db
        .create_equipment(&form.name, &form.description)
        .await
    {
        Ok(equipment) => Ok(redirect_success(
            "/equipment",
            &format!("Added {}", equipment.name),
        )),
        Err(StoreError::DuplicateName) => {
            let flash = rejected(format!("{} already exists", form.name));
            render_list(&state, &user, unprocessable, &flash, Some(&form)).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn update_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(mut form): Form<EquipmentForm>,
) -> Result<Response> {
    state
        .db
        .get_equipment(id)
        .await
        .map_err(or_not_found("Equipment"))?;
    ensure(can_manage_athlete(&user))?;
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;
    form.trim_fields();

    if let Err(errors) = form.validate() {
        let flash = rejected(validation_message(&errors));
        return render_list(&state, &user, unprocessable, &flash, Some(&form)).await;
    }

    match state
        .db
        .update_equipment(id, &form.name, &form.description)
        .await
    {
        Ok(_) => Ok(redirect_success("/equipment", "Equipment updated")),
        Err(StoreError::DuplicateName) => {
            let flash = rejected(format!("{} already exists", form.name));
            render_list(&state, &user, unprocessable, &flash, Some(&form)).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_equipment(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let equipment = state
        .db
        .get_equipment(id)
        .await
        .map_err(or_not_found("Equipment"))?;
    ensure(can_manage_athlete(&user))?;

    state.db.delete_equipment(id).await?;
    Ok(redirect_success(
        "/equipment",
        &format!("Deleted {}", equipment.name),
    ))
}
