// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::db::StoreError;
use crate::error::Result;
use crate::middleware::auth::{create_jwt, removal_cookie, session_cookie};
use crate::models::NewUser;
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::render::{page, page_with_status, redirect_success, Flash};
use crate::routes::support::{validation_message, Form};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/register", get(register_form).post(register))
        .route("/logout", post(logout))
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default, skip_serializing)]
    password: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 3, max = 32, message = "must be 3 to 32 characters"))]
    #[serde(default)]
    username: String,
    #[validate(length(min = 8, max = 128, message = "must be at least 8 characters"))]
    #[serde(default, skip_serializing)]
    password: String,
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    #[serde(default)]
    display_name: String,
}

async fn login_form(State(state): State<Arc<AppState>>, Query(flash): Query<Flash>) -> Result<Response> {
    page(&state, None, &flash, "auth/login", json!({ "form": LoginForm::default() }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let username = form.username.trim().to_string();

    let user = match state.db.get_user_by_username(&username).await {
        Ok(user) => Some(user),
        Err(StoreError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    let verified = match &user {
        Some(user) => {
            verify_password_blocking(form.password.clone(), user.password_hash.clone()).await?
        }
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        tracing::info!(username = %username, "Failed login");
        let flash = Flash {
            error: Some("Invalid username or password".to_string()),
            ..Flash::default()
        };
        return page_with_status(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            &flash,
            "auth/login",
            json!({ "form": LoginForm { username, password: String::new() } }),
        );
    };

    let token = create_jwt(user.id, &state.config.session_signing_key)?;
    tracing::info!(user_id = user.id, "User logged in");

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, Redirect::to("/")).into_response())
}

async fn register_form(
    State(state): State<Arc<AppState>>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    page(&state, None, &flash, "auth/register", json!({ "form": RegisterForm::default() }))
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(mut form): Form<RegisterForm>,
) -> Result<Response> {
    form.username = form.username.trim().to_string();
    form.display_name = form.display_name.trim().to_string();

    let rerender = |state: &AppState, form: &RegisterForm, message: String| {
        let flash = Flash {
            error: Some(message),
            ..Flash::default()
        };
        page_with_status(
            state,
            StatusCode::UNPROCESSABLE_ENTITY,
            None,
            &flash,
            "auth/register",
            json!({ "form": form }),
        )
    };

    if let Err(errors) = form.validate() {
        return rerender(&state, &form, validation_message(&errors));
    }

    let password_hash = hash_password_blocking(form.password.clone()).await?;
    let new_user = NewUser {
        username: form.username.clone(),
        password_hash,
        display_name: form.display_name.clone(),
    };

    let user = match state.db.create_user(&new_user).await {
        Ok(user) => user,
        Err(StoreError::DuplicateUsername) => {
            return rerender(&state, &form, "That username is already taken".to_string());
        }
        Err(e) => return Err(e.into()),
    };

    let token = create_jwt(user.id, &state.config.session_signing_key)?;
    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, redirect_success("/", "Welcome to Coach Hub")).into_response())
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar.add(removal_cookie(state.config.cookie_secure));
    (jar, Redirect::to("/login")).into_response()
}
