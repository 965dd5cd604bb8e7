// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use coach_hub::config::Config;
use coach_hub::db::Database;
use coach_hub::middleware::auth::{create_jwt, SESSION_COOKIE};
use coach_hub::models::{Athlete, AthleteInput, NewUser, User};
use coach_hub::render::{RenderError, Renderer};
use coach_hub::routes::create_router;
use coach_hub::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Renderer that returns the page context as JSON so tests can inspect it.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, name: &str, page: &Value) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&json!({ "template": name, "page": page }))?)
    }

    fn forbidden(&self) -> String {
        "forbidden".to_string()
    }

    fn error_fragment(&self, message: &str) -> String {
        format!("error: {message}")
    }
}

/// Create a test app on an in-memory database with a temporary upload
/// directory. An `admin` account is created first so that accounts made
/// by the tests are never bootstrapped as admin.
/// Returns the router, the shared state, and the upload dir guard.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>, TempDir) {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let mut config = Config::test_default();
    config.upload_dir = uploads.path().to_path_buf();

    let db = Database::open(&config.database_url, config.db_busy_timeout)
        .await
        .expect("Failed to open in-memory database");

    let state = Arc::new(AppState {
        config,
        db,
        renderer: Arc::new(JsonRenderer),
    });

    create_user(&state, "admin").await;

    (create_router(state.clone()), state, uploads)
}

/// Plain account; the password hash is not a real hash, so it cannot log in.
#[allow(dead_code)]
pub async fn create_user(state: &AppState, username: &str) -> User {
    state
        .db
        .create_user(&NewUser {
            username: username.to_string(),
            password_hash: "unused".to_string(),
            display_name: String::new(),
        })
        .await
        .expect("Failed to create user")
}

#[allow(dead_code)]
pub async fn admin(state: &AppState) -> User {
    state
        .db
        .get_user_by_username("admin")
        .await
        .expect("admin user missing")
}

#[allow(dead_code)]
pub async fn create_coach(state: &AppState, username: &str) -> User {
    let user = create_user(state, username).await;
    state
        .db
        .update_user_access(user.id, true, None)
        .await
        .expect("Failed to make coach");
    state.db.get_user(user.id).await.unwrap()
}

#[allow(dead_code)]
pub async fn create_athlete(state: &AppState, name: &str) -> Athlete {
    state
        .db
        .create_athlete(&AthleteInput {
            name: name.to_string(),
            tier: None,
            notes: String::new(),
            goal: String::new(),
        })
        .await
        .expect("Failed to create athlete")
}

/// Non-coach account linked to `athlete_id`.
#[allow(dead_code)]
pub async fn create_linked_user(state: &AppState, username: &str, athlete_id: i64) -> User {
    let user = create_user(state, username).await;
    state
        .db
        .update_user_access(user.id, false, Some(athlete_id))
        .await
        .expect("Failed to link user");
    state.db.get_user(user.id).await.unwrap()
}

/// `Cookie` header value for a session of `user`.
#[allow(dead_code)]
pub fn session(state: &AppState, user: &User) -> String {
    let token = create_jwt(user.id, &state.config.session_signing_key).unwrap();
    format!("{SESSION_COOKIE}={token}")
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// POST an urlencoded form body.
#[allow(dead_code)]
pub async fn post_form(app: &Router, uri: &str, cookie: Option<&str>, body: &str) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Parse a page rendered by [`JsonRenderer`].
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).unwrap_or_else(|_| panic!("not a rendered page: {text}"))
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Id of a seeded catalog exercise.
#[allow(dead_code)]
pub async fn exercise_id(state: &AppState, name: &str) -> i64 {
    state
        .db
        .list_all_exercises()
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("no seeded exercise {name}"))
        .id
}
