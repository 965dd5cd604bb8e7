// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Landing page after login.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::authz::can_manage_athlete;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::render::{page, Flash};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(dashboard))
}

/// Managers get catalog counts; linked users go straight to their athlete
/// page; unlinked users see a page telling them to ask a coach.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    if can_manage_athlete(&user) {
        let athletes = state.db.list_athletes(None).await?;
        let exercise_count = state.db.count_exercises().await?;
        let templates = state.db.list_templates().await?;

        return page(
            &state,
            Some(&user),
            &flash,
            "dashboard/coach",
            json!({
                "athlete_count": athletes.len(),
                "exercise_count": exercise_count,
                "template_count": templates.len(),
                "recent_athletes": athletes.iter().take(5).collect::<Vec<_>>(),
            }),
        );
    }

    match user.athlete_id {
        Some(athlete_id) if flash.success.is_none() && flash.error.is_none() => {
            Ok(Redirect::to(&format!("/athletes/{athlete_id}")).into_response())
        }
        linked => page(
            &state,
            Some(&user),
            &flash,
            "dashboard/athlete",
            json!({ "athlete_id": linked }),
        ),
    }
}
