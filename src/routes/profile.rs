// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The signed-in user's own profile and avatar.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::avatar::{generate_filename, parse_filename, sniff_image, AvatarStore, MAX_AVATAR_BYTES};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::render::{page_with_status, redirect_success, Flash};
use crate::routes::support::{validation_message, Form};
use crate::AppState;

/// Request body cap for the upload route. Leaves room for multipart
/// framing so that a file just over the image limit still reaches the
/// handler and gets a 422 instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = MAX_AVATAR_BYTES + 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(show_profile).post(update_profile))
        .route(
            "/profile/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/avatars/{filename}", get(serve_avatar))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    #[serde(default)]
    display_name: String,
}

fn render_profile(
    state: &AppState,
    user: &User,
    status: StatusCode,
    flash: &Flash,
    form: ProfileForm,
) -> Result<Response> {
    page_with_status(
        state,
        status,
        Some(user),
        flash,
        "profile/show",
        json!({
            "form": form,
            "avatar_url": user.avatar_url(),
            "max_avatar_bytes": MAX_AVATAR_BYTES,
        }),
    )
}

fn rejected(message: impl Into<String>) -> Flash {
    Flash {
        error: Some(message.into()),
        ..Flash::default()
    }
}

async fn show_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let form = ProfileForm {
        display_name: user.display_name.clone(),
    };
    render_profile(&state, &user, StatusCode::OK, &flash, form)
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let form = ProfileForm {
        display_name: form.display_name.trim().to_string(),
    };
    if let Err(errors) = form.validate() {
        let flash = rejected(validation_message(&errors));
        return render_profile(&state, &user, StatusCode::UNPROCESSABLE_ENTITY, &flash, form);
    }

    state.db.update_display_name(user.id, &form.display_name).await?;
    Ok(redirect_success("/profile", "Profile updated"))
}

/// Read the `avatar` part of the upload. Other parts are skipped.
async fn read_avatar_field(multipart: &mut Multipart) -> Result<Option<Vec<u8>>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(multipart_error(e)),
        };
        if field.name() != Some("avatar") {
            continue;
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(bytes.to_vec()));
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Unprocessable("Avatar must be at most 5 MiB".to_string())
    } else {
        AppError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}

/// Store a new avatar. The file is checked before anything is written;
/// the previous avatar file is removed once the new name is recorded.
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Response> {
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;
    let form = ProfileForm {
        display_name: user.display_name.clone(),
    };

    let bytes = match read_avatar_field(&mut multipart).await {
        Ok(Some(bytes)) if !bytes.is_empty() => bytes,
        Ok(_) => {
            let flash = rejected("Choose an image to upload");
            return render_profile(&state, &user, unprocessable, &flash, form);
        }
        Err(AppError::Unprocessable(message)) => {
            return render_profile(&state, &user, unprocessable, &rejected(message), form);
        }
        Err(e) => return Err(e),
    };

    if bytes.len() > MAX_AVATAR_BYTES {
        let flash = rejected("Avatar must be at most 5 MiB");
        return render_profile(&state, &user, unprocessable, &flash, form);
    }
    let Some(kind) = sniff_image(&bytes) else {
        tracing::debug!(user_id = user.id, len = bytes.len(), "Rejected non-image avatar");
        let flash = rejected("Avatar must be a JPEG, PNG, GIF or WebP image");
        return render_profile(&state, &user, unprocessable, &flash, form);
    };

    let store = AvatarStore::new(&state.config.upload_dir);
    let filename = generate_filename(kind)?;
    store
        .write(&filename, &bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("writing avatar")))?;

    let previous = match state.db.set_avatar(user.id, &filename).await {
        Ok(previous) => previous,
        Err(e) => {
            if let Err(cleanup) = store.remove(&filename).await {
                tracing::warn!(error = %cleanup, %filename, "Failed to remove orphaned avatar");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous.filter(|old| *old != filename) {
        if let Err(e) = store.remove(&old).await {
            tracing::warn!(error = %e, filename = %old, "Failed to remove previous avatar");
        }
    }

    tracing::info!(user_id = user.id, %filename, "Updated avatar");
    Ok(redirect_success("/profile", "Avatar updated"))
}

/// Serve an avatar by its generated name. Anything that is not a current
/// avatar is a 404.
async fn serve_avatar(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let kind = parse_filename(&filename).ok_or_else(|| AppError::not_found("Avatar"))?;
    if !state.db.avatar_exists(&filename).await? {
        return Err(AppError::not_found("Avatar"));
    }

    let store = AvatarStore::new(&state.config.upload_dir);
    let bytes = match store.read(&filename).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found("Avatar"))
        }
        Err(e) => return Err(AppError::Internal(anyhow::Error::new(e).context("reading avatar"))),
    };

    Ok((
        [
            (header::CONTENT_TYPE, kind.content_type()),
            (header::CACHE_CONTROL, "private, max-age=86400"),
        ],
        bytes,
    )
        .into_response())
}
