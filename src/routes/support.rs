// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Small helpers shared by the page handlers.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::ValidationErrors;

use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::models::Athlete;
use crate::AppState;

/// `axum::Form`, but a body that does not deserialize is a 400 error page
/// instead of axum's plain-text 422.
pub(crate) struct Form<T>(pub T);

impl<T, S> FromRequest<S> for Form<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        match axum::Form::<T>::from_request(req, state).await {
            Ok(axum::Form(value)) => Ok(Form(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected form body");
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}

/// Fetch the athlete named in the path; a missing one is a 404 for everyone.
pub(crate) async fn fetch_athlete(state: &AppState, id: i64) -> Result<Athlete> {
    match state.db.get_athlete(id).await {
        Ok(athlete) => Ok(athlete),
        Err(StoreError::NotFound) => Err(AppError::not_found("Athlete")),
        Err(e) => Err(e.into()),
    }
}

/// Turn a failed predicate into a 403.
pub(crate) fn ensure(allowed: bool) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Map `NotFound` to a 404 naming `what`; other errors convert as usual.
pub(crate) fn or_not_found(what: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err {
        StoreError::NotFound => AppError::not_found(what),
        other => other.into(),
    }
}

/// One line per invalid field, sorted by field name.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {reason}")
        })
        .collect();
    lines.sort();
    lines.join("; ")
}

/// Parse an optional integer form field; blank means absent.
pub(crate) fn parse_optional_i64(raw: &str, field: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{field} must be a whole number")))
}

/// Parse an optional decimal form field; blank means absent.
pub(crate) fn parse_optional_f64(raw: &str, field: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(AppError::BadRequest(format!("{field} must be a number"))),
    }
}

/// Parse a `YYYY-MM-DD` form field, defaulting to today when blank.
pub(crate) fn parse_date_or_today(raw: &str) -> Result<chrono::NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(chrono::Utc::now().date_naive());
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{trimmed}'")))
}

/// HTML checkboxes are present when ticked and absent otherwise.
pub(crate) fn checkbox(raw: &Option<String>) -> bool {
    matches!(raw.as_deref(), Some("on" | "true" | "1"))
}
