// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent page responses.

use crate::db::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("You do not have access to this page")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Attached to error responses so the page renderer can replace the
/// plain-text body with a rendered one.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub message: String,
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("record not found".to_string()),
            StoreError::DuplicateName
            | StoreError::DuplicateUsername
            | StoreError::AlreadyAtMaxTier => AppError::Unprocessable(err.to_string()),
            StoreError::InUse
            | StoreError::TemplateInUse
            | StoreError::AlreadyActive
            | StoreError::AlreadyAssigned => AppError::Conflict(err.to_string()),
            StoreError::Database(e) => AppError::Database(e.to_string()),
            StoreError::Migrate(e) => AppError::Internal(e.into()),
            StoreError::Seed(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Unauthorized => return Redirect::to("/login").into_response(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "Something went wrong. Please try again.".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorPage { message });
        response
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound, StatusCode::NOT_FOUND),
            (StoreError::DuplicateName, StatusCode::UNPROCESSABLE_ENTITY),
            (StoreError::AlreadyAtMaxTier, StatusCode::UNPROCESSABLE_ENTITY),
            (StoreError::InUse, StatusCode::CONFLICT),
            (StoreError::TemplateInUse, StatusCode::CONFLICT),
            (StoreError::AlreadyActive, StatusCode::CONFLICT),
        ];
        for (store, expected) in cases {
            assert_eq!(AppError::from(store).status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let response = AppError::Database("disk I/O error at page 7".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = response.extensions().get::<ErrorPage>().unwrap();
        assert!(!page.message.contains("disk"));
    }
}
