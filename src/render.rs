// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page rendering.
//!
//! Handlers never build HTML themselves: they hand a template name and a
//! serializable page context to the [`Renderer`] held in `AppState`. The
//! shipped [`ShellRenderer`] emits a minimal HTML document that carries the
//! context as JSON; tests swap in a renderer that returns the JSON alone.

use crate::error::{AppError, Result};
use crate::models::User;
use crate::AppState;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

/// Renders named page templates.
pub trait Renderer: Send + Sync {
    /// Render template `name` with the page context `page`.
    fn render(&self, name: &str, page: &serde_json::Value) -> std::result::Result<String, RenderError>;

    /// Body for a 403 response.
    fn forbidden(&self) -> String;

    /// Small HTML fragment describing an error.
    fn error_fragment(&self, message: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot serialize page data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Flash messages carried across a redirect in the query string.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
struct PageContext<'a, T: Serialize> {
    user: Option<&'a User>,
    flash: &'a Flash,
    data: T,
}

/// Render a page with status 200.
pub fn page<T: Serialize>(
    state: &AppState,
    user: Option<&User>,
    flash: &Flash,
    name: &str,
    data: T,
) -> Result<Response> {
    page_with_status(state, StatusCode::OK, user, flash, name, data)
}

/// Render a page with an explicit status, e.g. 422 when re-showing a form.
pub fn page_with_status<T: Serialize>(
    state: &AppState,
    status: StatusCode,
    user: Option<&User>,
    flash: &Flash,
    name: &str,
    data: T,
) -> Result<Response> {
    let context = serde_json::to_value(PageContext { user, flash, data })
        .map_err(|e| AppError::Internal(e.into()))?;
    let body = state
        .renderer
        .render(name, &context)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok((status, Html(body)).into_response())
}

/// 303 redirect to `path` with a `success` message.
pub fn redirect_success(path: &str, message: &str) -> Response {
    redirect_with(path, "success", message)
}

/// 303 redirect to `path` with an `error` message.
pub fn redirect_error(path: &str, message: &str) -> Response {
    redirect_with(path, "error", message)
}

fn redirect_with(path: &str, key: &str, message: &str) -> Response {
    let sep = if path.contains('?') { '&' } else { '?' };
    let target = format!("{path}{sep}{key}={}", urlencoding::encode(message));
    Redirect::to(&target).into_response()
}

/// HTML document with the page context embedded as JSON.
#[derive(Debug, Default, Clone)]
pub struct ShellRenderer;

impl Renderer for ShellRenderer {
    fn render(&self, name: &str, page: &serde_json::Value) -> std::result::Result<String, RenderError> {
        let pretty = serde_json::to_string_pretty(page)?;
        // `</` inside a script element would end it early.
        let embedded = serde_json::to_string(page)?.replace("</", "<\\/");

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} · Coach Hub</title></head>\n\
             <body>\n<main data-template=\"{title}\"><pre>{body}</pre></main>\n\
             <script type=\"application/json\" id=\"page-data\">{embedded}</script>\n</body>\n</html>\n",
            title = html_escape::encode_double_quoted_attribute(name),
            body = html_escape::encode_text(&pretty),
        ))
    }

    fn forbidden(&self) -> String {
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Forbidden · Coach Hub</title></head>\n\
         <body><main><h1>Forbidden</h1><p>You do not have access to this page.</p></main></body>\n</html>\n"
            .to_string()
    }

    fn error_fragment(&self, message: &str) -> String {
        format!(
            "<div class=\"error\" role=\"alert\">{}</div>",
            html_escape::encode_text(message)
        )
    }
}
