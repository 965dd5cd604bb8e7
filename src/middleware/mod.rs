// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (sessions, error pages, security headers).

pub mod auth;
pub mod error_pages;
pub mod security;

pub use auth::{require_auth, CurrentUser};
