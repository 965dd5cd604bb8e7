// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Coach Hub: athlete, exercise and program management for coaches.
//!
//! Server-rendered pages over a single SQLite database. Coaches manage
//! every athlete; other users see only the athlete profile linked to
//! their account.

pub mod authz;
pub mod avatar;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod render;
pub mod routes;

use config::Config;
use db::Database;
use render::Renderer;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub renderer: Arc<dyn Renderer>,
}
