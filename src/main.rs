// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach Hub server
//!
//! Loads configuration, opens and migrates the database, then serves the
//! page router.

use coach_hub::{config::Config, db::Database, render::ShellRenderer, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Coach Hub");

    // Open the database; migrations and the seed catalog run before serving
    let db = Database::open(&config.database_url, config.db_busy_timeout).await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tracing::info!(path = %config.upload_dir.display(), "Avatar upload directory ready");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        renderer: Arc::new(ShellRenderer),
    });

    // Build router
    let app = coach_hub::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("coach_hub=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
