// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie-Goal API Server
//!
//! Derives daily calorie targets from body metrics and Strava activity.

use calorie_goal::{
    config::{Config, StorageBackend},
    db::{AccountStore, FirestoreDb, MemoryDb},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Calorie-Goal API");

    let store = match config.storage {
        StorageBackend::Firestore => {
            AccountStore::Firestore(FirestoreDb::new(&config.gcp_project_id).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory account store, data is lost on restart");
            AccountStore::Memory(MemoryDb::new())
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store)?);
    tracing::info!(
        timeout_secs = config.provider_timeout.as_secs(),
        "Strava service initialized"
    );

    // Build router
    let app = calorie_goal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("calorie_goal=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
