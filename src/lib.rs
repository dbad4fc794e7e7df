// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Calorie-Goal: daily calorie targets from body metrics and Strava activity
//!
//! This crate provides the backend API that derives a target calorie intake
//! from a user's body metrics, their recent Strava activity volume and their
//! weight goal.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::AccountStore;
use services::GoalService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: AccountStore,
    pub goal_service: GoalService,
}

impl AppState {
    /// Wire the services together on top of an account store.
    pub fn new(config: Config, store: AccountStore) -> Result<Self, error::AppError> {
        let client = services::StravaClient::new(
            &config.strava_api_url,
            &config.strava_token_url,
            config.provider_timeout,
        )?;

        // Shared by every request in this process so refreshes coalesce per account
        let refresh_locks = std::sync::Arc::new(dashmap::DashMap::new());

        let strava_service = services::StravaService::new(
            client,
            config.strava_credentials.clone(),
            store.clone(),
            refresh_locks,
        );
        let goal_service = GoalService::new(store.clone(), strava_service);

        Ok(Self {
            config,
            store,
            goal_service,
        })
    }
}
