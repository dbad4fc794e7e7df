// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie goal routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{CachedGoal, CalculationResult, GoalRequest};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Goal routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/goal", get(get_goal))
        .route("/api/goal/calculate", post(calculate_goal))
}

/// Recalculate the daily calorie target.
async fn calculate_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<GoalRequest>,
) -> Result<Json<CalculationResult>> {
    tracing::debug!(
        account_id = user.account_id,
        goal = ?request.goal,
        sex = ?request.sex,
        "Calculating calorie goal"
    );

    let result = state
        .goal_service
        .calculate_goal(user.account_id, &request)
        .await?;

    Ok(Json(result))
}

/// Last calculated target, as cached on the account.
async fn get_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CachedGoal>> {
    let cached = state.goal_service.cached_goal(user.account_id).await?;
    Ok(Json(cached))
}
