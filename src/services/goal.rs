// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calorie goal calculation pipeline.
//!
//! token refresh -> activity fetch -> classification -> BMR/TDEE -> plan ->
//! persist. Strava problems degrade the result to the sedentary tier instead
//! of failing the request.

use crate::db::AccountStore;
use crate::error::AppError;
use crate::models::{
    Account, ActivityRecord, CachedGoal, CalculationResult, GoalRequest, ProviderStatus,
};
use crate::services::activity::{classify, ACTIVITY_WINDOW_DAYS};
use crate::services::energy::{compute_tdee, BodyMetrics};
use crate::services::planner::plan;
use crate::services::StravaService;

/// Computes and stores calorie targets for accounts.
#[derive(Clone)]
pub struct GoalService {
    store: AccountStore,
    strava: StravaService,
}

impl GoalService {
    pub fn new(store: AccountStore, strava: StravaService) -> Self {
        Self { store, strava }
    }

    /// Run a full calculation for the account and cache the result on it.
    pub async fn calculate_goal(
        &self,
        account_id: u64,
        request: &GoalRequest,
    ) -> Result<CalculationResult, AppError> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;

        let latest_weight = self.store.latest_weight(account_id).await?;

        let (activities, provider_status) = self.recent_activities(&account).await;
        let activity = classify(&activities);

        let metrics = BodyMetrics::resolve(
            latest_weight.map(|s| s.weight_kg),
            account.height_cm,
            account.age_years,
        );
        let sex = request.sex.or(account.sex);
        let bmr = metrics.bmr(sex);
        let tdee = compute_tdee(bmr, activity.activity_factor).round() as i32;

        let goal_plan = plan(
            metrics.weight_kg.value,
            account.target_weight_kg,
            tdee,
            request.goal,
        );

        let result = CalculationResult {
            bmr,
            activity_factor: activity.activity_factor,
            activity_level: activity.level,
            avg_active_hours_per_week: activity.avg_hours_per_week_rounded(),
            tdee,
            target_calories: goal_plan.target_calories,
            adjustment: goal_plan.adjustment,
            weight_delta_kg: goal_plan.weight_delta_kg,
            adjustment_reason: goal_plan.adjustment_reason,
            estimated_weeks_to_goal: goal_plan.estimated_weeks_to_goal,
            used_defaults: metrics.used_defaults(),
            provider_status,
        };

        self.store
            .save_goal_result(
                account_id,
                result.target_calories,
                result.estimated_weeks_to_goal,
            )
            .await?;

        tracing::info!(
            account_id,
            goal = ?request.goal,
            bmr = result.bmr,
            tdee = result.tdee,
            target_calories = result.target_calories,
            activity_factor = result.activity_factor,
            provider_status = ?result.provider_status,
            used_defaults = result.used_defaults.any(),
            reason = %result.adjustment_reason,
            "Calorie goal calculated"
        );

        Ok(result)
    }

    /// Last stored result for the account.
    pub async fn cached_goal(&self, account_id: u64) -> Result<CachedGoal, AppError> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;

        Ok(CachedGoal {
            current_target_calories: account.current_target_calories,
            estimated_weeks_to_goal: account.estimated_weeks_to_goal,
        })
    }

    /// Activities from the fetch window, or none with the reason why.
    async fn recent_activities(&self, account: &Account) -> (Vec<ActivityRecord>, ProviderStatus) {
        let Some(access_token) = self.strava.ensure_valid_token(account).await else {
            return (Vec::new(), ProviderStatus::NotConnected);
        };

        match self
            .strava
            .fetch_recent_activities(&access_token, ACTIVITY_WINDOW_DAYS)
            .await
        {
            Ok(activities) => {
                tracing::debug!(
                    account_id = account.id,
                    count = activities.len(),
                    "Fetched recent Strava activities"
                );
                (activities, ProviderStatus::Connected)
            }
            Err(e) if e.is_strava_token_error() => {
                // Access revoked on the Strava side.
                tracing::warn!(
                    account_id = account.id,
                    error = %e,
                    "Strava rejected the access token, using sedentary default"
                );
                (Vec::new(), ProviderStatus::NotConnected)
            }
            Err(e) => {
                tracing::warn!(
                    account_id = account.id,
                    error = %e,
                    "Strava activity fetch failed, using sedentary default"
                );
                (Vec::new(), ProviderStatus::Unavailable)
            }
        }
    }
}
