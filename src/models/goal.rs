// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Calorie goal request and result types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::Sex;

/// What the user wants their weight to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Goal {
    Loss,
    Maintain,
    Gain,
}

/// Body of `POST /api/goal/calculate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoalRequest {
    pub goal: Goal,
    /// Declared sex; falls back to the account's stored value.
    #[serde(default)]
    pub sex: Option<Sex>,
}

/// Activity tier derived from average weekly moving time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier for this tier.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// State of the Strava integration during a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ProviderStatus {
    /// Activities were fetched.
    Connected,
    /// No usable token (never connected, or refresh not possible).
    NotConnected,
    /// Token was valid but the activity fetch failed or timed out.
    Unavailable,
}

/// A value that may have been substituted by a fallback default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defaulted<T> {
    pub value: T,
    pub was_defaulted: bool,
}

impl<T> Defaulted<T> {
    /// Use `value` if present, otherwise `fallback` (flagged as defaulted).
    pub fn or_default(value: Option<T>, fallback: T) -> Self {
        match value {
            Some(value) => Self {
                value,
                was_defaulted: false,
            },
            None => Self {
                value: fallback,
                was_defaulted: true,
            },
        }
    }
}

/// Which body metrics were filled in with fallback values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsedDefaults {
    pub weight: bool,
    pub height: bool,
    pub age: bool,
}

impl UsedDefaults {
    pub fn any(&self) -> bool {
        self.weight || self.height || self.age
    }
}

/// Output of one goal calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalculationResult {
    pub bmr: i32,
    pub activity_factor: f64,
    pub activity_level: ActivityLevel,
    /// Average weekly moving time over the window (1 decimal)
    pub avg_active_hours_per_week: f64,
    pub tdee: i32,
    pub target_calories: i32,
    /// Signed kcal adjustment applied to TDEE
    pub adjustment: i32,
    /// Distance to target weight (1 decimal), 0 without a target
    pub weight_delta_kg: f64,
    pub adjustment_reason: String,
    pub estimated_weeks_to_goal: Option<f64>,
    pub used_defaults: UsedDefaults,
    pub provider_status: ProviderStatus,
}

/// Last cached result shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CachedGoal {
    pub current_target_calories: Option<i32>,
    pub estimated_weeks_to_goal: Option<f64>,
}
