// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod activity;
pub mod goal;
pub mod weight;

pub use account::{Account, Sex, StravaTokens};
pub use activity::ActivityRecord;
pub use goal::{
    ActivityLevel, CachedGoal, CalculationResult, Defaulted, Goal, GoalRequest, ProviderStatus,
    UsedDefaults,
};
pub use weight::WeightSample;
