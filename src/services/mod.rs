// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod energy;
pub mod goal;
pub mod planner;
pub mod strava;

pub use activity::{classify, ActivityClassification};
pub use energy::{compute_bmr, compute_tdee, BodyMetrics};
pub use goal::GoalService;
pub use planner::{plan, GoalPlan};
pub use strava::{RefreshLocks, StravaClient, StravaService};
