// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal planner: adaptive surplus/deficit and time-to-goal estimate.
//!
//! The size of the calorie adjustment scales with the distance to the
//! target weight. Tiers only apply when the target lies in the direction of
//! the goal; otherwise a flat default is used.

use crate::models::Goal;
use crate::time_utils::round1;

/// Energy content of one kilogram of body fat (kcal).
pub const KCAL_PER_KG: f64 = 7700.0;

const LOSS_DEFAULT_DEFICIT: i32 = -400;
const GAIN_DEFAULT_SURPLUS: i32 = 300;

/// Planner output for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalPlan {
    pub target_calories: i32,
    /// Signed kcal/day applied to TDEE.
    pub adjustment: i32,
    /// Absolute distance to the target weight, 0 without a target.
    pub weight_delta_kg: f64,
    pub adjustment_reason: String,
    pub estimated_weeks_to_goal: Option<f64>,
}

/// Deficit tier by remaining kilograms to lose.
fn loss_tier(delta: f64) -> (i32, &'static str) {
    if delta > 10.0 {
        (-500, "Aggressive deficit")
    } else if delta > 5.0 {
        (-400, "Moderate deficit")
    } else if delta > 2.0 {
        (-300, "Standard deficit")
    } else {
        (-200, "Gentle deficit")
    }
}

/// Surplus tier by remaining kilograms to gain.
fn gain_tier(delta: f64) -> (i32, &'static str) {
    if delta > 10.0 {
        (500, "Aggressive surplus")
    } else if delta > 5.0 {
        (400, "Moderate surplus")
    } else if delta > 2.0 {
        (300, "Standard surplus")
    } else {
        (200, "Lean surplus")
    }
}

/// Choose the calorie adjustment and build the plan.
pub fn plan(current_weight: f64, target_weight: Option<f64>, tdee: i32, goal: Goal) -> GoalPlan {
    let weight_delta = target_weight
        .map(|target| (current_weight - target).abs())
        .unwrap_or(0.0);

    let (adjustment, adjustment_reason) = match (goal, target_weight) {
        (Goal::Maintain, _) => (0, "Maintenance mode".to_string()),
        (Goal::Loss, Some(target)) if current_weight > target => {
            let (adjustment, tier) = loss_tier(weight_delta);
            (adjustment, format!("{}: {:.1} kg to lose", tier, weight_delta))
        }
        (Goal::Loss, _) => (
            LOSS_DEFAULT_DEFICIT,
            "Default deficit (no target weight below current weight)".to_string(),
        ),
        (Goal::Gain, Some(target)) if current_weight < target => {
            let (adjustment, tier) = gain_tier(weight_delta);
            (adjustment, format!("{}: {:.1} kg to gain", tier, weight_delta))
        }
        (Goal::Gain, _) => (
            GAIN_DEFAULT_SURPLUS,
            "Default surplus (no target weight above current weight)".to_string(),
        ),
    };

    let target_calories = tdee + adjustment;

    GoalPlan {
        target_calories,
        adjustment,
        weight_delta_kg: round1(weight_delta),
        adjustment_reason,
        estimated_weeks_to_goal: estimate_weeks(weight_delta, tdee, target_calories),
    }
}

/// Weeks to cover `weight_delta` kg at the daily calorie difference, 1 decimal.
fn estimate_weeks(weight_delta: f64, tdee: i32, target_calories: i32) -> Option<f64> {
    if weight_delta <= 0.0 || target_calories == tdee {
        return None;
    }

    let daily_diff = f64::from((tdee - target_calories).abs());
    let weekly_change_kg = daily_diff * 7.0 / KCAL_PER_KG;
    if (weekly_change_kg * 100.0).round() == 0.0 {
        return None;
    }

    Some(round1(weight_delta / weekly_change_kg))
}
