// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregation: weekly moving time and activity-factor tier.

use crate::models::{ActivityLevel, ActivityRecord};
use crate::time_utils::round1;

/// How far back activities are fetched.
pub const ACTIVITY_WINDOW_DAYS: i64 = 28;

/// The window always counts as four weeks, however much of it the returned
/// activities actually cover. The tier thresholds are calibrated to this.
const WINDOW_WEEKS: f64 = 4.0;

/// Result of classifying a set of activities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityClassification {
    pub level: ActivityLevel,
    pub activity_factor: f64,
    /// Unrounded average weekly moving time in hours.
    pub avg_hours_per_week: f64,
}

impl ActivityClassification {
    /// Classification used when no activity data is available.
    pub fn sedentary() -> Self {
        Self {
            level: ActivityLevel::Sedentary,
            activity_factor: ActivityLevel::Sedentary.factor(),
            avg_hours_per_week: 0.0,
        }
    }

    /// Weekly hours rounded to one decimal for display.
    pub fn avg_hours_per_week_rounded(&self) -> f64 {
        round1(self.avg_hours_per_week)
    }
}

/// Map average weekly hours to a tier. Thresholds are exclusive upper bounds.
pub fn level_for_weekly_hours(hours: f64) -> ActivityLevel {
    if hours < 1.0 {
        ActivityLevel::Sedentary
    } else if hours < 3.0 {
        ActivityLevel::Light
    } else if hours < 6.0 {
        ActivityLevel::Moderate
    } else if hours < 10.0 {
        ActivityLevel::Active
    } else {
        ActivityLevel::VeryActive
    }
}

/// Reduce activities to an average weekly figure and an activity factor.
pub fn classify(activities: &[ActivityRecord]) -> ActivityClassification {
    if activities.is_empty() {
        return ActivityClassification::sedentary();
    }

    let total_seconds: i64 = activities
        .iter()
        .map(|a| a.moving_time_seconds.max(0))
        .sum();
    let total_hours = total_seconds as f64 / 3600.0;
    let avg_hours_per_week = total_hours / WINDOW_WEEKS;
    let level = level_for_weekly_hours(avg_hours_per_week);

    ActivityClassification {
        level,
        activity_factor: level.factor(),
        avg_hours_per_week,
    }
}
