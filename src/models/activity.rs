// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity record as returned by the activity list endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary activity from `GET /athlete/activities`.
///
/// Only `moving_time_seconds` and `start_date` feed the activity factor; the
/// other fields are kept for dashboard views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "moving_time")]
    pub moving_time_seconds: i64,
    pub start_date: DateTime<Utc>,
    /// Activity type (Ride, Run, Hike, etc.)
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// Distance in meters
    #[serde(rename = "distance", default)]
    pub distance_meters: Option<f64>,
    #[serde(rename = "average_heartrate", default)]
    pub heart_rate_avg: Option<f64>,
}
