// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::Utc;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Current time as Unix epoch seconds.
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
