// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Account model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Declared sex, used for the BMR offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// User account stored in Firestore.
///
/// The account is owned by the user-account subsystem; the goal engine only
/// reads body metrics and Strava tokens from it and writes back the two
/// cached result fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Account ID (also used as document ID)
    pub id: u64,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub age_years: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,

    // ─── Strava Connection ───────────────────────────────────────
    #[serde(default)]
    pub strava_access_token: Option<String>,
    #[serde(default)]
    pub strava_refresh_token: Option<String>,
    /// Access token expiry (Unix epoch seconds)
    #[serde(default)]
    pub strava_token_expires_at: Option<i64>,

    // ─── Last Calculation ────────────────────────────────────────
    #[serde(default)]
    pub current_target_calories: Option<i32>,
    #[serde(default)]
    pub estimated_weeks_to_goal: Option<f64>,
}

/// A complete set of Strava OAuth tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StravaTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl Account {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Stored access token, if it is present and has not expired at `now`.
    pub fn unexpired_access_token(&self, now: i64) -> Option<&str> {
        match (&self.strava_access_token, self.strava_token_expires_at) {
            (Some(token), Some(expires_at)) if expires_at > now => Some(token.as_str()),
            _ => None,
        }
    }

    /// Overwrite all three token fields at once.
    pub fn set_strava_tokens(&mut self, tokens: StravaTokens) {
        self.strava_access_token = Some(tokens.access_token);
        self.strava_refresh_token = Some(tokens.refresh_token);
        self.strava_token_expires_at = Some(tokens.expires_at);
    }
}
