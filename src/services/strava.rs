// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client and token lifecycle.
//!
//! Handles:
//! - Token refresh when expired (serialized per account)
//! - Recent activity listing for the activity factor
//! - Timeouts and error classification (429 / 401 / invalid_grant)

use crate::config::{ClientCredentials, CredentialRegistry};
use crate::error::AppError;
use crate::models::ActivityRecord;
use serde::Deserialize;
use std::time::Duration;

/// Strava's page size ceiling for list endpoints.
pub const MAX_PER_PAGE: u32 = 100;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    token_url: String,
}

impl StravaClient {
    /// Create a new Strava client. Every request is bounded by `timeout`.
    pub fn new(api_url: &str, token_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
        })
    }

    /// List activities in `(after, before)` (Unix timestamps), one page.
    pub async fn list_activities(
        &self,
        access_token: &str,
        before: i64,
        after: i64,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let url = format!("{}/athlete/activities", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("before", before.to_string()),
                ("after", after.to_string()),
                ("per_page", per_page.min(MAX_PER_PAGE).to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        self.check_response_json(response).await
    }

    /// Refresh an expired access token with the given client credentials.
    pub async fn refresh_token(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| match request_error(e) {
                AppError::StravaApi(msg) => {
                    AppError::StravaApi(format!("Token refresh request failed: {}", msg))
                }
                other => other,
            })?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                // Keep the body: a rotated refresh token shows up as
                // invalid_grant in it.
                return Err(AppError::StravaApi(format!(
                    "{}: {}",
                    AppError::STRAVA_TOKEN_ERROR,
                    body
                )));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Map a transport-level failure to a Strava error.
fn request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::StravaApi("Request timed out".to_string())
    } else {
        AppError::StravaApi(e.to_string())
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::AccountStore;
use crate::models::{Account, StravaTokens};
use crate::time_utils::{now_epoch_secs, SECONDS_PER_DAY};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared refresh locks type for use in AppState.
pub type RefreshLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// High-level Strava service that manages token lifecycle and API calls.
///
/// Provider failures never escape this service as errors on the token path:
/// a missing or unrefreshable token is reported as `None` so the caller can
/// carry on as "not connected".
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    credentials: CredentialRegistry,
    store: AccountStore,
    /// Per-account mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
}

impl StravaService {
    /// Create a new Strava service.
    ///
    /// `refresh_locks` should be shared by every `StravaService` in the
    /// process so concurrent requests for one account coalesce.
    pub fn new(
        client: StravaClient,
        credentials: CredentialRegistry,
        store: AccountStore,
        refresh_locks: RefreshLocks,
    ) -> Self {
        Self {
            client,
            credentials,
            store,
            refresh_locks,
        }
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a usable access token for the account, refreshing it if expired.
    ///
    /// Returns `None` when the account has no refresh token or the refresh
    /// fails for any reason.
    pub async fn ensure_valid_token(&self, account: &Account) -> Option<String> {
        // Fast path: stored token still valid, no I/O
        if let Some(token) = account.unexpired_access_token(now_epoch_secs()) {
            return Some(token.to_string());
        }

        if account.strava_refresh_token.is_none() {
            tracing::debug!(account_id = account.id, "No Strava refresh token stored");
            return None;
        }

        // Only one refresh per account at a time. The provider rotates the
        // refresh token on every refresh, so a second concurrent refresh
        // with the old token would fail.
        let lock = self
            .refresh_locks
            .entry(account.id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let token = {
            let _guard = lock.lock().await;
            self.refresh_locked(account).await
        };

        // Drop the map entry once no other request holds or waits on it.
        drop(lock);
        self.refresh_locks
            .remove_if(&account.id, |_, lock| Arc::strong_count(lock) == 1);

        token
    }

    /// Refresh path, run with the account's refresh lock held.
    async fn refresh_locked(&self, account: &Account) -> Option<String> {
        // Another request may have refreshed while we were waiting.
        let current = match self.store.get_account(account.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => account.clone(),
            Err(e) => {
                tracing::warn!(
                    account_id = account.id,
                    error = %e,
                    "Failed to re-read account before refresh, using caller's copy"
                );
                account.clone()
            }
        };

        if let Some(token) = current.unexpired_access_token(now_epoch_secs()) {
            tracing::debug!(account_id = account.id, "Token already refreshed by another request");
            return Some(token.to_string());
        }

        let refresh_token = current.strava_refresh_token.as_deref()?;
        self.refresh(account.id, refresh_token).await
    }

    /// Exchange the refresh token and persist the new token set.
    async fn refresh(&self, account_id: u64, refresh_token: &str) -> Option<String> {
        let credentials = self.credentials.for_account(account_id);
        tracing::info!(
            account_id,
            client_id = %credentials.client_id,
            "Access token expired, refreshing"
        );

        let response = match self.client.refresh_token(credentials, refresh_token).await {
            Ok(r) => r,
            Err(e) if e.is_invalid_grant() => {
                // Another process already rotated the refresh token.
                tracing::info!(
                    account_id,
                    "Refresh token race detected, re-reading stored tokens"
                );
                return self.reload_token(account_id).await;
            }
            Err(e) => {
                tracing::warn!(
                    account_id,
                    error = %e,
                    "Strava token refresh failed, continuing without activity data"
                );
                return None;
            }
        };

        let tokens = StravaTokens {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
        };

        if let Err(e) = self.store.set_strava_tokens(account_id, tokens).await {
            // The new access token is still good for this request.
            tracing::error!(account_id, error = %e, "Failed to store refreshed Strava tokens");
        } else {
            tracing::info!(account_id, expires_at = response.expires_at, "Token refreshed");
        }

        Some(response.access_token)
    }

    /// Read back a token another process stored after winning a refresh race.
    async fn reload_token(&self, account_id: u64) -> Option<String> {
        match self.store.get_account(account_id).await {
            Ok(Some(account)) => account
                .unexpired_access_token(now_epoch_secs())
                .map(str::to_string),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(account_id, error = %e, "Failed to re-read Strava tokens");
                None
            }
        }
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Fetch activities from the last `window_days` days (single page).
    pub async fn fetch_recent_activities(
        &self,
        access_token: &str,
        window_days: i64,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        let before = now_epoch_secs();
        let after = before - window_days * SECONDS_PER_DAY;
        self.client
            .list_activities(access_token, before, after, MAX_PER_PAGE)
            .await
    }
}
