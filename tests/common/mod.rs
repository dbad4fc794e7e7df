// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use calorie_goal::config::{Config, CredentialRegistry};
use calorie_goal::db::{AccountStore, FirestoreDb, MemoryDb};
use calorie_goal::models::{Account, Sex, StravaTokens, WeightSample};
use calorie_goal::routes::create_router;
use calorie_goal::services::{RefreshLocks, StravaClient, StravaService};
use calorie_goal::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Current Unix time in seconds.
#[allow(dead_code)]
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Test config pointing Strava at a mock server.
#[allow(dead_code)]
pub fn test_config(strava_uri: &str) -> Config {
    let mut config = Config::test_default();
    config.strava_api_url = format!("{}/api/v3", strava_uri);
    config.strava_token_url = format!("{}/oauth/token", strava_uri);
    config.provider_timeout = Duration::from_millis(500);
    config
}

/// Create a Strava service on top of the given store.
#[allow(dead_code)]
pub fn test_strava_service(
    config: &Config,
    credentials: CredentialRegistry,
    store: &AccountStore,
) -> StravaService {
    test_strava_service_with_locks(config, credentials, store, Arc::new(dashmap::DashMap::new()))
}

/// Same as `test_strava_service`, with a refresh-lock map the test can inspect.
#[allow(dead_code)]
pub fn test_strava_service_with_locks(
    config: &Config,
    credentials: CredentialRegistry,
    store: &AccountStore,
    refresh_locks: RefreshLocks,
) -> StravaService {
    let client = StravaClient::new(
        &config.strava_api_url,
        &config.strava_token_url,
        config.provider_timeout,
    )
    .expect("Failed to build Strava client");

    StravaService::new(client, credentials, store.clone(), refresh_locks)
}

/// Empty in-memory store.
#[allow(dead_code)]
pub fn memory_store() -> AccountStore {
    AccountStore::Memory(MemoryDb::new())
}

/// Create a test app backed by the in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>, AccountStore) {
    let store = memory_store();
    let state = Arc::new(AppState::new(config, store.clone()).expect("Failed to build state"));
    (create_router(state.clone()), state, store)
}

/// An account with full body metrics and a Strava token expiring at `expires_at`.
#[allow(dead_code)]
pub fn connected_account(id: u64, expires_at: i64) -> Account {
    let mut account = Account::new(id);
    account.height_cm = Some(180.0);
    account.age_years = Some(30);
    account.sex = Some(Sex::Male);
    account.target_weight_kg = Some(75.0);
    account.set_strava_tokens(StravaTokens {
        access_token: "stored_access".to_string(),
        refresh_token: "stored_refresh".to_string(),
        expires_at,
    });
    account
}

/// Store an account, panicking on failure.
#[allow(dead_code)]
pub async fn put_account(store: &AccountStore, account: &Account) {
    store
        .upsert_account(account)
        .await
        .expect("Failed to store account");
}

/// Read an account back, panicking if it is missing.
#[allow(dead_code)]
pub async fn stored_account(store: &AccountStore, account_id: u64) -> Account {
    store
        .get_account(account_id)
        .await
        .expect("Failed to read account")
        .expect("Account should exist")
}

#[allow(dead_code)]
pub async fn weigh_in(store: &AccountStore, account_id: u64, weight_kg: f64, date: &str) {
    store
        .add_weight_sample(&WeightSample {
            account_id,
            weight_kg,
            date: date.parse().expect("valid date"),
        })
        .await
        .expect("Failed to store weight sample");
}

/// Strava activity JSON with the given moving time.
#[allow(dead_code)]
pub fn activity_json(id: u64, moving_time: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": "Run",
        "moving_time": moving_time,
        "distance": 5000.0,
        "average_heartrate": 145.0,
        "start_date": "2024-01-15T10:30:00Z"
    })
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(account_id: u64, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = now_secs() as usize;
    let claims = Claims {
        sub: account_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}
