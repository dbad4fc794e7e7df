// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava token lifecycle tests against a mock token endpoint.

use calorie_goal::config::{ClientCredentials, CredentialRegistry};
use calorie_goal::db::{AccountStore, MemoryDb};
use calorie_goal::models::{Account, StravaTokens};
use calorie_goal::services::classify;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

mod common;
use common::{
    connected_account, memory_store, now_secs, put_account, stored_account, test_config,
    test_strava_service, test_strava_service_with_locks,
};

fn default_credentials() -> CredentialRegistry {
    CredentialRegistry::new(ClientCredentials::new("main_client", "main_secret"))
}

fn refresh_response(expires_at: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "token_type": "Bearer",
        "access_token": "new_access",
        "refresh_token": "new_refresh",
        "expires_at": expires_at,
        "expires_in": 21600
    }))
}

#[tokio::test]
async fn test_valid_token_returned_without_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600))
        .expect(0)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(1, now_secs() + 3600);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let token = strava.ensure_valid_token(&account).await;
    assert_eq!(token.as_deref(), Some("stored_access"));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_stored() {
    let server = MockServer::start().await;
    let new_expiry = now_secs() + 21600;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=stored_refresh"))
        .and(body_string_contains("client_id=main_client"))
        .and(body_string_contains("client_secret=main_secret"))
        .respond_with(refresh_response(new_expiry))
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(1, now_secs() - 1);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let token = strava.ensure_valid_token(&account).await;
    assert_eq!(token.as_deref(), Some("new_access"));

    let stored = stored_account(&db, 1).await;
    assert_eq!(stored.strava_access_token.as_deref(), Some("new_access"));
    assert_eq!(stored.strava_refresh_token.as_deref(), Some("new_refresh"));
    assert_eq!(stored.strava_token_expires_at, Some(new_expiry));
    assert!(stored.strava_token_expires_at.unwrap() > now_secs());
}

#[tokio::test]
async fn test_refresh_rejected_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Authorization Error"))
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(1, now_secs() - 1);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let token = strava.ensure_valid_token(&account).await;
    assert!(token.is_none());

    // Calculation carries on with the sedentary tier
    assert_eq!(classify(&[]).activity_factor, 1.2);

    // Old tokens are left alone
    let stored = stored_account(&db, 1).await;
    assert_eq!(stored.strava_refresh_token.as_deref(), Some("stored_refresh"));
}

#[tokio::test]
async fn test_no_refresh_token_means_not_connected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600))
        .expect(0)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = Account::new(1);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    assert!(strava.ensure_valid_token(&account).await.is_none());
}

#[tokio::test]
async fn test_missing_expiry_forces_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600))
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let mut account = connected_account(1, 0);
    account.strava_token_expires_at = None;
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let token = strava.ensure_valid_token(&account).await;
    assert_eq!(token.as_deref(), Some("new_access"));
}

#[tokio::test]
async fn test_per_account_credentials_used_for_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("client_id=alt_client"))
        .and(body_string_contains("client_secret=alt_secret"))
        .respond_with(refresh_response(now_secs() + 21600))
        .expect(1)
        .mount(&server)
        .await;

    let credentials =
        default_credentials().with_override(42, ClientCredentials::new("alt_client", "alt_secret"));

    let db = memory_store();
    let account = connected_account(42, now_secs() - 10);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), credentials, &db);

    let token = strava.ensure_valid_token(&account).await;
    assert_eq!(token.as_deref(), Some("new_access"));
}

#[tokio::test]
async fn test_concurrent_refreshes_for_one_account_coalesce() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(7, now_secs() - 1);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let (first, second) = tokio::join!(
        strava.ensure_valid_token(&account),
        strava.ensure_valid_token(&account)
    );

    assert_eq!(first.as_deref(), Some("new_access"));
    assert_eq!(second.as_deref(), Some("new_access"));
}

#[tokio::test]
async fn test_refresh_timeout_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(1, now_secs() - 1);
    put_account(&db, &account).await;
    let mut config = test_config(&server.uri());
    config.provider_timeout = Duration::from_millis(200);
    let strava = test_strava_service(&config, default_credentials(), &db);

    assert!(strava.ensure_valid_token(&account).await.is_none());
}

#[tokio::test]
async fn test_invalid_grant_without_newer_tokens_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(1, now_secs() - 1);
    put_account(&db, &account).await;
    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    assert!(strava.ensure_valid_token(&account).await.is_none());
}

/// Token endpoint that loses a refresh race: by the time it answers, another
/// process has already stored rotated tokens for the account.
struct RotatedElsewhere {
    db: MemoryDb,
    account_id: u64,
    expires_at: i64,
}

impl Respond for RotatedElsewhere {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let mut account = self.db.get_account(self.account_id).expect("account stored");
        account.set_strava_tokens(StravaTokens {
            access_token: "other_access".to_string(),
            refresh_token: "other_refresh".to_string(),
            expires_at: self.expires_at,
        });
        self.db.upsert_account(&account);

        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Bad Request",
            "errors": [{"resource": "RefreshToken", "field": "refresh_token", "code": "invalid"}],
            "error": "invalid_grant"
        }))
    }
}

#[tokio::test]
async fn test_unauthorized_invalid_grant_reuses_tokens_stored_by_winner() {
    let server = MockServer::start().await;
    let memory = MemoryDb::new();
    let db = AccountStore::Memory(memory.clone());
    let account = connected_account(1, now_secs() - 1);
    put_account(&db, &account).await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(RotatedElsewhere {
            db: memory,
            account_id: 1,
            expires_at: now_secs() + 21600,
        })
        .expect(1)
        .mount(&server)
        .await;

    let strava = test_strava_service(&test_config(&server.uri()), default_credentials(), &db);

    let token = strava.ensure_valid_token(&account).await;
    assert_eq!(token.as_deref(), Some("other_access"));

    // The winner's rotated refresh token is kept
    let stored = stored_account(&db, 1).await;
    assert_eq!(stored.strava_refresh_token.as_deref(), Some("other_refresh"));
}

#[tokio::test]
async fn test_refresh_locks_are_released_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(refresh_response(now_secs() + 21600).set_delay(Duration::from_millis(50)))
        .expect(1)
        .mount(&server)
        .await;

    let db = memory_store();
    let account = connected_account(3, now_secs() - 1);
    put_account(&db, &account).await;

    let locks = Arc::new(dashmap::DashMap::new());
    let strava = test_strava_service_with_locks(
        &test_config(&server.uri()),
        default_credentials(),
        &db,
        locks.clone(),
    );

    let (first, second) = tokio::join!(
        strava.ensure_valid_token(&account),
        strava.ensure_valid_token(&account)
    );
    assert_eq!(first.as_deref(), Some("new_access"));
    assert_eq!(second.as_deref(), Some("new_access"));

    assert!(locks.is_empty(), "lock entry should be removed once unused");
}
