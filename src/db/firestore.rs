// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (body metrics, Strava tokens, cached goal result)
//! - Weight samples (daily weigh-ins)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Account, StravaTokens, WeightSample};
use firestore::paths;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Get an account by ID.
    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(&account_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update an account.
    pub async fn upsert_account(&self, account: &Account) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ACCOUNTS)
            .document_id(account.id.to_string())
            .object(account)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite the three Strava token fields of an existing account.
    ///
    /// Only the token fields are written, so a concurrent result write
    /// cannot be lost and cannot bring back an older refresh token.
    pub async fn set_strava_tokens(
        &self,
        account_id: u64,
        tokens: &StravaTokens,
    ) -> Result<(), AppError> {
        let mut patch = self.existing_account_patch(account_id).await?;
        patch.set_strava_tokens(tokens.clone());

        let _: () = self
            .client
            .fluent()
            .update()
            .fields(paths!(Account::{
                strava_access_token,
                strava_refresh_token,
                strava_token_expires_at
            }))
            .in_col(collections::ACCOUNTS)
            .document_id(account_id.to_string())
            .object(&patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store the latest calculation result; token fields are left untouched.
    pub async fn save_goal_result(
        &self,
        account_id: u64,
        target_calories: i32,
        estimated_weeks_to_goal: Option<f64>,
    ) -> Result<(), AppError> {
        let mut patch = self.existing_account_patch(account_id).await?;
        patch.current_target_calories = Some(target_calories);
        patch.estimated_weeks_to_goal = estimated_weeks_to_goal;

        let _: () = self
            .client
            .fluent()
            .update()
            .fields(paths!(Account::{current_target_calories, estimated_weeks_to_goal}))
            .in_col(collections::ACCOUNTS)
            .document_id(account_id.to_string())
            .object(&patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Empty account used as the source of a field-masked update.
    /// A masked update would create a missing document, so check first.
    async fn existing_account_patch(&self, account_id: u64) -> Result<Account, AppError> {
        if self.get_account(account_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Account {}", account_id)));
        }
        Ok(Account::new(account_id))
    }

    // ─── Weight Operations ───────────────────────────────────────

    /// Store a weight sample.
    pub async fn add_weight_sample(&self, sample: &WeightSample) -> Result<(), AppError> {
        let doc_id = format!(
            "{}_{}",
            sample.account_id,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::WEIGHT_SAMPLES)
            .document_id(doc_id)
            .object(sample)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the most recent weight sample for an account.
    ///
    /// Dates are stored as "YYYY-MM-DD" strings, so descending string order
    /// is descending date order. Same-date ties come back in Firestore's
    /// document order.
    pub async fn latest_weight(&self, account_id: u64) -> Result<Option<WeightSample>, AppError> {
        let samples: Vec<WeightSample> = self
            .client
            .fluent()
            .select()
            .from(collections::WEIGHT_SAMPLES)
            .filter(move |q| q.field("account_id").eq(account_id))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(samples.into_iter().next())
    }
}
