//! Database layer (Firestore, with an in-memory backend for tests and local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Account, StravaTokens, WeightSample};

/// Collection names as constants.
pub mod collections {
    pub const ACCOUNTS: &str = "accounts";
    pub const WEIGHT_SAMPLES: &str = "weight_samples";
}

/// Account and weight-sample storage.
///
/// The goal engine reads accounts and weights through this type and writes
/// back refreshed Strava tokens and the latest calculation result.
#[derive(Clone)]
pub enum AccountStore {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl AccountStore {
    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        match self {
            AccountStore::Firestore(db) => db.get_account(account_id).await,
            AccountStore::Memory(db) => Ok(db.get_account(account_id)),
        }
    }

    pub async fn upsert_account(&self, account: &Account) -> Result<(), AppError> {
        match self {
            AccountStore::Firestore(db) => db.upsert_account(account).await,
            AccountStore::Memory(db) => {
                db.upsert_account(account);
                Ok(())
            }
        }
    }

    /// Overwrite all three Strava token fields of an account.
    pub async fn set_strava_tokens(
        &self,
        account_id: u64,
        tokens: StravaTokens,
    ) -> Result<(), AppError> {
        match self {
            AccountStore::Firestore(db) => db.set_strava_tokens(account_id, &tokens).await,
            AccountStore::Memory(db) => {
                db.modify_account(account_id, |account| account.set_strava_tokens(tokens))
            }
        }
    }

    /// Store the latest calculation result on the account (last write wins).
    ///
    /// Only the result fields are written; tokens refreshed by a concurrent
    /// request are kept.
    pub async fn save_goal_result(
        &self,
        account_id: u64,
        target_calories: i32,
        estimated_weeks_to_goal: Option<f64>,
    ) -> Result<(), AppError> {
        match self {
            AccountStore::Firestore(db) => {
                db.save_goal_result(account_id, target_calories, estimated_weeks_to_goal)
                    .await
            }
            AccountStore::Memory(db) => db.modify_account(account_id, |account| {
                account.current_target_calories = Some(target_calories);
                account.estimated_weeks_to_goal = estimated_weeks_to_goal;
            }),
        }
    }

    pub async fn add_weight_sample(&self, sample: &WeightSample) -> Result<(), AppError> {
        match self {
            AccountStore::Firestore(db) => db.add_weight_sample(sample).await,
            AccountStore::Memory(db) => {
                db.add_weight_sample(sample.clone());
                Ok(())
            }
        }
    }

    /// Most recent weight sample for an account.
    pub async fn latest_weight(&self, account_id: u64) -> Result<Option<WeightSample>, AppError> {
        match self {
            AccountStore::Firestore(db) => db.latest_weight(account_id).await,
            AccountStore::Memory(db) => Ok(db.latest_weight(account_id)),
        }
    }
}
