// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process account store.

use crate::error::AppError;
use crate::models::weight::latest_sample;
use crate::models::{Account, WeightSample};
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory database, cheap to clone (shared maps).
#[derive(Clone, Default)]
pub struct MemoryDb {
    accounts: Arc<DashMap<u64, Account>>,
    /// Weight samples per account, in insertion order.
    weights: Arc<DashMap<u64, Vec<WeightSample>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_account(&self, account_id: u64) -> Option<Account> {
        self.accounts.get(&account_id).map(|a| a.value().clone())
    }

    pub fn upsert_account(&self, account: &Account) {
        self.accounts.insert(account.id, account.clone());
    }

    pub fn modify_account<F>(&self, account_id: u64, f: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Account),
    {
        let mut account = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| AppError::NotFound(format!("Account {}", account_id)))?;
        f(account.value_mut());
        Ok(())
    }

    pub fn add_weight_sample(&self, sample: WeightSample) {
        self.weights.entry(sample.account_id).or_default().push(sample);
    }

    pub fn latest_weight(&self, account_id: u64) -> Option<WeightSample> {
        let samples = self.weights.get(&account_id)?;
        let latest = latest_sample(samples.iter()).cloned();
        latest
    }
}
