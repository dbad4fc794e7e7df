// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read once at startup and kept in memory.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// OAuth client credential pair used against the Strava token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Resolves which Strava client credentials to use for an account.
///
/// Some accounts are registered against a separate Strava application; their
/// refresh tokens are only accepted with that application's credentials.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    default: ClientCredentials,
    overrides: HashMap<u64, ClientCredentials>,
}

impl CredentialRegistry {
    pub fn new(default: ClientCredentials) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Register an alternate credential pair for one account.
    pub fn with_override(mut self, account_id: u64, credentials: ClientCredentials) -> Self {
        self.overrides.insert(account_id, credentials);
        self
    }

    /// Credentials for the given account (override if present, else default).
    pub fn for_account(&self, account_id: u64) -> &ClientCredentials {
        self.overrides.get(&account_id).unwrap_or(&self.default)
    }

    pub fn default_credentials(&self) -> &ClientCredentials {
        &self.default
    }
}

/// Which account store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid(
                "STORAGE_BACKEND",
                format!("unknown backend '{}'", other),
            )),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Account store backend
    pub storage: StorageBackend,
    /// Strava REST API base URL
    pub strava_api_url: String,
    /// Strava OAuth token endpoint
    pub strava_token_url: String,
    /// Timeout applied to every Strava request
    pub provider_timeout: Duration,

    // --- Secrets ---
    /// Strava OAuth credentials (default pair plus per-account overrides)
    pub strava_credentials: CredentialRegistry,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Deterministic config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            strava_api_url: DEFAULT_STRAVA_API_URL.to_string(),
            strava_token_url: DEFAULT_STRAVA_TOKEN_URL.to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            strava_credentials: CredentialRegistry::new(ClientCredentials::new(
                "test_client_id",
                "test_secret",
            )),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let default_credentials = ClientCredentials::new(
            env::var("STRAVA_CLIENT_ID").map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
        );

        let mut strava_credentials = CredentialRegistry::new(default_credentials);
        if let Ok(raw) = env::var("STRAVA_CLIENT_OVERRIDES") {
            for (account_id, credentials) in parse_credential_overrides(&raw)? {
                strava_credentials = strava_credentials.with_override(account_id, credentials);
            }
        }

        let provider_timeout_secs = match env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(v) => v.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid("PROVIDER_TIMEOUT_SECS", format!("not a number: {}", v))
            })?,
            Err(_) => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage,
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_API_URL.to_string()),
            strava_token_url: env::var("STRAVA_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_TOKEN_URL.to_string()),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            strava_credentials,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse `STRAVA_CLIENT_OVERRIDES`: `<account_id>=<client_id>:<client_secret>,...`
pub fn parse_credential_overrides(
    raw: &str,
) -> Result<Vec<(u64, ClientCredentials)>, ConfigError> {
    let invalid = |entry: &str| {
        ConfigError::Invalid(
            "STRAVA_CLIENT_OVERRIDES",
            format!("expected <account_id>=<client_id>:<client_secret>, got '{}'", entry),
        )
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, pair) = entry.split_once('=').ok_or_else(|| invalid(entry))?;
            let (client_id, client_secret) = pair.split_once(':').ok_or_else(|| invalid(entry))?;
            let account_id = id.trim().parse::<u64>().map_err(|_| invalid(entry))?;
            if client_id.trim().is_empty() || client_secret.trim().is_empty() {
                return Err(invalid(entry));
            }
            Ok((
                account_id,
                ClientCredentials::new(client_id.trim(), client_secret.trim()),
            ))
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
