//! Client configuration loaded from environment variables

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reach_common::ServiceEndpoints;

use crate::error::ClientError;
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::storage::{FileTokenStore, MemoryTokenStore, TokenStore};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the token manager and every service client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: ServiceEndpoints,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Credentials file; in-memory storage when unset
    pub token_store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: ServiceEndpoints::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            token_store_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoints: ServiceEndpoints) -> Self {
        Self {
            endpoints,
            ..Self::default()
        }
    }

    /// Load client config from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load client config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = ServiceEndpoints::from_lookup(&lookup)
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let timeout_ms = parse_number(&lookup, "API_TIMEOUT_MS", DEFAULT_TIMEOUT.as_millis() as u64)?;
        let max_retries = parse_number(&lookup, "API_MAX_RETRIES", DEFAULT_MAX_RETRIES as u64)?;
        let base_delay_ms = parse_number(
            &lookup,
            "API_RETRY_BASE_DELAY_MS",
            DEFAULT_BASE_DELAY.as_millis() as u64,
        )?;

        if timeout_ms == 0 {
            return Err(ClientError::Configuration(
                "API_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        let max_retries = u32::try_from(max_retries).map_err(|_| {
            ClientError::Configuration("API_MAX_RETRIES is out of range".to_string())
        })?;

        Ok(Self {
            endpoints,
            timeout: Duration::from_millis(timeout_ms),
            retry: RetryPolicy::new(max_retries, Duration::from_millis(base_delay_ms)),
            token_store_path: lookup("TOKEN_STORE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Open the configured token storage
    pub fn open_token_store(&self) -> Arc<dyn TokenStore> {
        match &self.token_store_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using file token store");
                Arc::new(FileTokenStore::new(path))
            }
            None => Arc::new(MemoryTokenStore::new()),
        }
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            ClientError::Configuration(format!("{} must be a non-negative integer, got {:?}", key, raw))
        }),
        _ => Ok(default),
    }
}
