//! Bearer token ownership and refresh
//!
//! `TokenManager` is an explicitly constructed handle: clones share one
//! token cache, one storage backend and one in-flight refresh slot. While a
//! refresh is outstanding every caller awaits the same shared future, so N
//! concurrent 401s produce exactly one call to the refresh endpoint.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use reach_common::Service;
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::AuthEvents;
use crate::services::auth::REFRESH_PATH;
use crate::storage::{StorageKey, TokenStore};

type RefreshFuture = Shared<BoxFuture<'static, Result<String, ClientError>>>;

enum CachedToken {
    Unloaded,
    Loaded(Option<String>),
}

/// Tokens minted by a login, signup or refresh response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl IssuedTokens {
    /// Find tokens in a response body.
    ///
    /// Accepts `access_token` or `token`, either inside a `data` envelope or
    /// at the top level.
    pub fn from_body(body: &Value) -> Option<Self> {
        let scope = match body.get("data") {
            Some(data) if data.is_object() => data,
            _ => body,
        };

        let access_token = ["access_token", "token"]
            .iter()
            .find_map(|key| scope.get(*key).and_then(Value::as_str))
            .filter(|t| !t.is_empty())?
            .to_string();

        let refresh_token = scope
            .get("refresh_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Some(Self {
            access_token,
            refresh_token,
        })
    }
}

struct Inner {
    store: Arc<dyn TokenStore>,
    cache: RwLock<CachedToken>,
    inflight: Mutex<Option<RefreshFuture>>,
    http: reqwest::Client,
    config: ClientConfig,
    events: AuthEvents,
}

/// Single source of truth for the current bearer token
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a token manager over the given storage
    pub fn new(store: Arc<dyn TokenStore>, config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                cache: RwLock::new(CachedToken::Unloaded),
                inflight: Mutex::new(None),
                http,
                config,
                events: AuthEvents::new(),
            }),
        })
    }

    /// Create a token manager over the storage named by the config
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let store = config.open_token_store();
        Self::new(store, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn events(&self) -> &AuthEvents {
        &self.inner.events
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Current bearer token, loaded from storage on first access
    pub fn get_token(&self) -> Option<String> {
        {
            let cache = self.inner.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let CachedToken::Loaded(token) = &*cache {
                return token.clone();
            }
        }

        let loaded = self.inner.load(StorageKey::AccessToken);

        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        match &*cache {
            CachedToken::Loaded(token) => token.clone(),
            CachedToken::Unloaded => {
                *cache = CachedToken::Loaded(loaded.clone());
                loaded
            }
        }
    }

    /// Replace the bearer token in cache and storage
    pub fn set_token(&self, token: impl Into<String>) {
        self.inner.store_access_token(token.into());
    }

    /// Drop both tokens from cache and storage
    pub fn clear_token(&self) {
        {
            let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
            *cache = CachedToken::Loaded(None);
        }
        self.inner.remove(StorageKey::AccessToken);
        self.inner.remove(StorageKey::RefreshToken);
        tracing::debug!("Tokens cleared");
    }

    /// Stored refresh token, if any
    pub fn refresh_token_value(&self) -> Option<String> {
        self.inner.load(StorageKey::RefreshToken)
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        self.inner.save(StorageKey::RefreshToken, &token.into());
    }

    /// Store every token of a login/signup/refresh response
    pub fn store_issued(&self, tokens: &IssuedTokens) {
        self.inner.store_issued(tokens);
    }

    /// Mint a new bearer token from the stored refresh token.
    ///
    /// Concurrent callers share one request and observe the same outcome.
    pub async fn refresh_token(&self) -> Result<String, ClientError> {
        let refresh = {
            let mut slot = self.inner.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let pending = async move {
                        let result = inner.perform_refresh().await;
                        inner
                            .inflight
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        refresh.await
    }
}

impl Inner {
    fn load(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to read token storage");
                None
            }
        }
    }

    fn save(&self, key: StorageKey, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(error = %e, key = %key, "Failed to persist token");
        }
    }

    fn remove(&self, key: StorageKey) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(error = %e, key = %key, "Failed to remove token from storage");
        }
    }

    fn store_access_token(&self, token: String) {
        self.save(StorageKey::AccessToken, &token);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = CachedToken::Loaded(Some(token));
    }

    fn store_issued(&self, tokens: &IssuedTokens) {
        self.store_access_token(tokens.access_token.clone());
        if let Some(refresh) = &tokens.refresh_token {
            self.save(StorageKey::RefreshToken, refresh);
        }
    }

    async fn perform_refresh(&self) -> Result<String, ClientError> {
        let refresh_token = self.load(StorageKey::RefreshToken).ok_or_else(|| {
            ClientError::Authentication("No refresh token available".to_string())
        })?;

        let url = format!(
            "{}{}",
            self.config.endpoints.base_url(Service::User),
            REFRESH_PATH
        );

        tracing::debug!("Refreshing bearer token");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| ClientError::Authentication(format!("Token refresh failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Token refresh rejected");
            return Err(ClientError::Authentication(format!(
                "Token refresh rejected with status {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            ClientError::Authentication(format!("Invalid token refresh response: {}", e))
        })?;

        let tokens = IssuedTokens::from_body(&body).ok_or_else(|| {
            ClientError::Authentication("Token refresh response did not contain a token".to_string())
        })?;

        self.store_issued(&tokens);
        tracing::info!(rotated = tokens.refresh_token.is_some(), "Bearer token refreshed");

        Ok(tokens.access_token)
    }
}
