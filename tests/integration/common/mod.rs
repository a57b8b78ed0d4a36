//! Common test utilities and fixtures for integration tests
//!
//! - One wiremock server standing in for every backend service
//! - Token managers over a temp-file token store
//! - Signed bearer token fixtures

#![allow(dead_code)]

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Once};

use reach_auth::{encode_claims, Role, TokenClaims};
use reach_client::{
    ClientConfig, FileTokenStore, RetryPolicy, Service, ServiceEndpoints, TokenManager,
};
use tempfile::TempDir;
use wiremock::MockServer;

static INIT: Once = Once::new();

/// Test environment configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub jwt_secret: String,
}

impl TestConfig {
    pub fn from_env() -> Self {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
        });

        Self {
            jwt_secret: env::var("TEST_JWT_SECRET")
                .unwrap_or_else(|_| "test_secret_key_for_testing_only".to_string()),
        }
    }
}

/// Mock backend plus a scratch directory for persisted tokens
pub struct TestBackend {
    pub server: MockServer,
    pub config: TestConfig,
    dir: TempDir,
}

impl TestBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            config: TestConfig::from_env(),
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.path().join("session").join("tokens.json")
    }

    pub fn client_config(&self) -> ClientConfig {
        let endpoints = Service::ALL
            .iter()
            .fold(ServiceEndpoints::default(), |endpoints, service| {
                endpoints.with_service(*service, self.server.uri())
            });

        ClientConfig::new(endpoints).with_retry(RetryPolicy::none())
    }

    /// Fresh manager over the shared token file
    pub fn token_manager(&self) -> TokenManager {
        TokenManager::new(
            Arc::new(FileTokenStore::new(self.token_path())),
            self.client_config(),
        )
        .expect("build token manager")
    }

    pub fn mint(&self, role: Role, expires_in: i64) -> String {
        mint_token(&self.config.jwt_secret, role, expires_in, true)
    }
}

pub fn mint_token(secret: &str, role: Role, expires_in: i64, email_verified: bool) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        sub: format!("{}-user", role),
        role,
        exp: (now + expires_in).max(0) as u64,
        email_verified,
        email: Some(format!("{}@example.com", role)),
        iat: Some(now as u64),
    };
    encode_claims(&claims, secret).expect("sign fixture token")
}
