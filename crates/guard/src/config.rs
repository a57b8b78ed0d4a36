//! Guard configuration from the environment

use std::env;

use reach_auth::{AuthConfig, TokenVerification};
use reach_common::{Error, Result};

use crate::policy::RoutePolicy;

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub auth: AuthConfig,
    pub policy: RoutePolicy,
}

impl GuardConfig {
    pub fn new(verification: TokenVerification) -> Self {
        Self {
            auth: AuthConfig::new(verification),
            policy: RoutePolicy::default(),
        }
    }

    /// Load from `JWT_SECRET` (or `GUARD_TRUST_ISSUER=true`), plus optional
    /// `JWT_ISSUER` and `JWT_AUDIENCE`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let verification = match non_empty("JWT_SECRET") {
            Some(secret) => TokenVerification::Secret(secret),
            None if non_empty("GUARD_TRUST_ISSUER")
                .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1")) =>
            {
                tracing::warn!(
                    "Route guard decodes tokens WITHOUT signature verification; \
                     downstream services must verify every token"
                );
                TokenVerification::TrustIssuer
            }
            None => {
                return Err(Error::Configuration(
                    "JWT_SECRET is required unless GUARD_TRUST_ISSUER=true".to_string(),
                ))
            }
        };

        let mut config = Self::new(verification);
        config.auth.issuer = non_empty("JWT_ISSUER");
        config.auth.audience = non_empty("JWT_AUDIENCE");
        Ok(config)
    }
}
