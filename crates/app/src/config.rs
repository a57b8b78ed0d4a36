//! Edge application configuration

use std::env;

use reach_common::{Error, Result};
use reach_guard::GuardConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Page renderer every guarded request is forwarded to
    pub upstream_url: String,
    pub guard: GuardConfig,
}

impl AppConfig {
    /// Load from `PORT`, `FRONTEND_UPSTREAM_URL` and the guard variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Configuration(format!("PORT must be a port number, got {:?}", raw)))?,
            None => DEFAULT_PORT,
        };

        let upstream_url = lookup("FRONTEND_UPSTREAM_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let upstream_url = upstream_url.trim().trim_end_matches('/').to_string();
        if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "FRONTEND_UPSTREAM_URL must be an http(s) URL, got {:?}",
                upstream_url
            )));
        }

        Ok(Self {
            port,
            upstream_url,
            guard: GuardConfig::from_lookup(&lookup)?,
        })
    }
}
