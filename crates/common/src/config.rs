//! Configuration management following 12-factor app principles
//!
//! Backend service locations are loaded from environment variables once at
//! startup and are read-only afterwards.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Logical backend services the platform talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    User,
    Campaign,
    Analytics,
    Payment,
    Integration,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::User,
        Service::Campaign,
        Service::Analytics,
        Service::Payment,
        Service::Integration,
    ];

    /// Environment variable holding the service base URL
    pub fn env_var(&self) -> &'static str {
        match self {
            Service::User => "USER_SERVICE_URL",
            Service::Campaign => "CAMPAIGN_SERVICE_URL",
            Service::Analytics => "ANALYTICS_SERVICE_URL",
            Service::Payment => "PAYMENT_SERVICE_URL",
            Service::Integration => "INTEGRATION_SERVICE_URL",
        }
    }

    /// Local development default
    pub fn default_url(&self) -> &'static str {
        match self {
            Service::User => "http://localhost:8001",
            Service::Campaign => "http://localhost:8002",
            Service::Analytics => "http://localhost:8003",
            Service::Payment => "http://localhost:8004",
            Service::Integration => "http://localhost:8005",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::User => write!(f, "user"),
            Service::Campaign => write!(f, "campaign"),
            Service::Analytics => write!(f, "analytics"),
            Service::Payment => write!(f, "payment"),
            Service::Integration => write!(f, "integration"),
        }
    }
}

/// Base URL of every backend service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    pub user: String,
    pub campaign: String,
    pub analytics: String,
    pub payment: String,
    pub integration: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            user: Service::User.default_url().to_string(),
            campaign: Service::Campaign.default_url().to_string(),
            analytics: Service::Analytics.default_url().to_string(),
            payment: Service::Payment.default_url().to_string(),
            integration: Service::Integration.default_url().to_string(),
        }
    }
}

impl ServiceEndpoints {
    /// Load endpoints from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load endpoints through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |service: Service| -> Result<String> {
            let raw = lookup(service.env_var())
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| service.default_url().to_string());
            normalize_base_url(service, &raw)
        };

        Ok(Self {
            user: resolve(Service::User)?,
            campaign: resolve(Service::Campaign)?,
            analytics: resolve(Service::Analytics)?,
            payment: resolve(Service::Payment)?,
            integration: resolve(Service::Integration)?,
        })
    }

    /// Base URL for a service, without trailing slash
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::User => &self.user,
            Service::Campaign => &self.campaign,
            Service::Analytics => &self.analytics,
            Service::Payment => &self.payment,
            Service::Integration => &self.integration,
        }
    }

    /// Override one service, mostly useful for pointing a client at a mock server
    pub fn with_service(mut self, service: Service, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        match service {
            Service::User => self.user = url,
            Service::Campaign => self.campaign = url,
            Service::Analytics => self.analytics = url,
            Service::Payment => self.payment = url,
            Service::Integration => self.integration = url,
        }
        self
    }
}

fn normalize_base_url(service: Service, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Configuration(format!(
            "{} must be an http(s) URL, got {:?}",
            service.env_var(),
            trimmed
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
