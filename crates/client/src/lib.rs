//! Reach service client
//!
//! Authenticated access to the Reach backend services:
//! - `TokenManager`: current bearer token, persisted through a `TokenStore`,
//!   with deduplicated refresh
//! - `ApiClient`: per-service HTTP client with timeout, linear backoff retry
//!   of transient failures and one refresh-and-retry on 401
//! - `AuthApi` / `CampaignApi`: typed wrappers over the user and campaign
//!   service endpoints

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod retry;
pub mod services;
pub mod storage;
pub mod tokens;

pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{AuthEvent, AuthEvents};
pub use reach_common::{ApiResponse, Service, ServiceEndpoints};
pub use retry::RetryPolicy;
pub use services::auth::{AuthApi, AuthSession, Credentials, Registration, UserProfile};
pub use services::campaigns::{
    Application, Campaign, CampaignApi, CampaignDraft, CampaignFilters, ReviewDecision,
    ReviewStatus,
};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageKey, TokenStore};
pub use tokens::TokenManager;
