//! Shared utilities, configuration, and error handling for Reach
//!
//! This crate provides common functionality used across the Reach workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - The `ApiResponse` envelope returned to callers of backend services

pub mod config;
pub mod envelope;
pub mod error;

pub use config::{Service, ServiceEndpoints};
pub use envelope::ApiResponse;
pub use error::{Error, Result};
