//! Client error taxonomy
//!
//! Every variant owns plain data: one refresh failure is cloned to all
//! callers waiting on it.

use std::time::Duration;

use reach_common::ApiResponse;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// HTTP status associated with the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Timeout(_) => Some(408),
            ClientError::Authentication(_) => Some(401),
            _ => None,
        }
    }

    /// Stable error code for the response envelope
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Timeout(_) => "TIMEOUT",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::Authentication(_) => "AUTHENTICATION_ERROR",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Render the failure as the `{success: false, ...}` envelope shown by UI layers
    pub fn to_response<T>(&self) -> ApiResponse<T> {
        let message = match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let response = ApiResponse::failure(self.code(), Some(message));

        match self {
            ClientError::Api {
                body: Some(body), ..
            } => match body.get("errors") {
                Some(errors) => response.with_errors(errors.clone()),
                None => response,
            },
            _ => response,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}
