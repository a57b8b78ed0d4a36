//! Response envelope shared by every backend service call
//!
//! Backends answer `{success, data?, message?, error?, errors?}`. Callers
//! inspect `success` and render `error`/`message` when it is false.

use serde::{Deserialize, Serialize};

/// Tagged result returned to callers of the service clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level validation errors, shape decided by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message,
            error: None,
            errors: None,
        }
    }

    /// Failed response carrying an error description
    pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message,
            error: Some(error.into()),
            errors: None,
        }
    }

    /// Attach field-level errors
    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Consume the envelope, keeping only the payload
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
