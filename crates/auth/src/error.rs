//! Authentication errors

use thiserror::Error;

/// Failure to turn a bearer token into trusted claims
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Bearer token is malformed")]
    MalformedToken,

    #[error("Bearer token signature is invalid")]
    InvalidSignature,

    #[error("Bearer token issuer or audience does not match")]
    InvalidIssuer,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}
