//! Authentication configuration

use std::fmt;

/// How far the edge trusts a bearer token before handing it downstream.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenVerification {
    /// Verify the HS256 signature with the shared secret
    Secret(String),
    /// Decode claims without checking the signature. Every downstream
    /// service must verify the token itself.
    TrustIssuer,
}

impl TokenVerification {
    pub fn verifies_signature(&self) -> bool {
        matches!(self, TokenVerification::Secret(_))
    }
}

impl fmt::Debug for TokenVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenVerification::Secret(_) => f.write_str("Secret([REDACTED])"),
            TokenVerification::TrustIssuer => f.write_str("TrustIssuer"),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub verification: TokenVerification,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn new(verification: TokenVerification) -> Self {
        Self {
            verification,
            issuer: None,
            audience: None,
        }
    }
}
