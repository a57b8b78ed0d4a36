//! Bearer token claims

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Claims carried by a platform bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Platform role of the user
    pub role: Role,
    /// Expires at (unix seconds)
    pub exp: u64,
    /// Whether the user confirmed their email address
    #[serde(default)]
    pub email_verified: bool,
    /// Email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl TokenClaims {
    /// Check expiry against an explicit clock
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.exp <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: u64) -> TokenClaims {
        TokenClaims {
            sub: "user-1".to_string(),
            role: Role::Creator,
            exp,
            email_verified: true,
            email: None,
            iat: None,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let c = claims(1_000);
        assert!(!c.is_expired_at(999));
        assert!(c.is_expired_at(1_000));
        assert!(c.is_expired_at(1_001));
    }

    #[test]
    fn test_missing_email_verified_defaults_to_false() {
        let c: TokenClaims =
            serde_json::from_str(r#"{"sub":"u","role":"brand","exp":10}"#).unwrap();
        assert!(!c.email_verified);
        assert_eq!(c.role, Role::Brand);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result =
            serde_json::from_str::<TokenClaims>(r#"{"sub":"u","role":"superuser","exp":10}"#);
        assert!(result.is_err());
    }
}
