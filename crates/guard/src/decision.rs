//! Per-request guard decision
//!
//! Pure function of path, cookies and clock. The axum layer only translates
//! the decision into a redirect or a pass-through.

use std::fmt;

use reach_auth::{decode_claims, AuthConfig, Role, TokenClaims};

use crate::config::GuardConfig;
use crate::cookies::{find_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::policy::{path_matches, RoutePolicy, LOGIN_PATH, VERIFY_EMAIL_PATH};

/// Signed-in caller, handed to downstream handlers through request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub email_verified: bool,
}

impl From<&TokenClaims> for Identity {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            role: claims.role,
            email_verified: claims.email_verified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    MissingToken,
    InvalidToken,
    Expired,
    EmailUnverified,
    WrongRole,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RedirectReason::MissingToken => "missing_token",
            RedirectReason::InvalidToken => "invalid_token",
            RedirectReason::Expired => "expired",
            RedirectReason::EmailUnverified => "email_unverified",
            RedirectReason::WrongRole => "wrong_role",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Public path; the session is not inspected
    Bypass,
    /// Signed-in caller allowed through
    Allow { identity: Identity },
    /// Token expired but a refresh token is present; the page renders and
    /// the browser refreshes the session
    RefreshRequired,
    Redirect {
        location: String,
        reason: RedirectReason,
    },
}

impl GuardDecision {
    fn redirect(location: impl Into<String>, reason: RedirectReason) -> Self {
        GuardDecision::Redirect {
            location: location.into(),
            reason,
        }
    }
}

/// `/auth/login?redirect=<path>`
pub fn login_redirect(path: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(path))
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    auth: AuthConfig,
    policy: RoutePolicy,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            auth: config.auth,
            policy: config.policy,
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn evaluate(&self, path: &str, cookies: Option<&str>) -> GuardDecision {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.evaluate_at(path, cookies, now)
    }

    /// Decide against an explicit clock (unix seconds)
    pub fn evaluate_at(&self, path: &str, cookies: Option<&str>, now: u64) -> GuardDecision {
        if self.policy.is_public(path) {
            return GuardDecision::Bypass;
        }

        let cookie = |name: &str| cookies.and_then(|header| find_cookie(header, name));

        let Some(token) = cookie(ACCESS_TOKEN_COOKIE) else {
            return GuardDecision::redirect(login_redirect(path), RedirectReason::MissingToken);
        };

        let claims = match decode_claims(&token, &self.auth) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, path = %path, "Rejecting session cookie");
                return GuardDecision::redirect(login_redirect(path), RedirectReason::InvalidToken);
            }
        };

        if claims.is_expired_at(now) {
            return if cookie(REFRESH_TOKEN_COOKIE).is_some() {
                GuardDecision::RefreshRequired
            } else {
                GuardDecision::redirect(login_redirect(path), RedirectReason::Expired)
            };
        }

        if !claims.email_verified && !path_matches(path, VERIFY_EMAIL_PATH) {
            return GuardDecision::redirect(VERIFY_EMAIL_PATH, RedirectReason::EmailUnverified);
        }

        if !self.policy.allows(claims.role, path) {
            return GuardDecision::redirect(
                RoutePolicy::home_for(claims.role),
                RedirectReason::WrongRole,
            );
        }

        GuardDecision::Allow {
            identity: Identity::from(&claims),
        }
    }
}
