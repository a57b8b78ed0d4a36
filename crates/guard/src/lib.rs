//! Reach edge route guard
//!
//! Runs in front of page rendering. Reads the session from the
//! `access_token` / `refresh_token` cookies and either lets the request
//! through, asks the browser to refresh the session, or redirects:
//! to login when there is no usable session, to email verification when the
//! address is unconfirmed, and to the caller's own dashboard when the path
//! belongs to another role.

pub mod config;
pub mod cookies;
pub mod decision;
pub mod middleware;
pub mod policy;

pub use config::GuardConfig;
pub use decision::{login_redirect, GuardDecision, Identity, RedirectReason, RouteGuard};
pub use middleware::{route_guard, TOKEN_REFRESH_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
pub use policy::{path_matches, RoutePolicy};
