//! Bearer token handling for Reach
//!
//! Provides the claims carried by platform bearer tokens, the user roles,
//! and claim decoding with an explicit choice of trust boundary.

mod claims;
mod config;
mod error;
mod jwt;
mod roles;

pub use claims::TokenClaims;
pub use config::{AuthConfig, TokenVerification};
pub use error::AuthError;
pub use jwt::{decode_claims, encode_claims};
pub use roles::Role;
