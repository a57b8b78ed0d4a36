//! Typed wrappers over individual backend services

pub mod auth;
pub mod campaigns;
