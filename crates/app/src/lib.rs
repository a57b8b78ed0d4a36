//! Reach edge application composition root
//!
//! Puts the route guard in front of the page renderer: `/health` is served
//! here, everything else is forwarded upstream once the guard lets it pass.

pub mod config;
pub mod proxy;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use reach_guard::{route_guard, RouteGuard};

pub use config::AppConfig;
use proxy::Upstream;

/// Create the main application router with all routes and middleware
pub async fn create_app(config: AppConfig) -> Result<Router, anyhow::Error> {
    if !config.guard.auth.verification.verifies_signature() {
        tracing::warn!("Edge is running in trust-issuer mode");
    }

    let guard = Arc::new(RouteGuard::new(config.guard));
    let upstream = Upstream::new(config.upstream_url)?;

    let app = Router::new()
        .route("/health", get(health_check))
        .fallback(proxy::forward)
        .with_state(upstream)
        .layer(from_fn_with_state(guard, route_guard));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
