//! Axum layer for the route guard
//!
//! ```rust,ignore
//! let guard = Arc::new(RouteGuard::new(GuardConfig::from_env()?));
//! let app = Router::new()
//!     .fallback(render_page)
//!     .layer(axum::middleware::from_fn_with_state(guard, route_guard));
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::cookies::cookie_header;
use crate::decision::{GuardDecision, Identity, RouteGuard};

pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const TOKEN_REFRESH_HEADER: HeaderName = HeaderName::from_static("x-token-refresh");

fn insert_identity(headers: &mut HeaderMap, identity: &Identity) {
    headers.insert(USER_ROLE_HEADER, HeaderValue::from_static(identity.role.as_str()));
    match HeaderValue::from_str(&identity.user_id) {
        Ok(value) => {
            headers.insert(USER_ID_HEADER, value);
        }
        Err(_) => tracing::warn!("User id is not a valid header value; omitting x-user-id"),
    }
}

/// Gate every request on session cookie, email verification and role
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Identity headers are only ever set by this layer
    request.headers_mut().remove(USER_ROLE_HEADER);
    request.headers_mut().remove(USER_ID_HEADER);

    let path = request.uri().path().to_string();
    let cookies = cookie_header(request.headers());

    match guard.evaluate(&path, cookies.as_deref()) {
        GuardDecision::Bypass => next.run(request).await,
        GuardDecision::RefreshRequired => {
            tracing::debug!(path = %path, "Session expired, passing through for refresh");
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(TOKEN_REFRESH_HEADER, HeaderValue::from_static("true"));
            response
        }
        GuardDecision::Allow { identity } => {
            insert_identity(request.headers_mut(), &identity);
            request.extensions_mut().insert(identity.clone());

            let mut response = next.run(request).await;
            insert_identity(response.headers_mut(), &identity);
            response
        }
        GuardDecision::Redirect { location, reason } => {
            tracing::info!(path = %path, location = %location, reason = %reason, "Route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
