//! Edge application end to end: guard decisions in front of a mock renderer

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use common::{mint_token, TestBackend};
use reach_app::{create_app, AppConfig};
use reach_auth::{Role, TokenVerification};
use reach_guard::GuardConfig;
use tower::ServiceExt;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

async fn edge(backend: &TestBackend) -> Router {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("rendered"))
        .mount(&backend.server)
        .await;

    let config = AppConfig {
        port: 0,
        upstream_url: backend.server.uri(),
        guard: GuardConfig::new(TokenVerification::Secret(backend.config.jwt_secret.clone())),
    };
    create_app(config).await.unwrap()
}

async fn visit(app: &Router, path: &str, cookie: Option<String>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_login_page_never_redirects() {
    let backend = TestBackend::start().await;
    let app = edge(&backend).await;
    let secret = backend.config.jwt_secret.clone();

    let cookies = vec![
        None,
        Some("access_token=not-a-jwt".to_string()),
        Some(format!("access_token={}", mint_token(&secret, Role::Creator, -3600, true))),
        Some(format!("access_token={}", mint_token(&secret, Role::Brand, 3600, false))),
        Some(format!("access_token={}", mint_token("other-secret", Role::Admin, 3600, true))),
    ];

    for cookie in cookies {
        let response = visit(&app, "/auth/login", cookie.clone()).await;
        assert_eq!(response.status(), StatusCode::OK, "cookie {:?}", cookie);
        assert_eq!(location(&response), None);
    }
}

#[tokio::test]
async fn test_roles_land_on_their_own_dashboards() {
    let backend = TestBackend::start().await;
    let app = edge(&backend).await;

    let cases = [
        (Role::Creator, "/agency/dashboard", "/dashboard"),
        (Role::Creator, "/brand/campaigns", "/dashboard"),
        (Role::Agency, "/dashboard", "/agency/dashboard"),
        (Role::Brand, "/agency", "/brand/dashboard"),
        (Role::Brand, "/admin/users", "/brand/dashboard"),
    ];

    for (role, path, home) in cases {
        let cookie = format!("access_token={}", backend.mint(role, 3600));
        let response = visit(&app, path, Some(cookie)).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{} on {}", role, path);
        assert_eq!(location(&response), Some(home), "{} on {}", role, path);
    }
}

#[tokio::test]
async fn test_admin_passes_every_restricted_path() {
    let backend = TestBackend::start().await;
    let app = edge(&backend).await;
    let cookie = format!("access_token={}", backend.mint(Role::Admin, 3600));

    for path in ["/dashboard", "/agency/dashboard", "/brand/dashboard", "/admin"] {
        let response = visit(&app, path, Some(cookie.clone())).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
        assert_eq!(response.headers().get("x-user-role").unwrap(), "admin");
    }
}

#[tokio::test]
async fn test_expired_session_with_refresh_cookie_renders_and_asks_for_refresh() {
    let backend = TestBackend::start().await;
    let app = edge(&backend).await;
    let cookie = format!(
        "access_token={}; refresh_token=r-1",
        backend.mint(Role::Creator, -5)
    );

    let response = visit(&app, "/earnings", Some(cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-token-refresh").unwrap(), "true");
}

#[tokio::test]
async fn test_unverified_email_is_sent_to_verification() {
    let backend = TestBackend::start().await;
    let app = edge(&backend).await;
    let cookie = format!(
        "access_token={}",
        mint_token(&backend.config.jwt_secret, Role::Creator, 3600, false)
    );

    let response = visit(&app, "/campaigns", Some(cookie.clone())).await;
    assert_eq!(location(&response), Some("/auth/verify-email"));

    let response = visit(&app, "/auth/verify-email", Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
