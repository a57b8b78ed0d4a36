//! Session tokens survive process restarts through the file token store

mod common;

use common::TestBackend;
use reach_auth::Role;
use reach_client::{AuthApi, AuthEvent, Credentials, StorageKey, TokenStore};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_login_persists_across_managers() {
    let backend = TestBackend::start().await;
    let access = backend.mint(Role::Creator, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "access_token": access,
                "refresh_token": "r-creator",
                "user": {"id": "creator-user", "email": "creator@example.com", "role": "creator", "email_verified": true}
            }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile"))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "creator-user", "email": "creator@example.com", "role": "creator"}
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let session = AuthApi::new(backend.token_manager())
        .login(&Credentials::new("creator@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(session.user.unwrap().role, Role::Creator);

    // A new manager over the same file picks the session up
    let restarted = AuthApi::new(backend.token_manager());
    assert_eq!(restarted.tokens().get_token(), Some(access));
    assert_eq!(
        restarted.tokens().refresh_token_value().as_deref(),
        Some("r-creator")
    );

    let profile = restarted.profile().await.unwrap();
    assert_eq!(profile.email, "creator@example.com");
}

#[tokio::test]
async fn test_logout_clears_persisted_session() {
    let backend = TestBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend.server)
        .await;

    let tokens = backend.token_manager();
    tokens.set_token(backend.mint(Role::Agency, 3600));
    tokens.set_refresh_token("r-agency");

    let api = AuthApi::new(tokens);
    let mut events = api.tokens().events().subscribe();
    api.logout().await.unwrap();

    assert_eq!(events.recv().await.unwrap(), AuthEvent::LoggedOut);

    let restarted = backend.token_manager();
    assert_eq!(restarted.get_token(), None);
    assert_eq!(restarted.refresh_token_value(), None);
}

#[tokio::test]
async fn test_legacy_token_file_is_honoured() {
    let backend = TestBackend::start().await;
    let path = backend.token_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"auth_token": "legacy-token"}"#).unwrap();

    let tokens = backend.token_manager();
    assert_eq!(tokens.get_token().as_deref(), Some("legacy-token"));

    tokens.set_token("new-token");
    let store = reach_client::FileTokenStore::new(&path);
    assert_eq!(
        store.get(StorageKey::AccessToken).unwrap().as_deref(),
        Some("new-token")
    );
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("legacy-token"));
}
