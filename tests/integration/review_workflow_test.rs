//! Application review workflow across token expiry

mod common;

use common::TestBackend;
use reach_auth::Role;
use reach_client::{CampaignApi, ClientError, ReviewDecision};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, Request, ResponseTemplate};

/// Review endpoint accepting only `valid` as bearer token
async fn mount_review_endpoint(backend: &TestBackend, valid: String) {
    Mock::given(method("PUT"))
        .and(path_regex(r"^/api/v1/applications/[^/]+/review$"))
        .respond_with(move |request: &Request| {
            let expected = format!("Bearer {}", valid);
            let authorized = request
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some(expected.as_str());

            if !authorized {
                return ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"}));
            }

            let id = request.url.path().split('/').nth(4).unwrap_or_default().to_string();
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": id, "status": body["status"], "review_notes": body["review_notes"]},
                "message": "Application reviewed"
            }))
        })
        .mount(&backend.server)
        .await;
}

#[tokio::test]
async fn test_review_with_valid_token_needs_no_refresh() {
    let backend = TestBackend::start().await;
    let token = backend.mint(Role::Brand, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&backend.server)
        .await;
    mount_review_endpoint(&backend, token.clone()).await;

    let tokens = backend.token_manager();
    tokens.set_token(token);

    let application = CampaignApi::new(tokens)
        .review_application("app-1", &ReviewDecision::approve())
        .await
        .unwrap();

    assert_eq!(application.id, "app-1");
    assert_eq!(application.status, "approved");
}

#[tokio::test]
async fn test_review_with_expired_token_refreshes_transparently() {
    let backend = TestBackend::start().await;
    let expired = backend.mint(Role::Brand, -60);
    let fresh = backend.mint(Role::Brand, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r-brand"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"access_token": fresh, "refresh_token": "r-brand-2"}
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    mount_review_endpoint(&backend, fresh.clone()).await;

    let tokens = backend.token_manager();
    tokens.set_token(expired);
    tokens.set_refresh_token("r-brand");

    let application = CampaignApi::new(tokens.clone())
        .review_application("app-2", &ReviewDecision::reject("Audience mismatch"))
        .await
        .unwrap();

    assert_eq!(application.status, "rejected");
    assert_eq!(application.review_notes.as_deref(), Some("Audience mismatch"));
    assert_eq!(tokens.get_token(), Some(fresh));
    assert_eq!(tokens.refresh_token_value().as_deref(), Some("r-brand-2"));
}

#[tokio::test]
async fn test_concurrent_reviews_share_one_refresh() {
    let backend = TestBackend::start().await;
    let fresh = backend.mint(Role::Brand, 3600);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": fresh}))
                .set_delay(std::time::Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&backend.server)
        .await;
    mount_review_endpoint(&backend, fresh.clone()).await;

    let tokens = backend.token_manager();
    tokens.set_token(backend.mint(Role::Brand, -60));
    tokens.set_refresh_token("r-brand");
    let api = CampaignApi::new(tokens);

    let ids: Vec<String> = (0..5).map(|n| format!("app-{}", n)).collect();
    let decision = ReviewDecision::approve();
    let reviews = ids
        .iter()
        .map(|id| api.review_application(id, &decision));
    let results = futures::future::join_all(reviews).await;

    for (id, result) in ids.iter().zip(results) {
        assert_eq!(&result.unwrap().id, id);
    }
}

#[tokio::test]
async fn test_revoked_refresh_token_ends_session() {
    let backend = TestBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/applications/app-9/review"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&backend.server)
        .await;

    let tokens = backend.token_manager();
    tokens.set_token("stale");
    tokens.set_refresh_token("revoked");
    let mut events = tokens.events().subscribe();

    let err = CampaignApi::new(tokens.clone())
        .review_application("app-9", &ReviewDecision::approve())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)));
    assert_eq!(err.status(), Some(401));
    assert_eq!(events.recv().await.unwrap(), reach_client::AuthEvent::Expired);

    // The cleared session is visible to any later manager over the same store
    assert_eq!(backend.token_manager().get_token(), None);
}
