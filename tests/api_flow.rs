//! End-to-end tests through the real router, one request at a time.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fintrack::auth::{
    seed_roles, AuthCenter, ProviderIdentity, StaticProviderVerifier, ROLE_BILLING, ROLE_MEMBER,
};
use fintrack::config::AppConfig;
use fintrack::server::router::build_router;
use fintrack::server::state::ServeState;
use fintrack_auth::prelude::{AbilityRule, Action, SubjectMatch};
use fintrack_core_types::prelude::UserProfile;
use fintrack_store::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    auth: Arc<AuthCenter>,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    seed_roles(&store).await.unwrap();

    let config = AppConfig {
        token_secret: Some("e2e-test-secret".to_string()),
        ..AppConfig::default()
    };
    let provider = Arc::new(StaticProviderVerifier::default().with_identity(
        "provider-token-ok",
        ProviderIdentity {
            provider_subject: "google-sub-1".to_string(),
            email: "sso@example.com".to_string(),
            display_name: "Sso User".to_string(),
        },
    ));
    let auth = Arc::new(AuthCenter::new(store.clone(), &config, provider));
    let state = ServeState::new(store.clone(), auth.clone(), false);
    state.health.set_ready(true);

    Harness {
        app: build_router(state),
        store,
        auth,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn user_with_roles(&self, email: &str, roles: &[&str]) -> (UserProfile, String) {
        let profile = self
            .store
            .create_user(NewUser {
                email: email.to_string(),
                display_name: "Test".to_string(),
                password: Some("password1".to_string()),
                provider_subject: None,
                roles: roles.iter().map(|r| r.to_string()).collect(),
            })
            .await
            .unwrap();
        let token = self
            .auth
            .codec
            .issue(&profile.id.0, &profile.email, &profile.display_name)
            .unwrap();
        (profile, token)
    }
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("POST", uri, token, Some(body))
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

fn put(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("PUT", uri, token, Some(body))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

#[tokio::test]
async fn signup_then_login_round_trip() {
    let h = harness().await;

    let (status, body) = h
        .send(post(
            "/api/users",
            None,
            json!({"email": "ada@example.com", "password": "password1", "display_name": "Ada"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");

    let (status, body) = h
        .send(post(
            "/api/session",
            None,
            json!({"email": "ada@example.com", "password": "password1"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = h.send(get_req("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn invalid_signup_reports_every_bad_field() {
    let h = harness().await;
    let (status, body) = h
        .send(post(
            "/api/users",
            None,
            json!({"email": "not-an-email", "password": "short"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
    assert!(errors.contains_key("display_name"));
}

#[tokio::test]
async fn wrong_password_is_unauthenticated() {
    let h = harness().await;
    h.user_with_roles("ada@example.com", &[ROLE_MEMBER]).await;
    let (status, body) = h
        .send(post(
            "/api/session",
            None,
            json!({"email": "ada@example.com", "password": "wrong-password"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn protected_route_without_credential_is_401() {
    let h = harness().await;
    let (status, body) = h.send(get_req("/api/accounts", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn member_cannot_create_coupons_but_billing_can() {
    let h = harness().await;
    let (_, member_token) = h.user_with_roles("member@example.com", &[ROLE_MEMBER]).await;
    let (_, billing_token) = h
        .user_with_roles("billing@example.com", &[ROLE_BILLING])
        .await;

    let coupon = json!({"code": "SAVE10", "discount_percent": 10, "max_redemptions": 100});

    let (status, body) = h
        .send(post("/api/coupons", Some(&member_token), coupon.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert!(h.store.coupon_by_code("SAVE10").await.unwrap().is_none());

    let (status, body) = h
        .send(post("/api/coupons", Some(&billing_token), coupon))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["code"], "SAVE10");
    assert!(h.store.coupon_by_code("SAVE10").await.unwrap().is_some());
}

#[tokio::test]
async fn coupon_redemption_cap_is_a_field_error_at_the_boundary() {
    let h = harness().await;
    let (_, token) = h
        .user_with_roles("billing@example.com", &[ROLE_BILLING])
        .await;

    // Above the storable range: rejected as a validation failure, never a 500.
    let (status, body) = h
        .send(post(
            "/api/coupons",
            Some(&token),
            json!({"code": "HUGE", "discount_percent": 10, "max_redemptions": 5_000_000_000u64}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"].as_object().unwrap().contains_key("max_redemptions"));
    assert!(h.store.coupon_by_code("HUGE").await.unwrap().is_none());

    let (status, body) = h
        .send(post(
            "/api/coupons",
            Some(&token),
            json!({"code": "CAP", "discount_percent": 10, "max_redemptions": u32::MAX}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["max_redemptions"], u32::MAX);
}

#[tokio::test]
async fn user_level_deny_pins_one_instance() {
    let h = harness().await;
    let (profile, token) = h
        .user_with_roles("billing@example.com", &[ROLE_BILLING])
        .await;

    let (_, body) = h
        .send(post(
            "/api/coupons",
            Some(&token),
            json!({"code": "LOCKED", "discount_percent": 5, "max_redemptions": 10}),
        ))
        .await;
    let locked_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = h
        .send(post(
            "/api/coupons",
            Some(&token),
            json!({"code": "OPEN", "discount_percent": 5, "max_redemptions": 10}),
        ))
        .await;
    let open_id = body["data"]["id"].as_str().unwrap().to_string();

    // A later user-level deny overrides the billing role's broad allow for
    // exactly one coupon.
    h.store
        .put_user_grants(
            &profile.id,
            vec![AbilityRule::deny(
                Action::Update,
                SubjectMatch::Instance {
                    subject_type: "Coupon".to_string(),
                    id: locked_id.clone(),
                },
            )],
        )
        .await
        .unwrap();

    let (status, _) = h
        .send(put(
            &format!("/api/coupons/{locked_id}"),
            Some(&token),
            json!({"discount_percent": 50}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .send(put(
            &format!("/api/coupons/{open_id}"),
            Some(&token),
            json!({"discount_percent": 50}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["discount_percent"], 50);
}

#[tokio::test]
async fn ledger_records_are_owner_scoped() {
    let h = harness().await;
    let (_, ada) = h.user_with_roles("ada@example.com", &[ROLE_MEMBER]).await;
    let (_, kim) = h.user_with_roles("kim@example.com", &[ROLE_MEMBER]).await;

    let (status, body) = h
        .send(post(
            "/api/accounts",
            Some(&ada),
            json!({"name": "Main", "kind": "checking", "balance_cents": 1000}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = h
        .send(get_req(&format!("/api/accounts/{account_id}"), Some(&kim)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h
        .send(get_req(&format!("/api/accounts/{account_id}"), Some(&ada)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance_cents"], 1000);
}

#[tokio::test]
async fn entry_flow_with_query_filters() {
    let h = harness().await;
    let (_, token) = h.user_with_roles("ada@example.com", &[ROLE_MEMBER]).await;

    let (_, body) = h
        .send(post(
            "/api/accounts",
            Some(&token),
            json!({"name": "Main", "kind": "checking"}),
        ))
        .await;
    let account = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = h
        .send(post(
            "/api/entries",
            Some(&token),
            json!({
                "account": account,
                "description": "groceries",
                "amount_cents": -4500,
                "kind": "expense",
                "date": "2026-08-01",
                "paid": true,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = h
        .send(post(
            "/api/entries",
            Some(&token),
            json!({
                "account": "no-such-account",
                "description": "ghost",
                "amount_cents": -1,
                "kind": "expense",
                "date": "2026-08-01",
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .send(get_req("/api/entries?paid=true", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = h
        .send(get_req("/api/entries?paid=false", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn provider_sign_in_creates_then_reuses_the_user() {
    let h = harness().await;

    let (status, body) = h
        .send(post(
            "/api/session/google",
            None,
            json!({"id_token": "provider-token-ok"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first_id = body["data"]["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = h
        .send(post(
            "/api/session/google",
            None,
            json!({"id_token": "provider-token-ok"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], first_id.as_str());

    let (status, _) = h
        .send(post(
            "/api/session/google",
            None,
            json!({"id_token": "forged"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let h = harness().await;
    let (status, body) = h.send(get_req("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = h.send(get_req("/readyz", None)).await;
    assert_eq!(status, StatusCode::OK);
}
