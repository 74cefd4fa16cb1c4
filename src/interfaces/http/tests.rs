//! End-to-end router scenarios over the in-memory stores

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{create_api_router, AppServices, RouterOptions};
use crate::application::api_keys::{ApiKeyService, KeyGenerator};
use crate::application::auth::ResolverChain;
use crate::domain::{
    ApiKey, ApiKeyRepositoryInterface, CreateUserDto, NewApiKey, User, UserRepositoryInterface,
    UserRole,
};
use crate::infrastructure::crypto::{create_session_token, SessionTokenConfig};
use crate::infrastructure::session::{JwtCookieSessionProvider, DEFAULT_COOKIE_NAME};
use crate::infrastructure::storage::{InMemoryApiKeyRepository, InMemoryUserRepository};

struct TestApp {
    router: Router,
    keys: Arc<InMemoryApiKeyRepository>,
    users: Arc<InMemoryUserRepository>,
    u1: User,
    u2: User,
}

fn session_config() -> SessionTokenConfig {
    SessionTokenConfig {
        secret: "router-test-secret".into(),
        issuer: "apikey-service".into(),
    }
}

async fn create_user(users: &InMemoryUserRepository, email: &str) -> User {
    users
        .create_user(CreateUserDto {
            email: email.into(),
            name: email.split('@').next().unwrap_or_default().into(),
            image: None,
            email_verified: true,
            role: None,
        })
        .await
        .unwrap()
}

async fn app_with(generator: Option<KeyGenerator>) -> TestApp {
    let keys = Arc::new(InMemoryApiKeyRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let u1 = create_user(&users, "u1@example.com").await;
    let u2 = create_user(&users, "u2@example.com").await;

    let sessions = Arc::new(JwtCookieSessionProvider::new(
        users.clone(),
        session_config(),
        DEFAULT_COOKIE_NAME,
    ));
    let service = match generator {
        Some(generator) => ApiKeyService::with_generator(keys.clone(), generator),
        None => ApiKeyService::new(keys.clone()),
    };

    let services = AppServices {
        api_keys: Arc::new(service),
        resolver: Arc::new(ResolverChain::standard(
            sessions.clone(),
            keys.clone(),
            users.clone(),
        )),
        sessions,
        db: None,
    };

    TestApp {
        router: create_api_router(services, RouterOptions::default()),
        keys,
        users,
        u1,
        u2,
    }
}

async fn app() -> TestApp {
    app_with(None).await
}

impl TestApp {
    async fn key_for(&self, user: &User, value: &str) -> ApiKey {
        self.keys
            .insert(NewApiKey {
                name: format!("key of {}", user.email),
                key: value.into(),
                user_id: user.id.clone(),
                expires_at: None,
            })
            .await
            .unwrap()
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, api_key: Option<&str>, body: Value) -> Request<Body> {
    send_json("POST", uri, api_key, body)
}

fn send_json(method: &str, uri: &str, api_key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

// ── Authorization gate ──────────────────────────────────────────

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = app().await;
    let requests = vec![
        get("/api/apikey", None),
        get("/api/apikey/", None),
        post_json("/api/apikey", None, json!({"name": "x"})),
        post_json("/api/apikey/update", None, json!({"id": "k", "isActive": false})),
        post_json("/api/apikey/delete", None, json!({"id": "k"})),
        send_json("PATCH", "/api/apikey/k", None, json!({"isActive": false})),
        Request::builder()
            .method("DELETE")
            .uri("/api/apikey/k")
            .body(Body::empty())
            .unwrap(),
    ];

    for req in requests {
        let uri = req.uri().to_string();
        let (status, body) = app.send(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({"error": "Unauthorized"}), "{uri}");
    }
}

#[tokio::test]
async fn unknown_key_is_unauthorized() {
    let app = app().await;
    let (status, _) = app.send(get("/api/apikey", Some("sk-nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_or_expired_keys_are_unauthorized() {
    let app = app().await;
    let now = Utc::now();
    for (value, active, expires_at) in [
        ("sk-inactive", false, None),
        ("sk-inactive-future", false, Some(now + Duration::days(1))),
        ("sk-expired", true, Some(now - Duration::seconds(1))),
    ] {
        app.keys.seed(ApiKey {
            id: value.into(),
            name: value.into(),
            key: value.into(),
            user_id: app.u1.id.clone(),
            is_active: active,
            expires_at,
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
        });

        let (status, _) = app.send(get("/api/apikey", Some(value))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
    }
}

#[tokio::test]
async fn bearer_key_authenticates_like_x_api_key() {
    let app = app().await;
    app.key_for(&app.u1, "sk-bearer").await;

    let (status, via_header) = app.send(get("/api/apikey", Some("sk-bearer"))).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .uri("/api/apikey")
        .header(header::AUTHORIZATION, "Bearer sk-bearer")
        .body(Body::empty())
        .unwrap();
    let (status, via_bearer) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(via_header, via_bearer);
}

#[tokio::test]
async fn store_failure_during_lookup_is_unauthorized() {
    let app = app().await;
    app.key_for(&app.u1, "sk-live").await;
    app.keys.set_failing(true);

    let (status, body) = app.send(get("/api/apikey", Some("sk-live"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn session_cookie_takes_precedence_over_api_key() {
    let app = app().await;
    app.key_for(&app.u1, "sk-u1").await;
    app.key_for(&app.u2, "sk-u2").await;

    let token =
        create_session_token(&app.u2.id, "sess", Duration::hours(1), &session_config()).unwrap();
    let req = Request::builder()
        .uri("/api/apikey")
        .header("x-api-key", "sk-u1")
        .header(header::COOKIE, format!("{DEFAULT_COOKIE_NAME}={token}"))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    let keys = body["apiKeys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["key"], "sk-u2");
}

// ── Key lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn deactivating_own_key_locks_it_out() {
    let app = app().await;
    let k1 = app.key_for(&app.u1, "sk-k1").await;

    let (status, body) = app.send(get("/api/apikey", Some("sk-k1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKeys"].as_array().unwrap().len(), 1);
    assert_eq!(body["apiKeys"][0]["id"], k1.id);
    assert_eq!(body["apiKeys"][0]["isActive"], true);

    let (status, body) = app
        .send(post_json(
            "/api/apikey/update",
            Some("sk-k1"),
            json!({"id": k1.id, "isActive": false}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"]["isActive"], false);

    let (status, _) = app.send(get("/api/apikey", Some("sk-k1"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_key_cannot_be_deleted_or_updated() {
    let app = app().await;
    let k1 = app.key_for(&app.u1, "sk-k1").await;
    app.key_for(&app.u2, "sk-k2").await;

    let (status, body) = app
        .send(post_json("/api/apikey/delete", Some("sk-k2"), json!({"id": k1.id})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Forbidden"}));

    let (status, _) = app
        .send(post_json(
            "/api/apikey/update",
            Some("sk-k2"),
            json!({"id": k1.id, "isActive": false}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/apikey/{}", k1.id))
        .header("x-api-key", "sk-k2")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = app.keys.find_by_id(&k1.id).await.unwrap().unwrap();
    assert_eq!(stored, k1);
}

#[tokio::test]
async fn missing_key_is_forbidden_not_404() {
    let app = app().await;
    app.key_for(&app.u1, "sk-k1").await;

    let (status, _) = app
        .send(post_json("/api/apikey/delete", Some("sk-k1"), json!({"id": "no-such-key"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_list_patch_and_delete_round() {
    let app = app().await;
    app.key_for(&app.u1, "sk-admin").await;

    let (status, body) = app
        .send(post_json(
            "/api/apikey/",
            Some("sk-admin"),
            json!({"name": "deploy", "expiresAt": "2030-01-01"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let created = &body["apiKey"];
    assert_eq!(created["name"], "deploy");
    assert_eq!(created["isActive"], true);
    assert_eq!(created["expiresAt"], "2030-01-01T00:00:00.000Z");
    assert!(created["key"].as_str().unwrap().starts_with("sk-"));
    let id = created["id"].as_str().unwrap().to_string();

    let (_, body) = app.send(get("/api/apikey", Some("sk-admin"))).await;
    assert_eq!(body["apiKeys"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .send(send_json(
            "PATCH",
            &format!("/api/apikey/{id}"),
            Some("sk-admin"),
            json!({"isActive": true, "expiresAt": null}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"]["expiresAt"], Value::Null);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/apikey/{id}"))
        .header("x-api-key", "sk-admin")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, body) = app.send(get("/api/apikey", Some("sk-admin"))).await;
    assert_eq!(body["apiKeys"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn created_key_authenticates_its_owner() {
    let app = app().await;
    app.key_for(&app.u1, "sk-bootstrap").await;

    let (_, body) = app
        .send(post_json("/api/apikey", Some("sk-bootstrap"), json!({"name": "fresh"})))
        .await;
    let fresh = body["apiKey"]["key"].as_str().unwrap().to_string();

    let (status, body) = app.send(get("/api/apikey", Some(&fresh))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKeys"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = app().await;
    app.key_for(&app.u1, "sk-k1").await;

    for body in [
        json!({}),
        json!({"name": ""}),
        json!({"name": "   "}),
        json!({"name": "x".repeat(101)}),
        json!({"name": "ok", "expiresAt": "not-a-date"}),
    ] {
        let (status, resp) = app
            .send(post_json("/api/apikey", Some("sk-k1"), body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(resp["error"].is_string());
    }

    let req = Request::builder()
        .method("POST")
        .uri("/api/apikey/update")
        .header("x-api-key", "sk-k1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhausted_key_generation_is_internal_error() {
    let generator: KeyGenerator = Arc::new(|| "sk-always-the-same".to_string());
    let app = app_with(Some(generator)).await;
    app.key_for(&app.u1, "sk-always-the-same").await;

    let (status, body) = app
        .send(post_json(
            "/api/apikey",
            Some("sk-always-the-same"),
            json!({"name": "dup"}),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to create API key"}));
    assert_eq!(app.keys.len(), 1);
}

#[tokio::test]
async fn key_listing_store_failure_after_auth_is_500() {
    let app = app().await;
    let token =
        create_session_token(&app.u1.id, "sess", Duration::hours(1), &session_config()).unwrap();
    app.keys.set_failing(true);

    let req = Request::builder()
        .uri("/api/apikey")
        .header(header::COOKIE, format!("{DEFAULT_COOKIE_NAME}={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch API keys"}));
}

// ── Public routes ───────────────────────────────────────────────

#[tokio::test]
async fn session_endpoint_reports_current_session_or_null() {
    let app = app().await;
    app.users
        .update_user_role(&app.u1.id, UserRole::Admin)
        .await
        .unwrap();

    let (status, body) = app.send(get("/api/session", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": null}));

    let token =
        create_session_token(&app.u1.id, "sess-42", Duration::hours(1), &session_config()).unwrap();
    let req = Request::builder()
        .uri("/api/session")
        .header(header::COOKIE, format!("{DEFAULT_COOKIE_NAME}={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session"]["id"], "sess-42");
    assert_eq!(body["data"]["session"]["userId"], app.u1.id);
    assert_eq!(body["data"]["user"]["email"], "u1@example.com");
    assert_eq!(body["data"]["user"]["role"], "admin");
}

#[tokio::test]
async fn status_endpoint_is_public() {
    let app = app().await;
    let (status, body) = app.send(get("/api/status", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "memory");
    assert!(body["uptime"].is_number());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;
    let (status, body) = app.send(get("/api/docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/apikey"].is_object());
    assert!(body["paths"]["/api/apikey/{id}"].is_object());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app().await;
    let resp = app
        .router
        .clone()
        .oneshot(get("/api/status", None))
        .await
        .unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}
