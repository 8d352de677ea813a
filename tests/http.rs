//! The HTTP adapter driven through `build_router`, with in-memory collaborators.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tower::ServiceExt;
use yada_authorizer::{
    app::build_router,
    middleware::http::HttpLimits,
    services::{
        auth::{
            AuthError, Authorizer,
            credentials::Credentials,
            identity::GrantRow,
            identity_cache::KeyedIdentityCache,
            resolver::{IdentityLookup, IdentityResolver},
            token::TokenService,
        },
        cache::MemoryCache,
    },
    state::AppState,
};

const SECRET: &[u8] = b"http-tests-secret-http-tests-secret-http-tests-secret-http-tests!";
const PAYLOAD: &str = r#"{"RESULTSET":{"records":1,"ROWS":[{"RESOURCE":"orders.list"}]}}"#;
const DENIAL_BODY: &str = r#"{"error":{"code":"UNAUTHORIZED","message":"User is not authorized"}}"#;

struct AliceOnly;

impl IdentityLookup for AliceOnly {
    fn grant_rows<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<GrantRow>, AuthError>> + Send + 'a>> {
        Box::pin(async move {
            if credentials.userid == "alice" && credentials.password == "secret" {
                Ok(vec![GrantRow::new("orders", "admin")])
            } else {
                Ok(Vec::new())
            }
        })
    }
}

fn app() -> Router {
    let cache = Arc::new(KeyedIdentityCache::new(
        Arc::new(MemoryCache::new()),
        "identity",
    ));
    let authorizer = Authorizer::new(
        IdentityResolver::new(Arc::new(AliceOnly), cache),
        TokenService::new(SECRET, "yada-http", 3600),
        vec!["authorization".to_string()],
    );

    build_router(
        AppState::new(Arc::new(authorizer)),
        HttpLimits {
            body_limit_bytes: 64 * 1024,
            request_timeout: Duration::from_secs(5),
        },
    )
}

fn basic(user: &str, pw: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pw}")))
}

fn authorize_request(auth: &str, args: &str) -> Request<Body> {
    let body = format!(r#"{{"args":{args},"payload":{PAYLOAD}}}"#);
    Request::builder()
        .method("POST")
        .uri("/api/v1/authorize")
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/token")
                .header(header::AUTHORIZATION, basic("alice", "secret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await
}

#[tokio::test]
async fn authorize_returns_bare_token_in_place_of_payload() {
    let response = app()
        .oneshot(authorize_request(
            &basic("alice", "secret"),
            r#"["orders","admin"]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    assert!(response.headers().contains_key("x-request-id"));

    let token = body_text(response).await;
    assert_eq!(token.split('.').count(), 3);
    assert!(!token.contains("RESULTSET"));
    assert!(!token.starts_with('"'));
}

#[tokio::test]
async fn every_denial_has_the_same_status_and_body() {
    let app = app();
    let requests = [
        authorize_request(&basic("alice", "wrong"), r#"["orders"]"#),
        authorize_request(&basic("alice", "secret"), r#"["billing"]"#),
        authorize_request(&basic("alice", "secret"), r#"["orders","admin","extra"]"#),
        authorize_request("Bearer not-a-jwt", r#"["orders"]"#),
    ];

    for request in requests {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, DENIAL_BODY);
    }
}

#[tokio::test]
async fn missing_bearer_is_rejected_by_the_extractor() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/token/validate")
                .header(header::AUTHORIZATION, basic("alice", "secret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, DENIAL_BODY);
}

#[tokio::test]
async fn revoked_token_no_longer_validates() {
    let app = app();
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/v1/token/validate", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(bearer_request("DELETE", "/api/v1/token", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/v1/token/validate", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_endpoint_serves_the_cached_identity() {
    let app = app();
    let token = login(&app).await;

    let response = app
        .oneshot(bearer_request("GET", "/api/v1/identity", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["sub"], "92903040");
    assert_eq!(json["grants"][0]["app"], "orders");
    assert_eq!(json["grants"][0]["keys"][0], "admin");
}

#[tokio::test]
async fn unreadable_body_is_a_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/authorize")
                .header(header::AUTHORIZATION, basic("alice", "secret"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_is_served_under_the_api_prefix() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("content-security-policy")
            .is_some_and(|v| v == "frame-ancestors 'none'")
    );
}
