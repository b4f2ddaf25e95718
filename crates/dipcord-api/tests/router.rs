//! Router tests that never reach PostgreSQL or Redis
//!
//! Pools are created lazily, so requests rejected by extractors run without
//! any backing service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use dipcord_api::{create_app, AppState};
use dipcord_cache::{RedisPool, RedisPoolConfig};
use dipcord_common::{AppConfig, JwtService};
use dipcord_core::{Snowflake, SnowflakeGenerator};
use dipcord_service::ServiceContextBuilder;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

fn test_config(extra: &[(&'static str, &'static str)]) -> AppConfig {
    let mut vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://localhost/dipcord_router_test"),
        ("JWT_SECRET", SECRET),
    ]
    .into_iter()
    .collect();
    vars.extend(extra.iter().copied());
    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap()
}

fn app() -> Router {
    app_with(test_config(&[]))
}

fn app_with(config: AppConfig) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();
    let redis = Arc::new(RedisPool::new(RedisPoolConfig::default()).unwrap());

    let ctx = ServiceContextBuilder::new()
        .postgres(pool)
        .redis_pool(redis)
        .jwt_service(Arc::new(JwtService::new(SECRET, 900, 3600)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
        .build()
        .unwrap();

    create_app(AppState::new(ctx, config)).unwrap()
}

fn tokens() -> (String, String) {
    let issued = JwtService::new(SECRET, 900, 3600)
        .generate_token_pair(Snowflake::new(42))
        .unwrap();
    (issued.pair.access_token, issued.pair.refresh_token)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn production_config_builds_app() {
    let config = test_config(&[
        ("APP_ENV", "production"),
        ("CORS_ALLOWED_ORIGINS", "https://app.example"),
    ]);
    assert!(config.app.env.is_production());

    let response = app_with(config).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn liveness_check_needs_no_auth() {
    let (status, body) = send(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn missing_bearer_is_401() {
    let (status, body) = send(get("/v1/users/@me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let (status, body) = send(get("/v1/channels/discover", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn refresh_token_cannot_authenticate() {
    let (_, refresh) = tokens();
    let (status, _) = send(get("/v1/users/@me", Some(&refresh))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_snowflake_is_400() {
    let (access, _) = tokens();
    let (status, body) = send(get("/v1/channels/general", Some(&access))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn malformed_invite_code_is_400() {
    let (access, _) = tokens();
    let (status, body) = send(get("/v1/invites/abc-def", Some(&access))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn broken_json_is_400() {
    let request = Request::post("/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = send(get("/v1/rooms", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
