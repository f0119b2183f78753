#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use casework_api::auth::jwt::{generate_access_token, JwtConfig};
use casework_api::config::ServerConfig;
use casework_api::router::build_app_router;
use casework_api::state::AppState;
use casework_core::types::DbId;
use casework_engine::{Engine, EngineConfig};
use casework_events::EventBus;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

const TEST_SECRET: &str = "casework-api-test-secret";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Router over `pool` with the production middleware stack and default
/// engine settings.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, EngineConfig::default())
}

pub fn build_test_app_with(pool: PgPool, engine_config: EngineConfig) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let engine = Arc::new(Engine::new(pool.clone(), engine_config, Arc::clone(&event_bus)));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
        event_bus,
    };
    build_app_router(state, &config)
}

pub fn token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    token(1, "admin")
}

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a debt-collection lawyer for `user_id` via the API; returns the
/// lawyer id.
pub async fn register_lawyer(pool: &PgPool, user_id: DbId, daily_claim_limit: Option<i32>) -> DbId {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/lawyers",
        &admin_token(),
        serde_json::json!({
            "user_id": user_id,
            "display_name": format!("Lawyer {user_id}"),
            "specialties": ["debt_collection"],
            "daily_claim_limit": daily_claim_limit,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Publish a debt-collection task as the admin operator; returns its id.
pub async fn publish_task(pool: &PgPool, title: &str) -> DbId {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/tasks",
        &admin_token(),
        serde_json::json!({
            "task_type": "debt_collection",
            "title": title,
            "amount_cents": 250_000,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
