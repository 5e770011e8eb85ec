//! Shared helpers for HTTP-level integration tests.
//!
//! Each test binary gets its own copy of this module; not every binary uses
//! every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use seezee_api::auth::jwt::JwtConfig;
use seezee_api::auth::password::hash_password;
use seezee_api::config::ServerConfig;
use seezee_api::router::build_app_router;
use seezee_api::state::AppState;
use seezee_db::models::user::{CreateUser, User};
use seezee_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        heartbeat_threshold_secs: 60,
        stale_run_timeout_secs: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Delegates to the same builder `main.rs` uses so integration tests
/// exercise the production middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery).
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body, without authentication.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a test user directly in the database and return the user row plus
/// the plaintext password used.
pub async fn create_test_user(pool: &PgPool, username: &str, role_id: i64) -> (User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hashed,
        role_id,
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    (user, password.to_string())
}

/// Log in a user via the API and return the JSON response containing
/// `access_token`, `refresh_token`, and `user` info.
pub async fn login_user(app: Router, username: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Create an admin user and log in, returning an access token.
pub async fn admin_token(pool: &PgPool, username: &str) -> String {
    let (_user, password) = create_test_user(pool, username, 1).await;
    let json = login_user(build_test_app(pool.clone()), username, &password).await;
    json["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}

/// Register a node via the admin API, returning `(node_id, credential)`.
///
/// The credential is the one-time `<public_id>.<secret>` bearer string.
pub async fn register_node(pool: &PgPool, token: &str, name: &str) -> (i64, String) {
    let body = serde_json::json!({ "name": name, "node_type": "code-agent" });
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/admin/nodes", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let node_id = json["data"]["node"]["id"]
        .as_i64()
        .expect("registration response must contain the node id");
    let credential = json["data"]["credential"]
        .as_str()
        .expect("registration response must contain the one-time credential")
        .to_string();
    (node_id, credential)
}

/// Heartbeat a node so its derived status is online.
pub async fn heartbeat_node(pool: &PgPool, credential: &str) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/agent/heartbeat",
        serde_json::json!({}),
        credential,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Register a node and heartbeat it once, returning `(node_id, credential)`.
///
/// Claiming requires a fresh heartbeat, so tests that dispatch work use this
/// instead of [`register_node`].
pub async fn ready_node(pool: &PgPool, token: &str, name: &str) -> (i64, String) {
    let (node_id, credential) = register_node(pool, token, name).await;
    heartbeat_node(pool, &credential).await;
    (node_id, credential)
}

/// Create an execution request via the admin API, returning its JSON.
pub async fn create_request(
    pool: &PgPool,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/admin/requests", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
