//! HTTP-level integration tests for portal authentication.
//!
//! Tests cover login, token refresh and rotation, logout, RBAC enforcement
//! on the dispatch admin surface, and account lockout.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, get, get_auth, login_user, post_json, post_json_auth};
use sqlx::PgPool;
use seezee_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Auth flow tests
// ---------------------------------------------------------------------------

/// Successful login returns 200 with access_token, refresh_token, and user info.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_success(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "loginuser", 1).await;

    let json = login_user(common::build_test_app(pool), "loginuser", &password).await;

    assert!(
        json["access_token"].is_string(),
        "response must contain access_token"
    );
    assert!(
        json["refresh_token"].is_string(),
        "response must contain refresh_token"
    );
    assert!(
        json["expires_in"].is_number(),
        "response must contain expires_in"
    );
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["username"], "loginuser");
    assert_eq!(json["user"]["email"], "loginuser@test.com");
    assert_eq!(json["user"]["role"], "admin");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_wrong_password(pool: PgPool) {
    let (_user, _password) = create_test_user(&pool, "wrongpw", 1).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent username returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login to a deactivated account returns 403.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_inactive_user(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "inactive", 1).await;
    UserRepo::deactivate(&pool, user.id)
        .await
        .expect("deactivation should succeed");

    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "inactive", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A valid refresh token returns new tokens, and the refresh token rotates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn token_refresh_rotates(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "refresher", 1).await;

    let login_json = login_user(common::build_test_app(pool.clone()), "refresher", &password).await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_ne!(
        json["refresh_token"].as_str().unwrap(),
        refresh_token,
        "refresh token must rotate on use"
    );

    // The old token is revoked; replaying it must fail.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_with_invalid_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes sessions and returns 204 No Content.
#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "logoutuser", 1).await;

    let login_json =
        login_user(common::build_test_app(pool.clone()), "logoutuser", &password).await;
    let access_token = login_json["access_token"].as_str().unwrap();
    let refresh_token = login_json["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The refresh token was revoked along with the session.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// RBAC enforcement tests
// ---------------------------------------------------------------------------

/// Admin endpoints require authentication -- missing token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_endpoint_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/admin/nodes").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// An operator (role_id=2) is forbidden from the dispatch admin surface.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_endpoint_requires_admin_role(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "operatoruser", 2).await;

    let login_json =
        login_user(common::build_test_app(pool.clone()), "operatoruser", &password).await;
    let token = login_json["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/nodes", token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A JWT is not a node credential: admin tokens are rejected on the agent
/// surface.
#[sqlx::test(migrations = "../../db/migrations")]
async fn agent_endpoint_rejects_jwt(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "jwtnode", 1).await;

    let login_json = login_user(common::build_test_app(pool.clone()), "jwtnode", &password).await;
    let token = login_json["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool);
    let response =
        post_json_auth(app, "/api/v1/agent/heartbeat", serde_json::json!({}), token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Account lockout
// ---------------------------------------------------------------------------

/// After 5 failed login attempts the account is locked.
#[sqlx::test(migrations = "../../db/migrations")]
async fn account_lockout_after_failed_attempts(pool: PgPool) {
    let (_user, _password) = create_test_user(&pool, "lockme", 1).await;

    // Fail login 5 times with the wrong password to trigger the lock.
    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({ "username": "lockme", "password": "wrong_pass" });
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The 6th attempt (even with the wrong password) should return 403 (locked).
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "lockme", "password": "wrong_pass" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    let error_msg = json["error"].as_str().unwrap_or("");
    assert!(
        error_msg.contains("locked"),
        "error message should mention the account is locked, got: {error_msg}"
    );
}
