//! HTTP-level integration tests for run logs: append paths, ordering, and
//! truncation.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, create_request, get_auth, post_json_auth, ready_node, register_node,
};
use sqlx::PgPool;

/// Register a node, create a request, and claim it. Returns
/// `(credential, run_id)`.
async fn claimed_run(pool: &PgPool, token: &str, node_name: &str) -> (String, i64) {
    let (_node_id, credential) = ready_node(pool, token, node_name).await;
    let request = create_request(
        pool,
        token,
        serde_json::json!({ "task": "Task", "repo_url": "https://github.com/acme/site.git" }),
    )
    .await;
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!(
            "/api/v1/agent/requests/{}/claim",
            request["data"]["id"].as_i64().unwrap()
        ),
        serde_json::json!({}),
        &credential,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let run = body_json(response).await;
    (credential, run["data"]["id"].as_i64().unwrap())
}

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

/// A node appends a log entry to its own run; the level defaults to info.
#[sqlx::test(migrations = "../../db/migrations")]
async fn node_appends_log_with_default_level(pool: PgPool) {
    let token = admin_token(&pool, "logadmin").await;
    let (credential, run_id) = claimed_run(&pool, &token, "logger-01").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/agent/runs/{run_id}/logs"),
        serde_json::json!({ "message": "npm install ok" }),
        &credential,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["run_id"], run_id);
    assert_eq!(json["data"]["level_id"], 2); // info
    assert_eq!(json["data"]["message"], "npm install ok");
    assert_eq!(json["data"]["truncated"], false);
}

/// An unknown level label fails validation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_level_rejected(pool: PgPool) {
    let token = admin_token(&pool, "lvladmin").await;
    let (credential, run_id) = claimed_run(&pool, &token, "logger-02").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/agent/runs/{run_id}/logs"),
        serde_json::json!({ "level": "verbose", "message": "hello" }),
        &credential,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A node cannot write to a run it does not own.
#[sqlx::test(migrations = "../../db/migrations")]
async fn append_to_foreign_run_forbidden(pool: PgPool) {
    let token = admin_token(&pool, "ownadmin").await;
    let (_owner_cred, run_id) = claimed_run(&pool, &token, "owner-10").await;
    let (_intruder_id, intruder_cred) = register_node(&pool, &token, "intruder-10").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/agent/runs/{run_id}/logs"),
        serde_json::json!({ "message": "should not land" }),
        &intruder_cred,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Appending to a nonexistent run returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn append_to_unknown_run_returns_404(pool: PgPool) {
    let token = admin_token(&pool, "noneadmin").await;
    let (_node_id, credential) = register_node(&pool, &token, "logger-03").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/agent/runs/9999/logs",
        serde_json::json!({ "message": "nothing here" }),
        &credential,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An admin can annotate any run through the admin surface.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_appends_annotation(pool: PgPool) {
    let token = admin_token(&pool, "annadmin").await;
    let (_credential, run_id) = claimed_run(&pool, &token, "logger-04").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/admin/runs/{run_id}/logs"),
        serde_json::json!({ "level": "warn", "message": "node looks slow" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["level_id"], 3); // warn
}

// ---------------------------------------------------------------------------
// Truncation
// ---------------------------------------------------------------------------

/// Messages beyond the storage ceiling are clamped and flagged.
#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_message_truncated(pool: PgPool) {
    let token = admin_token(&pool, "truncadmin").await;
    let (credential, run_id) = claimed_run(&pool, &token, "logger-05").await;

    let message = "x".repeat(10_500);
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/agent/runs/{run_id}/logs"),
        serde_json::json!({ "message": message }),
        &credential,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["truncated"], true);
    assert_eq!(json["data"]["message"].as_str().unwrap().len(), 10_000);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Logs come back in insertion order and paginate.
#[sqlx::test(migrations = "../../db/migrations")]
async fn logs_list_in_insertion_order(pool: PgPool) {
    let token = admin_token(&pool, "orderadmin").await;
    let (credential, run_id) = claimed_run(&pool, &token, "logger-06").await;

    for i in 0..5 {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/agent/runs/{run_id}/logs"),
            serde_json::json!({ "message": format!("step {i}") }),
            &credential,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/runs/{run_id}/logs"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let messages: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, ["step 0", "step 1", "step 2", "step 3", "step 4"]);

    // Offset pagination keeps the same ordering.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/admin/runs/{run_id}/logs?limit=2&offset=2"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let page: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(page, ["step 2", "step 3"]);
}

/// Listing logs for a nonexistent run returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn list_logs_unknown_run_returns_404(pool: PgPool) {
    let token = admin_token(&pool, "missinglogs").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/admin/runs/9999/logs",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
