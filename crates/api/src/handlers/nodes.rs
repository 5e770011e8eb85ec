//! Handlers for workflow node fleet management.
//!
//! Provides:
//! - Admin endpoints for registering and inspecting nodes.
//! - The agent heartbeat endpoint.
//! - Fleet-level aggregate statistics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use seezee_core::credentials::issue_node_credential;
use seezee_core::dispatch;
use seezee_core::error::CoreError;
use seezee_core::types::{DbId, Timestamp};
use seezee_db::models::node::{CreateNode, CreateNodeCredential, Node, NodeView};
use seezee_db::repositories::{NodeCredentialRepo, NodeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::node_auth::AuthNode;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for node registration.
///
/// `credential` is the only place the plaintext credential ever appears; it
/// is not stored and cannot be retrieved again.
#[derive(Debug, Serialize)]
pub struct RegisteredNode {
    pub node: NodeView,
    /// One-time `<public_id>.<secret>` bearer credential for the node.
    pub credential: String,
}

/// Response body for the agent heartbeat acknowledgement.
#[derive(Debug, Serialize)]
pub struct HeartbeatAck {
    pub node_id: DbId,
    pub last_heartbeat_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a node exists, returning the full row.
async fn ensure_node_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Node> {
    NodeRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Node", id }))
}

/// Build the operator-facing view for a node row.
fn view(node: Node, state: &AppState) -> NodeView {
    NodeView::from_node(node, Utc::now(), state.config.heartbeat_threshold_secs)
}

// ---------------------------------------------------------------------------
// POST /admin/nodes
// ---------------------------------------------------------------------------

/// Register a node and issue its split credential.
pub async fn register_node(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateNode>,
) -> AppResult<impl IntoResponse> {
    dispatch::validate_node_name(&input.name)?;
    dispatch::validate_node_type(&input.node_type)?;

    if NodeRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A node named '{}' already exists",
            input.name
        ))));
    }

    let node = NodeRepo::register(&state.pool, &input).await?;

    let issued = issue_node_credential()?;
    NodeCredentialRepo::create(
        &state.pool,
        &CreateNodeCredential {
            node_id: node.id,
            public_id: issued.public_id.clone(),
            secret_hash: issued.secret_hash.clone(),
        },
    )
    .await?;

    tracing::info!(
        node_id = node.id,
        node_name = %node.name,
        admin_id = admin.user_id,
        "Node registered and credential issued",
    );

    let response = RegisteredNode {
        node: view(node, &state),
        credential: issued.presented(),
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

// ---------------------------------------------------------------------------
// GET /admin/nodes
// ---------------------------------------------------------------------------

/// List all nodes with their derived fleet status (admin view).
pub async fn list_nodes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let nodes = NodeRepo::list(&state.pool).await?;
    let views: Vec<NodeView> = nodes.into_iter().map(|n| view(n, &state)).collect();
    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// GET /admin/nodes/:id
// ---------------------------------------------------------------------------

/// Get a single node by ID.
pub async fn get_node(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let node = ensure_node_exists(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: view(node, &state),
    }))
}

// ---------------------------------------------------------------------------
// GET /admin/nodes/stats
// ---------------------------------------------------------------------------

/// Get fleet-level aggregate statistics.
pub async fn fleet_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats =
        NodeRepo::fleet_stats(&state.pool, Some(state.config.heartbeat_threshold_secs)).await?;
    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// POST /agent/heartbeat
// ---------------------------------------------------------------------------

/// Record a heartbeat from an authenticated node.
pub async fn heartbeat(
    AuthNode(node): AuthNode,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let updated = NodeRepo::record_heartbeat(&state.pool, node.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Node",
            id: node.id,
        }))?;

    tracing::debug!(node_id = updated.id, "Heartbeat recorded");

    Ok(Json(DataResponse {
        data: HeartbeatAck {
            node_id: updated.id,
            last_heartbeat_at: updated.last_heartbeat_at,
        },
    }))
}
