//! Handlers for execution requests.
//!
//! Provides:
//! - Admin endpoints for creating and inspecting requests.
//! - The agent claim endpoint, which races under contention.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use chrono::Utc;
use seezee_core::dispatch;
use seezee_core::error::CoreError;
use seezee_core::fleet::{self, DerivedNodeStatus};
use seezee_core::types::DbId;
use seezee_db::models::request::{CreateRequest, RequestListQuery};
use seezee_db::models::status::RequestPriority;
use seezee_db::repositories::{NodeRepo, RequestRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::node_auth::AuthNode;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the priority label from the request body, defaulting to Medium.
fn resolve_priority(input: &CreateRequest) -> AppResult<RequestPriority> {
    match input.priority.as_deref() {
        None => Ok(RequestPriority::Medium),
        Some(label) => RequestPriority::parse(label).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown priority '{label}'. Expected: low, medium, high, or urgent"
            )))
        }),
    }
}

// ---------------------------------------------------------------------------
// POST /admin/requests
// ---------------------------------------------------------------------------

/// Create a queued execution request.
pub async fn create_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<impl IntoResponse> {
    dispatch::validate_task(&input.task)?;
    dispatch::validate_repo_url(&input.repo_url)?;
    let priority = resolve_priority(&input)?;

    // A pin to a nonexistent node is a client error, not a queued request
    // nothing can ever claim.
    if let Some(node_id) = input.pinned_node_id {
        NodeRepo::find_by_id(&state.pool, node_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Node",
                id: node_id,
            }))?;
    }

    let request = RequestRepo::create(&state.pool, admin.user_id, &input, priority).await?;

    tracing::info!(
        request_id = request.id,
        branch_name = %request.branch_name,
        admin_id = admin.user_id,
        "Execution request created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

// ---------------------------------------------------------------------------
// GET /admin/requests
// ---------------------------------------------------------------------------

/// List requests with optional filters (admin view).
pub async fn list_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = RequestRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: requests }))
}

// ---------------------------------------------------------------------------
// GET /admin/requests/:id
// ---------------------------------------------------------------------------

/// Get a single request by ID.
pub async fn get_request(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;
    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// POST /agent/requests/:id/claim
// ---------------------------------------------------------------------------

/// Claim a queued request for the authenticated node.
///
/// Losing a claim race is an expected outcome under contention and maps to
/// 409, never to partial state.
pub async fn claim_request(
    AuthNode(node): AuthNode,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    // Distinguish "no such request" (404) from "not claimable" (409).
    RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;

    // A silent node cannot take on work. The transaction guards the run
    // slot; heartbeat recency is checked here, before entering it.
    let derived = fleet::derive_node_status(
        node.last_heartbeat_at,
        node.current_run_id,
        Utc::now(),
        state.config.heartbeat_threshold_secs,
    );
    if derived == DerivedNodeStatus::Offline {
        return Err(AppError::Core(CoreError::Conflict(
            "Node is offline; heartbeat before claiming".into(),
        )));
    }

    let run = RequestRepo::claim(&state.pool, node.id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is not claimable by this node".into(),
            ))
        })?;

    tracing::info!(
        request_id = id,
        run_id = run.id,
        node_id = node.id,
        "Request claimed",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}
