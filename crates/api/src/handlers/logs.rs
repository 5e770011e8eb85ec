//! Handlers for run logs.
//!
//! The table is append-only; entries are paged back in insertion order.
//! Nodes may only write to runs they own; admins may annotate any run.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use seezee_core::error::CoreError;
use seezee_core::types::DbId;
use seezee_db::models::run::ExecutionRun;
use seezee_db::models::run_log::{AppendLog, LogListQuery};
use seezee_db::models::status::LogLevel;
use seezee_db::repositories::{RunLogRepo, RunRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::node_auth::AuthNode;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a run exists, returning the full row.
async fn ensure_run_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<ExecutionRun> {
    RunRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Run", id }))
}

/// Resolve the level label from the request body, defaulting to Info.
fn resolve_level(input: &AppendLog) -> AppResult<LogLevel> {
    match input.level.as_deref() {
        None => Ok(LogLevel::Info),
        Some(label) => LogLevel::parse(label).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown log level '{label}'. Expected: debug, info, warn, or error"
            )))
        }),
    }
}

// ---------------------------------------------------------------------------
// POST /agent/runs/:id/logs
// ---------------------------------------------------------------------------

/// Append a log entry from the node executing the run.
pub async fn append_node_log(
    AuthNode(node): AuthNode,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AppendLog>,
) -> AppResult<impl IntoResponse> {
    let run = ensure_run_exists(&state.pool, id).await?;
    if run.node_id != node.id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Run belongs to a different node".into(),
        )));
    }

    let level = resolve_level(&input)?;
    let entry = RunLogRepo::append(&state.pool, id, level, input.message).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

// ---------------------------------------------------------------------------
// POST /admin/runs/:id/logs
// ---------------------------------------------------------------------------

/// Append an annotation entry as an admin.
pub async fn append_admin_log(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AppendLog>,
) -> AppResult<impl IntoResponse> {
    ensure_run_exists(&state.pool, id).await?;

    let level = resolve_level(&input)?;
    let entry = RunLogRepo::append(&state.pool, id, level, input.message).await?;

    tracing::debug!(run_id = id, admin_id = admin.user_id, "Admin log appended");

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

// ---------------------------------------------------------------------------
// GET /admin/runs/:id/logs
// ---------------------------------------------------------------------------

/// Page through a run's logs in insertion order.
pub async fn list_run_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LogListQuery>,
) -> AppResult<impl IntoResponse> {
    ensure_run_exists(&state.pool, id).await?;

    let logs = RunLogRepo::list_for_run(&state.pool, id, &params).await?;
    Ok(Json(DataResponse { data: logs }))
}
