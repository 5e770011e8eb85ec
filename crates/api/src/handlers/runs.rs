//! Handlers for execution runs.
//!
//! Provides:
//! - The agent completion endpoint (idempotent).
//! - Admin endpoints for listing and inspecting runs.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use seezee_core::error::CoreError;
use seezee_core::types::DbId;
use seezee_db::models::run::{CompleteRun, ExecutionRun, RunDetail, RunListQuery};
use seezee_db::models::status::RunStatus;
use seezee_db::repositories::{RunLogRepo, RunRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::node_auth::AuthNode;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for a completion report.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    #[serde(flatten)]
    pub run: ExecutionRun,
    /// True when the run had already been completed and this report changed
    /// nothing.
    pub duplicate: bool,
}

// ---------------------------------------------------------------------------
// POST /agent/runs/:id/complete
// ---------------------------------------------------------------------------

/// Report a run's terminal result.
///
/// Idempotent: a repeated report for an already-completed run returns the
/// existing final state with `duplicate: true` and applies nothing.
pub async fn complete_run(
    AuthNode(node): AuthNode,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompleteRun>,
) -> AppResult<impl IntoResponse> {
    let status = RunStatus::parse_terminal(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown terminal status '{}'. Expected: success or failed",
            input.status
        )))
    })?;

    // Ownership check before any mutation.
    let run = RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Run", id }))?;
    if run.node_id != node.id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Run belongs to a different node".into(),
        )));
    }

    let artifacts = seezee_db::repositories::RunArtifacts {
        pr_url: input.pr_url,
        preview_url: input.preview_url,
        error_message: input.error_message,
        summary: input.summary,
        questions: input.questions,
    };

    let outcome = RunRepo::complete(&state.pool, id, status, &artifacts)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Run", id }))?;

    if outcome.duplicate {
        tracing::debug!(run_id = id, node_id = node.id, "Duplicate completion report");
    } else {
        tracing::info!(
            run_id = id,
            node_id = node.id,
            status = status.label(),
            "Run completed",
        );
    }

    Ok(Json(DataResponse {
        data: CompletionResponse {
            run: outcome.run,
            duplicate: outcome.duplicate,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /admin/runs
// ---------------------------------------------------------------------------

/// List run summaries with optional filters (admin view).
pub async fn list_runs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RunListQuery>,
) -> AppResult<impl IntoResponse> {
    let runs = RunRepo::list_summaries(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: runs }))
}

// ---------------------------------------------------------------------------
// GET /admin/runs/:id
// ---------------------------------------------------------------------------

/// Get a single run with its log count.
pub async fn get_run(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let run = RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Run", id }))?;
    let log_count = RunLogRepo::count_for_run(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: RunDetail { run, log_count },
    }))
}
