//! Execution run entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seezee_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `execution_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExecutionRun {
    pub id: DbId,
    pub request_id: DbId,
    pub node_id: DbId,
    pub status_id: StatusId,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub pr_url: Option<String>,
    pub preview_url: Option<String>,
    pub error_message: Option<String>,
    pub summary: Option<String>,
    /// Human-in-the-loop clarifications, stored as `[{question, answer?}]`.
    pub questions: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a node's completion report via `POST /agent/runs/{id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteRun {
    /// Terminal status label: `success` or `failed` (any case).
    pub status: String,
    pub pr_url: Option<String>,
    pub preview_url: Option<String>,
    pub error_message: Option<String>,
    pub summary: Option<String>,
    pub questions: Option<serde_json::Value>,
}

/// Query parameters for `GET /admin/runs`.
#[derive(Debug, Deserialize)]
pub struct RunListQuery {
    /// Filter by owning node.
    pub node_id: Option<DbId>,
    /// Filter by run status ID (e.g. 1 = running).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Read-side join of a run with its node and originating request, for the
/// operator run list. Display only; no write path goes through this shape.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunSummary {
    pub id: DbId,
    pub request_id: DbId,
    pub node_id: DbId,
    pub status_id: StatusId,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub pr_url: Option<String>,
    pub error_message: Option<String>,
    pub summary: Option<String>,
    pub node_name: String,
    pub node_type: String,
    pub repo_url: String,
    pub branch_name: String,
    pub priority_id: StatusId,
}

/// A run plus its log count, for the operator run detail view.
#[derive(Debug, Serialize)]
pub struct RunDetail {
    #[serde(flatten)]
    pub run: ExecutionRun,
    pub log_count: i64,
}
