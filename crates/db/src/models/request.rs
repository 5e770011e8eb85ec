//! Execution request entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seezee_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `execution_requests` table.
///
/// `branch_name` is always the final `seezee/req-<id>` form by the time a
/// row is visible outside the creating transaction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExecutionRequest {
    pub id: DbId,
    pub task: String,
    pub repo_url: String,
    pub branch_name: String,
    pub priority_id: StatusId,
    pub status_id: StatusId,
    pub pinned_node_id: Option<DbId>,
    pub created_by: DbId,
    pub claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a request via `POST /admin/requests`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub task: String,
    pub repo_url: String,
    /// Priority label: `low`, `medium`, `high`, or `urgent` (any case).
    /// Defaults to `medium` when omitted.
    pub priority: Option<String>,
    pub pinned_node_id: Option<DbId>,
}

/// Query parameters for `GET /admin/requests`.
#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    /// Filter by status ID (e.g. 1 = queued).
    pub status_id: Option<StatusId>,
    /// Filter by pinned node.
    pub pinned_node_id: Option<DbId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
