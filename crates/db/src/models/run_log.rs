//! Run log entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seezee_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the append-only `run_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RunLog {
    pub id: DbId,
    pub run_id: DbId,
    pub level_id: StatusId,
    pub message: String,
    /// Set when the submitted message exceeded the storage ceiling and was
    /// clamped before insert.
    pub truncated: bool,
    pub created_at: Timestamp,
}

/// DTO for appending a log entry.
#[derive(Debug, Deserialize)]
pub struct AppendLog {
    /// Severity label: `debug`, `info`, `warn`, or `error` (any case).
    /// Defaults to `info` when omitted.
    pub level: Option<String>,
    pub message: String,
}

/// Query parameters for `GET /admin/runs/{id}/logs`.
#[derive(Debug, Deserialize)]
pub struct LogListQuery {
    /// Maximum number of results. Defaults to 100, capped at 500.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
