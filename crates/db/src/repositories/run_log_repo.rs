//! Repository for the append-only `run_logs` table.

use sqlx::PgPool;

use seezee_core::dispatch::truncate_log_message;
use seezee_core::types::DbId;

use crate::models::run_log::{LogListQuery, RunLog};
use crate::models::status::LogLevel;

/// Column list for `run_logs` queries.
const COLUMNS: &str = "id, run_id, level_id, message, truncated, created_at";

/// Maximum page size for log listing.
const MAX_LIMIT: i64 = 500;

/// Default page size for log listing.
const DEFAULT_LIMIT: i64 = 100;

/// Provides append and ordered-read operations for run logs.
pub struct RunLogRepo;

impl RunLogRepo {
    /// Append a log entry, clamping the message to the storage ceiling.
    pub async fn append(
        pool: &PgPool,
        run_id: DbId,
        level: LogLevel,
        message: String,
    ) -> Result<RunLog, sqlx::Error> {
        let (stored, truncated) = truncate_log_message(message);

        let query = format!(
            "INSERT INTO run_logs (run_id, level_id, message, truncated) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RunLog>(&query)
            .bind(run_id)
            .bind(level.id())
            .bind(&stored)
            .bind(truncated)
            .fetch_one(pool)
            .await
    }

    /// Page through a run's logs in insertion order.
    ///
    /// Ordered by `(created_at, id)` so entries written within the same
    /// timestamp tick still come back in insert order.
    pub async fn list_for_run(
        pool: &PgPool,
        run_id: DbId,
        params: &LogListQuery,
    ) -> Result<Vec<RunLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM run_logs \
             WHERE run_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, RunLog>(&query)
            .bind(run_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count the log entries for a run.
    pub async fn count_for_run(pool: &PgPool, run_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM run_logs WHERE run_id = $1")
            .bind(run_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
