//! Repository for the `execution_runs` table.
//!
//! Completion is the one mutation, and it is idempotent: the terminal update
//! is guarded on `status_id = running`, so a duplicate report matches zero
//! rows and the existing final state is returned untouched. Freeing the
//! node's concurrency slot and finalizing the request row happen in the same
//! transaction as the run update so a crash cannot leave a node marked busy
//! for a finished run.

use sqlx::PgPool;

use seezee_core::types::DbId;

use crate::models::run::{ExecutionRun, RunListQuery, RunSummary};
use crate::models::status::{NodeStatus, RequestStatus, RunStatus};

/// Column list for `execution_runs` queries. Shared with the claim path in
/// the request repository.
pub(crate) const RUN_COLUMNS: &str = "\
    id, request_id, node_id, status_id, started_at, completed_at, \
    pr_url, preview_url, error_message, summary, questions, \
    created_at, updated_at";

/// Maximum page size for run listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for run listing.
const DEFAULT_LIMIT: i64 = 50;

/// Terminal artifacts supplied with a completion report.
#[derive(Debug, Default)]
pub struct RunArtifacts {
    pub pr_url: Option<String>,
    pub preview_url: Option<String>,
    pub error_message: Option<String>,
    pub summary: Option<String>,
    pub questions: Option<serde_json::Value>,
}

/// Outcome of a completion attempt.
#[derive(Debug)]
pub struct CompletionOutcome {
    /// The run in its final state.
    pub run: ExecutionRun,
    /// True when the run was already completed and this report was a benign
    /// duplicate; no side effects were applied.
    pub duplicate: bool,
}

/// Provides operations for execution runs.
pub struct RunRepo;

impl RunRepo {
    /// Find a run by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ExecutionRun>, sqlx::Error> {
        let query = format!("SELECT {RUN_COLUMNS} FROM execution_runs WHERE id = $1");
        sqlx::query_as::<_, ExecutionRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finalize a run, free the owning node's slot, and close the request,
    /// all in one transaction.
    ///
    /// Returns `Ok(None)` if no run with `id` exists. If the run is already
    /// completed, returns the existing row with `duplicate = true` and
    /// applies nothing.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        status: RunStatus,
        artifacts: &RunArtifacts,
    ) -> Result<Option<CompletionOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let finalize = format!(
            "UPDATE execution_runs \
             SET status_id = $2, completed_at = NOW(), \
                 pr_url = $3, preview_url = $4, error_message = $5, \
                 summary = $6, questions = $7, updated_at = NOW() \
             WHERE id = $1 AND status_id = $8 \
             RETURNING {RUN_COLUMNS}"
        );
        let finalized = sqlx::query_as::<_, ExecutionRun>(&finalize)
            .bind(id)
            .bind(status.id())
            .bind(&artifacts.pr_url)
            .bind(&artifacts.preview_url)
            .bind(&artifacts.error_message)
            .bind(&artifacts.summary)
            .bind(&artifacts.questions)
            .bind(RunStatus::Running.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(run) = finalized else {
            // Zero rows: either the run does not exist or it already
            // completed. Reapply nothing and report what is there.
            tx.rollback().await?;
            return Ok(Self::find_by_id(pool, id)
                .await?
                .map(|run| CompletionOutcome { run, duplicate: true }));
        };

        // Free the slot only if this run still occupies it.
        sqlx::query(
            "UPDATE nodes \
             SET current_run_id = NULL, status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND current_run_id = $3",
        )
        .bind(run.node_id)
        .bind(NodeStatus::Online.id())
        .bind(run.id)
        .execute(&mut *tx)
        .await?;

        let request_status = match status {
            RunStatus::Failed => RequestStatus::Failed,
            _ => RequestStatus::Done,
        };
        sqlx::query(
            "UPDATE execution_requests SET status_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(run.request_id)
        .bind(request_status.id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(CompletionOutcome {
            run,
            duplicate: false,
        }))
    }

    /// List run summaries (joined with node and request display fields) with
    /// optional node/status filters and pagination, newest first.
    pub async fn list_summaries(
        pool: &PgPool,
        params: &RunListQuery,
    ) -> Result<Vec<RunSummary>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.node_id.is_some() {
            conditions.push(format!("u.node_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("u.status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT u.id, u.request_id, u.node_id, u.status_id, u.started_at, \
                    u.completed_at, u.pr_url, u.error_message, u.summary, \
                    n.name AS node_name, n.node_type, \
                    r.repo_url, r.branch_name, r.priority_id \
             FROM execution_runs u \
             JOIN nodes n ON n.id = u.node_id \
             JOIN execution_requests r ON r.id = u.request_id \
             {where_clause} \
             ORDER BY u.started_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, RunSummary>(&query);
        if let Some(nid) = params.node_id {
            q = q.bind(nid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Fail every running run whose node has been silent longer than
    /// `timeout_secs`, freeing each node's slot through the normal
    /// completion path. Returns the failed run ids.
    pub async fn fail_stale(
        pool: &PgPool,
        timeout_secs: i64,
        error_message: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let stale: Vec<(DbId,)> = sqlx::query_as(
            "SELECT u.id FROM execution_runs u \
             JOIN nodes n ON n.id = u.node_id \
             WHERE u.status_id = $1 \
               AND (n.last_heartbeat_at IS NULL \
                    OR n.last_heartbeat_at < NOW() - make_interval(secs => $2))",
        )
        .bind(RunStatus::Running.id())
        .bind(timeout_secs as f64)
        .fetch_all(pool)
        .await?;

        let artifacts = RunArtifacts {
            error_message: Some(error_message.to_string()),
            ..Default::default()
        };

        let mut failed = Vec::new();
        for (run_id,) in stale {
            // Idempotent: a node that reports back mid-sweep just turns this
            // into a duplicate completion.
            if let Some(outcome) =
                Self::complete(pool, run_id, RunStatus::Failed, &artifacts).await?
            {
                if !outcome.duplicate {
                    failed.push(run_id);
                }
            }
        }
        Ok(failed)
    }
}
