//! Repository for the `execution_requests` table.
//!
//! Creation is two-phase inside one transaction: the row is inserted with a
//! placeholder branch name, then patched to the deterministic
//! `seezee/req-<id>` form once the id exists. The placeholder never commits.
//!
//! The claim path is the contended one: multiple nodes may race for the same
//! queued request, so every step is a conditional update and a zero-row
//! result anywhere rolls the whole transaction back.

use sqlx::PgPool;

use seezee_core::dispatch::{branch_name_for_request, BRANCH_PLACEHOLDER};
use seezee_core::types::DbId;

use crate::models::request::{CreateRequest, ExecutionRequest, RequestListQuery};
use crate::models::run::ExecutionRun;
use crate::models::status::{NodeStatus, RequestPriority, RequestStatus, RunStatus};
use crate::repositories::run_repo::RUN_COLUMNS;

/// Column list for `execution_requests` queries.
const COLUMNS: &str = "\
    id, task, repo_url, branch_name, priority_id, status_id, pinned_node_id, \
    created_by, claimed_at, created_at, updated_at";

/// Maximum page size for request listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for request listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for execution requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Create a queued request, finalizing the branch name before commit.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateRequest,
        priority: RequestPriority,
    ) -> Result<ExecutionRequest, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO execution_requests \
                 (task, repo_url, branch_name, priority_id, status_id, pinned_node_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ExecutionRequest>(&insert)
            .bind(&input.task)
            .bind(&input.repo_url)
            .bind(BRANCH_PLACEHOLDER)
            .bind(priority.id())
            .bind(RequestStatus::Queued.id())
            .bind(input.pinned_node_id)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let patch = format!(
            "UPDATE execution_requests SET branch_name = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let finalized = sqlx::query_as::<_, ExecutionRequest>(&patch)
            .bind(inserted.id)
            .bind(branch_name_for_request(inserted.id))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(finalized)
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExecutionRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM execution_requests WHERE id = $1");
        sqlx::query_as::<_, ExecutionRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests with optional status/pinned-node filters and pagination,
    /// newest first.
    pub async fn list(
        pool: &PgPool,
        params: &RequestListQuery,
    ) -> Result<Vec<ExecutionRequest>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.pinned_node_id.is_some() {
            conditions.push(format!("pinned_node_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM execution_requests \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ExecutionRequest>(&query);
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(nid) = params.pinned_node_id {
            q = q.bind(nid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Atomically claim a queued request for a node, creating its run.
    ///
    /// One transaction, three guarded steps:
    ///
    /// 1. `queued -> claimed` on the request, only if it is still queued and
    ///    either unpinned or pinned to this node;
    /// 2. insert the run row as `running`;
    /// 3. occupy the node's concurrency slot, only if it is still empty.
    ///
    /// A zero-row result in step 1 or 3 means this node lost a race (or the
    /// request/slot was never claimable); the transaction rolls back and
    /// `Ok(None)` is returned with no partial state. The caller maps `None`
    /// to a conflict error.
    pub async fn claim(
        pool: &PgPool,
        node_id: DbId,
        request_id: DbId,
    ) -> Result<Option<ExecutionRun>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE execution_requests \
             SET status_id = $3, claimed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
               AND status_id = $4 \
               AND (pinned_node_id IS NULL OR pinned_node_id = $2)",
        )
        .bind(request_id)
        .bind(node_id)
        .bind(RequestStatus::Claimed.id())
        .bind(RequestStatus::Queued.id())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let insert_run = format!(
            "INSERT INTO execution_runs (request_id, node_id, status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {RUN_COLUMNS}"
        );
        let run = sqlx::query_as::<_, ExecutionRun>(&insert_run)
            .bind(request_id)
            .bind(node_id)
            .bind(RunStatus::Running.id())
            .fetch_one(&mut *tx)
            .await?;

        let occupied = sqlx::query(
            "UPDATE nodes \
             SET current_run_id = $2, status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND current_run_id IS NULL",
        )
        .bind(node_id)
        .bind(run.id)
        .bind(NodeStatus::Busy.id())
        .execute(&mut *tx)
        .await?;

        if occupied.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(run))
    }
}
