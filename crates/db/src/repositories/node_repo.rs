//! Repository for the `nodes` table.

use sqlx::PgPool;

use seezee_core::fleet::DEFAULT_HEARTBEAT_THRESHOLD_SECS;
use seezee_core::types::DbId;

use crate::models::node::{CreateNode, FleetStats, Node};
use crate::models::status::NodeStatus;

/// Column list for `nodes` queries.
const COLUMNS: &str = "\
    id, name, node_type, capabilities, status_id, current_run_id, \
    last_heartbeat_at, metadata, registered_at, created_at, updated_at";

/// Same column list prefixed with the `n.` alias, for joined queries.
const PREFIXED_COLUMNS: &str = "\
    n.id, n.name, n.node_type, n.capabilities, n.status_id, n.current_run_id, \
    n.last_heartbeat_at, n.metadata, n.registered_at, n.created_at, n.updated_at";

/// Provides CRUD operations for workflow nodes.
pub struct NodeRepo;

impl NodeRepo {
    // ── Registration ─────────────────────────────────────────────────────

    /// Insert a new node with persisted status Offline.
    ///
    /// A node is considered offline until its first heartbeat arrives,
    /// regardless of how recently it was provisioned.
    pub async fn register(pool: &PgPool, input: &CreateNode) -> Result<Node, sqlx::Error> {
        let capabilities = serde_json::to_value(input.capabilities)
            .unwrap_or_else(|_| serde_json::json!({}));

        let query = format!(
            "INSERT INTO nodes (name, node_type, capabilities, status_id, metadata) \
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(&input.name)
            .bind(&input.node_type)
            .bind(&capabilities)
            .bind(NodeStatus::Offline.id())
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Find a node by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Node>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nodes WHERE id = $1");
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a node by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Node>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nodes WHERE name = $1");
        sqlx::query_as::<_, Node>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find a node by its credential public id (the authentication guard's
    /// lookup path). Returns `None` for an unknown public id.
    pub async fn find_by_public_id(
        pool: &PgPool,
        public_id: &str,
    ) -> Result<Option<Node>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED_COLUMNS} FROM nodes n \
             JOIN node_credentials c ON c.node_id = n.id \
             WHERE c.public_id = $1"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }

    /// List all nodes ordered by name (admin view).
    pub async fn list(pool: &PgPool) -> Result<Vec<Node>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nodes ORDER BY name ASC");
        sqlx::query_as::<_, Node>(&query).fetch_all(pool).await
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Record a heartbeat: touch the timestamp and, when the node holds no
    /// run, flip the persisted status to Online. Returns the updated row.
    pub async fn record_heartbeat(pool: &PgPool, id: DbId) -> Result<Option<Node>, sqlx::Error> {
        let query = format!(
            "UPDATE nodes SET \
                last_heartbeat_at = NOW(), \
                status_id = CASE WHEN current_run_id IS NULL THEN $2 ELSE status_id END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .bind(NodeStatus::Online.id())
            .fetch_optional(pool)
            .await
    }

    // ── Fleet stats ──────────────────────────────────────────────────────

    /// Aggregate fleet-level statistics.
    ///
    /// `busy_nodes` counts occupied concurrency slots; `silent_nodes` counts
    /// nodes whose heartbeat is missing or older than the threshold.
    pub async fn fleet_stats(
        pool: &PgPool,
        threshold_secs: Option<i64>,
    ) -> Result<FleetStats, sqlx::Error> {
        let threshold = threshold_secs.unwrap_or(DEFAULT_HEARTBEAT_THRESHOLD_SECS);
        let query = "\
            SELECT \
                COUNT(*) AS total_nodes, \
                COUNT(*) FILTER (WHERE current_run_id IS NOT NULL) AS busy_nodes, \
                COUNT(*) FILTER (WHERE last_heartbeat_at IS NULL \
                    OR last_heartbeat_at < NOW() - make_interval(secs => $1)) AS silent_nodes \
            FROM nodes";
        sqlx::query_as::<_, FleetStats>(query)
            .bind(threshold as f64)
            .fetch_one(pool)
            .await
    }
}
