//! Workflow node entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seezee_core::capabilities::NodeCapabilities;
use seezee_core::fleet::DerivedNodeStatus;
use seezee_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

// ---------------------------------------------------------------------------
// Entity structs (match database tables)
// ---------------------------------------------------------------------------

/// A node row from the `nodes` table.
///
/// Carries no credential material; that lives in `node_credentials` and is
/// only joined in by the authentication guard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Node {
    pub id: DbId,
    pub name: String,
    pub node_type: String,
    pub capabilities: serde_json::Value,
    pub status_id: StatusId,
    pub current_run_id: Option<DbId>,
    pub last_heartbeat_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub registered_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A credential row from the `node_credentials` table.
///
/// Never serialized to API responses. The plaintext secret is not stored
/// anywhere; only its argon2id hash.
#[derive(Debug, Clone, FromRow)]
pub struct NodeCredential {
    pub id: DbId,
    pub node_id: DbId,
    pub public_id: String,
    pub secret_hash: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// DTO for registering a new node via `POST /admin/nodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNode {
    pub name: String,
    pub node_type: String,
    #[serde(default)]
    pub capabilities: NodeCapabilities,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for inserting a credential row at provisioning time.
#[derive(Debug)]
pub struct CreateNodeCredential {
    pub node_id: DbId,
    pub public_id: String,
    pub secret_hash: String,
}

// ---------------------------------------------------------------------------
// Outward views
// ---------------------------------------------------------------------------

/// Operator-facing node view with the derived fleet status attached.
///
/// Built from a [`Node`] row plus a derivation against the heartbeat
/// threshold; by construction it cannot contain credential fields.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: DbId,
    pub name: String,
    pub node_type: String,
    pub capabilities: serde_json::Value,
    pub current_run_id: Option<DbId>,
    pub last_heartbeat_at: Option<Timestamp>,
    pub derived_status: DerivedNodeStatus,
    pub minutes_since_heartbeat: Option<i64>,
    pub registered_at: Timestamp,
}

impl NodeView {
    /// Build a view from a node row, deriving the fleet status at `now`.
    pub fn from_node(node: Node, now: Timestamp, threshold_secs: i64) -> Self {
        let derived_status = seezee_core::fleet::derive_node_status(
            node.last_heartbeat_at,
            node.current_run_id,
            now,
            threshold_secs,
        );
        let minutes_since_heartbeat =
            seezee_core::fleet::minutes_since_heartbeat(node.last_heartbeat_at, now);

        Self {
            id: node.id,
            name: node.name,
            node_type: node.node_type,
            capabilities: node.capabilities,
            current_run_id: node.current_run_id,
            last_heartbeat_at: node.last_heartbeat_at,
            derived_status,
            minutes_since_heartbeat,
            registered_at: node.registered_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate DTOs
// ---------------------------------------------------------------------------

/// Aggregate fleet statistics over persisted columns.
///
/// Occupancy (`busy_nodes`) comes from the concurrency slot, not the
/// advisory status column; `silent_nodes` counts nodes whose heartbeat is
/// older than the threshold or missing entirely.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FleetStats {
    pub total_nodes: i64,
    pub busy_nodes: i64,
    pub silent_nodes: i64,
}
