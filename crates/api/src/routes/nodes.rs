//! Route definitions for workflow node management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::nodes;
use crate::state::AppState;

/// Admin routes mounted at `/admin/nodes`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET   /        -> list_nodes
/// POST  /        -> register_node
/// GET   /stats   -> fleet_stats
/// GET   /{id}    -> get_node
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(nodes::list_nodes).post(nodes::register_node))
        .route("/stats", get(nodes::fleet_stats))
        .route("/{id}", get(nodes::get_node))
}

/// Agent routes merged into `/agent`.
///
/// Authentication is per-node via the split credential (enforced by the
/// `AuthNode` extractor).
///
/// ```text
/// POST /heartbeat -> heartbeat
/// ```
pub fn agent_router() -> Router<AppState> {
    Router::new().route("/heartbeat", post(nodes::heartbeat))
}
