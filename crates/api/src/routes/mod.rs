pub mod auth;
pub mod health;
pub mod nodes;
pub mod requests;
pub mod runs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires auth)
///
/// /admin/nodes                     list, register (admin only)
/// /admin/nodes/stats               fleet statistics
/// /admin/nodes/{id}                get
/// /admin/requests                  list, create
/// /admin/requests/{id}             get
/// /admin/runs                      list
/// /admin/runs/{id}                 get
/// /admin/runs/{id}/logs            list, append annotation
///
/// /agent/heartbeat                 heartbeat (node credential)
/// /agent/requests/{id}/claim       claim request
/// /agent/runs/{id}/complete        report completion
/// /agent/runs/{id}/logs            append log
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Admin fleet and dispatch management.
        .nest("/admin/nodes", nodes::admin_router())
        .nest("/admin/requests", requests::admin_router())
        .nest("/admin/runs", runs::admin_router())
        // Agent surface (node credential auth).
        .nest("/agent", agent_routes())
}

/// Build the `/agent` subtree. All routes authenticate with a node's split
/// credential via the `AuthNode` extractor.
fn agent_routes() -> Router<AppState> {
    Router::new()
        .merge(nodes::agent_router())
        .merge(requests::agent_router())
        .merge(runs::agent_router())
}
