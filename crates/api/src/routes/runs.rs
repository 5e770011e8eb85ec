//! Route definitions for execution runs and their logs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{logs, runs};
use crate::state::AppState;

/// Admin routes mounted at `/admin/runs`.
///
/// ```text
/// GET   /            -> list_runs
/// GET   /{id}        -> get_run
/// GET   /{id}/logs   -> list_run_logs
/// POST  /{id}/logs   -> append_admin_log
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(runs::list_runs))
        .route("/{id}", get(runs::get_run))
        .route(
            "/{id}/logs",
            get(logs::list_run_logs).post(logs::append_admin_log),
        )
}

/// Agent routes merged into `/agent`.
///
/// ```text
/// POST /runs/{id}/complete -> complete_run
/// POST /runs/{id}/logs     -> append_node_log
/// ```
pub fn agent_router() -> Router<AppState> {
    Router::new()
        .route("/runs/{id}/complete", post(runs::complete_run))
        .route("/runs/{id}/logs", post(logs::append_node_log))
}
