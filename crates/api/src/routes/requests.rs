//! Route definitions for execution requests.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Admin routes mounted at `/admin/requests`.
///
/// ```text
/// GET   /       -> list_requests
/// POST  /       -> create_request
/// GET   /{id}   -> get_request
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/{id}", get(requests::get_request))
}

/// Agent routes merged into `/agent`.
///
/// ```text
/// POST /requests/{id}/claim -> claim_request
/// ```
pub fn agent_router() -> Router<AppState> {
    Router::new().route("/requests/{id}/claim", post(requests::claim_request))
}
