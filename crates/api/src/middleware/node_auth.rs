//! Split-credential authentication extractor for worker nodes.
//!
//! Agent endpoints authenticate with a bearer credential of the form
//! `<public_id>.<secret>`. The public half selects the credential row; the
//! secret half is verified against the stored argon2id hash. A failed
//! attempt has no side effects on node state and never reveals whether the
//! public id exists.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use seezee_core::credentials::{split_presented, verify_node_secret};
use seezee_core::error::CoreError;
use seezee_db::models::node::Node;
use seezee_db::repositories::{NodeCredentialRepo, NodeRepo};

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated worker node extracted from a split-credential Bearer token.
///
/// ```ignore
/// async fn heartbeat(AuthNode(node): AuthNode) -> AppResult<Json<()>> {
///     tracing::debug!(node_id = node.id, "heartbeat");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthNode(pub Node);

fn invalid_credential() -> AppError {
    // Same message for unknown public id and wrong secret.
    AppError::Core(CoreError::Unauthorized("Invalid node credential".into()))
}

impl FromRequestParts<AppState> for AuthNode {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let presented = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <credential>".into(),
            ))
        })?;

        // Rejects with "Malformed node credential" before any lookup.
        let (public_id, secret) = split_presented(presented)?;

        let credential = NodeCredentialRepo::find_by_public_id(&state.pool, public_id)
            .await?
            .ok_or_else(invalid_credential)?;

        if !verify_node_secret(secret, &credential.secret_hash)? {
            return Err(invalid_credential());
        }

        // The FK guarantees the node row exists; a miss here means the fleet
        // was mutated out from under us, which still reads as a bad credential.
        let node = NodeRepo::find_by_public_id(&state.pool, public_id)
            .await?
            .ok_or_else(invalid_credential)?;

        Ok(AuthNode(node))
    }
}
