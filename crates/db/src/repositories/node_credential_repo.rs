//! Repository for the `node_credentials` table.
//!
//! Rows are write-once: inserted at provisioning and never updated. The
//! table holds only the public id and the argon2id hash of the secret; the
//! plaintext is surfaced to the administrator once and discarded.

use sqlx::PgPool;

use crate::models::node::{CreateNodeCredential, NodeCredential};

/// Column list for `node_credentials` queries.
const COLUMNS: &str = "id, node_id, public_id, secret_hash, created_at";

/// Provides write-once storage for node credentials.
pub struct NodeCredentialRepo;

impl NodeCredentialRepo {
    /// Insert a credential row for a freshly provisioned node.
    ///
    /// Fails on the unique node_id constraint if the node already has a
    /// credential; credentials are never rotated in place.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNodeCredential,
    ) -> Result<NodeCredential, sqlx::Error> {
        let query = format!(
            "INSERT INTO node_credentials (node_id, public_id, secret_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NodeCredential>(&query)
            .bind(input.node_id)
            .bind(&input.public_id)
            .bind(&input.secret_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a credential by its public lookup half.
    pub async fn find_by_public_id(
        pool: &PgPool,
        public_id: &str,
    ) -> Result<Option<NodeCredential>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM node_credentials WHERE public_id = $1");
        sqlx::query_as::<_, NodeCredential>(&query)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }
}
