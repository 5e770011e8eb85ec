//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod node_credential_repo;
pub mod node_repo;
pub mod request_repo;
pub mod role_repo;
pub mod run_log_repo;
pub mod run_repo;
pub mod session_repo;
pub mod user_repo;

pub use node_credential_repo::NodeCredentialRepo;
pub use node_repo::NodeRepo;
pub use request_repo::RequestRepo;
pub use role_repo::RoleRepo;
pub use run_log_repo::RunLogRepo;
pub use run_repo::{CompletionOutcome, RunArtifacts, RunRepo};
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
