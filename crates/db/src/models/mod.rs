//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for the write paths
//! - Outward-facing view structs where the row carries fields that must
//!   never reach a response payload

pub mod node;
pub mod request;
pub mod role;
pub mod run;
pub mod run_log;
pub mod session;
pub mod status;
pub mod user;
