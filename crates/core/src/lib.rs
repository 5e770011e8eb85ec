//! Domain logic for the SeeZee workflow-node dispatch layer.
//!
//! This crate has zero internal dependencies so the API layer, repositories,
//! and any future CLI tooling can all share it.

pub mod capabilities;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod roles;
pub mod types;

pub use error::CoreError;
