//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated portal user from a JWT
//!   Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`node_auth::AuthNode`] -- Extracts the authenticated worker node from a
//!   split-credential Bearer token.

pub mod auth;
pub mod node_auth;
pub mod rbac;
