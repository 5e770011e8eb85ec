//! Well-known role name constants.
//!
//! These must match the seed data in `20260821000001_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OPERATOR: &str = "operator";
