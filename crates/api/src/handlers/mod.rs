//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod logs;
pub mod nodes;
pub mod requests;
pub mod runs;
