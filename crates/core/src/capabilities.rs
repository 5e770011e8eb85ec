//! Typed node capability flags.
//!
//! Capabilities are a fixed set of booleans rather than an open string map,
//! so a typo like `"biuld": true` is rejected at the boundary instead of
//! silently matching nothing.

use serde::{Deserialize, Serialize};

/// What a workflow node is able to do.
///
/// Stored in the `nodes.capabilities` JSONB column. Missing keys default to
/// `false`; unknown keys are a deserialization error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeCapabilities {
    /// Can clone repositories and push branches.
    pub git: bool,
    /// Can run project builds.
    pub build: bool,
    /// Can execute test suites.
    pub test: bool,
    /// Can drive AI-assisted code changes.
    pub ai: bool,
}

impl NodeCapabilities {
    /// True when the node has no capabilities at all.
    pub fn is_empty(&self) -> bool {
        !(self.git || self.build || self.test || self.ai)
    }
}
