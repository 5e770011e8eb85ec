//! Dispatch naming conventions and input validation.
//!
//! Branch names are derived from the request id alone, so any component that
//! knows an id can reconstruct the branch without a lookup.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every dispatch-owned work branch.
pub const BRANCH_PREFIX: &str = "seezee/req-";

/// Placeholder branch value written in the first half of request creation,
/// replaced with the final name before the creating transaction commits.
pub const BRANCH_PLACEHOLDER: &str = "seezee/pending";

/// Storage ceiling for a single run log message, in characters.
pub const MAX_LOG_MESSAGE_CHARS: usize = 10_000;

/// Maximum length of a node name.
const MAX_NODE_NAME_LEN: usize = 128;

/// Maximum length of a node type label.
const MAX_NODE_TYPE_LEN: usize = 64;

/// Maximum length of a repository URL.
const MAX_REPO_URL_LEN: usize = 2048;

// ---------------------------------------------------------------------------
// Branch naming
// ---------------------------------------------------------------------------

/// Generate the work-branch name for an execution request.
///
/// Deterministic and globally unique because request ids are.
///
/// # Examples
///
/// ```
/// use seezee_core::dispatch::branch_name_for_request;
///
/// assert_eq!(branch_name_for_request(42), "seezee/req-42");
/// ```
pub fn branch_name_for_request(request_id: DbId) -> String {
    format!("{BRANCH_PREFIX}{request_id}")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a node name.
///
/// Rules:
/// - Must not be empty.
/// - Must not exceed `MAX_NODE_NAME_LEN` characters.
/// - Must contain only alphanumeric, hyphen, underscore, or dot characters.
pub fn validate_node_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Node name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NODE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Node name must not exceed {MAX_NODE_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CoreError::Validation(
            "Node name may only contain alphanumeric, hyphen, underscore, or dot characters"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate a node type label, same character rules as node names.
pub fn validate_node_type(node_type: &str) -> Result<(), CoreError> {
    if node_type.is_empty() {
        return Err(CoreError::Validation(
            "Node type must not be empty".to_string(),
        ));
    }
    if node_type.len() > MAX_NODE_TYPE_LEN {
        return Err(CoreError::Validation(format!(
            "Node type must not exceed {MAX_NODE_TYPE_LEN} characters"
        )));
    }
    if !node_type
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CoreError::Validation(
            "Node type may only contain alphanumeric, hyphen, underscore, or dot characters"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate an execution request task description.
pub fn validate_task(task: &str) -> Result<(), CoreError> {
    if task.trim().is_empty() {
        return Err(CoreError::Validation(
            "Task description must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate a repository URL.
///
/// Accepts https/http, ssh, and scp-style git URLs. The dispatch layer never
/// fetches the repository itself, so this is a shape check, not a liveness
/// check.
pub fn validate_repo_url(repo_url: &str) -> Result<(), CoreError> {
    if repo_url.trim().is_empty() {
        return Err(CoreError::Validation(
            "Repository URL must not be empty".to_string(),
        ));
    }
    if repo_url.len() > MAX_REPO_URL_LEN {
        return Err(CoreError::Validation(format!(
            "Repository URL must not exceed {MAX_REPO_URL_LEN} characters"
        )));
    }
    let well_formed = repo_url.starts_with("https://")
        || repo_url.starts_with("http://")
        || repo_url.starts_with("ssh://")
        || repo_url.starts_with("git@");
    if !well_formed {
        return Err(CoreError::Validation(
            "Repository URL must start with https://, http://, ssh://, or git@".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Log message truncation
// ---------------------------------------------------------------------------

/// Clamp a log message to [`MAX_LOG_MESSAGE_CHARS`] characters.
///
/// Returns the message to store and whether truncation happened. Counts
/// characters, not bytes, so multi-byte text is never split mid-character.
pub fn truncate_log_message(message: String) -> (String, bool) {
    if message.chars().count() <= MAX_LOG_MESSAGE_CHARS {
        return (message, false);
    }
    let clamped: String = message.chars().take(MAX_LOG_MESSAGE_CHARS).collect();
    (clamped, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
