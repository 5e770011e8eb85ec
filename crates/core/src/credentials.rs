//! Node credential issuance, parsing, and verification.
//!
//! A node credential is a split pair: a random `public_id` used for lookup
//! and a random `secret` of which only the argon2id hash is stored. The node
//! presents both halves joined by [`CREDENTIAL_SEPARATOR`] in a single
//! bearer string. This module lives in `core` (zero internal deps) so it can
//! be used by the API layer and any future provisioning tooling.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated public identifier (alphanumeric characters).
pub const PUBLIC_ID_LENGTH: usize = 16;

/// Length of the generated secret (alphanumeric characters).
pub const SECRET_LENGTH: usize = 48;

/// Separator between the public identifier and the secret in the presented
/// credential string.
pub const CREDENTIAL_SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// The result of issuing a new node credential.
#[derive(Debug)]
pub struct IssuedNodeCredential {
    /// Public lookup half, stored verbatim in the database.
    pub public_id: String,
    /// Plaintext secret half (surfaced to the administrator exactly once,
    /// never stored).
    pub secret: String,
    /// Argon2id PHC string of the secret (stored in the database).
    pub secret_hash: String,
}

impl IssuedNodeCredential {
    /// The combined credential string handed to the node operator.
    pub fn presented(&self) -> String {
        format!(
            "{}{}{}",
            self.public_id, CREDENTIAL_SEPARATOR, self.secret
        )
    }
}

/// Issue a new random node credential.
///
/// Returns the public id, the plaintext secret (shown once), and the argon2id
/// hash for storage. The plaintext secret must never be persisted.
pub fn issue_node_credential() -> Result<IssuedNodeCredential, CoreError> {
    let public_id = random_alphanumeric(PUBLIC_ID_LENGTH);
    let secret = random_alphanumeric(SECRET_LENGTH);
    let secret_hash = hash_node_secret(&secret)?;

    Ok(IssuedNodeCredential {
        public_id,
        secret,
        secret_hash,
    })
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Presented-credential parsing
// ---------------------------------------------------------------------------

/// Split a presented credential into its `(public_id, secret)` halves.
///
/// The string must contain [`CREDENTIAL_SEPARATOR`] with non-empty text on
/// both sides. Anything else is malformed. Only the first separator splits;
/// a stray separator beyond it lands in the secret half and simply fails
/// verification later.
pub fn split_presented(presented: &str) -> Result<(&str, &str), CoreError> {
    let (public_id, secret) = presented
        .split_once(CREDENTIAL_SEPARATOR)
        .ok_or_else(malformed)?;
    if public_id.is_empty() || secret.is_empty() {
        return Err(malformed());
    }
    Ok((public_id, secret))
}

fn malformed() -> CoreError {
    CoreError::Unauthorized("Malformed node credential".to_string())
}

// ---------------------------------------------------------------------------
// Hashing / verification
// ---------------------------------------------------------------------------

/// Hash a node secret using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt,
/// and hash).
pub fn hash_node_secret(secret: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("Failed to hash node secret: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a presented secret against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the secret matches, `Ok(false)` if it does not.
/// The underlying argon2 comparison is constant-time.
pub fn verify_node_secret(secret: &str, hash: &str) -> Result<bool, CoreError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CoreError::Internal(format!("Stored secret hash is invalid: {e}")))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!(
            "Failed to verify node secret: {e}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- Issuance ----------------------------------------------------------

    #[test]
    fn issued_public_id_has_correct_length() {
        let cred = issue_node_credential().unwrap();
        assert_eq!(cred.public_id.len(), PUBLIC_ID_LENGTH);
    }

    #[test]
    fn issued_secret_has_correct_length() {
        let cred = issue_node_credential().unwrap();
        assert_eq!(cred.secret.len(), SECRET_LENGTH);
    }

    #[test]
    fn issued_material_is_alphanumeric() {
        let cred = issue_node_credential().unwrap();
        assert!(cred.public_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(cred.secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn issued_hash_is_argon2id_phc() {
        let cred = issue_node_credential().unwrap();
        assert!(
            cred.secret_hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );
    }

    #[test]
    fn issued_secret_verifies_against_hash() {
        let cred = issue_node_credential().unwrap();
        let ok = verify_node_secret(&cred.secret, &cred.secret_hash).unwrap();
        assert!(ok, "issued secret should verify against its own hash");
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let cred = issue_node_credential().unwrap();
        let ok = verify_node_secret("not-the-secret", &cred.secret_hash).unwrap();
        assert!(!ok);
    }

    #[test]
    fn different_issues_produce_different_material() {
        let a = issue_node_credential().unwrap();
        let b = issue_node_credential().unwrap();
        assert_ne!(a.public_id, b.public_id);
        assert_ne!(a.secret, b.secret);
        assert_ne!(a.secret_hash, b.secret_hash);
    }

    // -- Presented-credential parsing --------------------------------------

    #[test]
    fn presented_joins_halves_with_separator() {
        let cred = issue_node_credential().unwrap();
        let presented = cred.presented();
        assert_eq!(
            presented,
            format!("{}.{}", cred.public_id, cred.secret)
        );
    }

    #[test]
    fn split_round_trips_presented_credential() {
        let cred = issue_node_credential().unwrap();
        let presented = cred.presented();
        let (public_id, secret) = split_presented(&presented).unwrap();
        assert_eq!(public_id, cred.public_id);
        assert_eq!(secret, cred.secret);
    }

    #[test]
    fn split_rejects_missing_separator() {
        assert_matches!(
            split_presented("justonestring"),
            Err(CoreError::Unauthorized(_))
        );
    }

    #[test]
    fn split_rejects_empty_public_id() {
        assert_matches!(split_presented(".secret"), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn split_rejects_empty_secret() {
        assert_matches!(split_presented("public."), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn split_uses_first_separator() {
        let (public_id, secret) = split_presented("abc.def.ghi").unwrap();
        assert_eq!(public_id, "abc");
        assert_eq!(secret, "def.ghi");
    }

    // -- Verification ------------------------------------------------------

    #[test]
    fn garbage_stored_hash_is_an_internal_error() {
        assert_matches!(
            verify_node_secret("anything", "not-a-phc-string"),
            Err(CoreError::Internal(_))
        );
    }
}
