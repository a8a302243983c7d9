// src/auth.rs
//! Shared-secret gate for the import trigger.

use sha2::{Digest, Sha256};

use crate::error::ImportError;

pub const ENV_IMPORT_KEY: &str = "IMPORT_KEY";

/// Check `provided` against the configured import key.
///
/// An unset (or empty) configured key is a configuration error, not an
/// authorization failure. Keys are compared by SHA-256 digest so the
/// comparison length does not depend on the input.
pub fn authorize(configured: Option<&str>, provided: Option<&str>) -> Result<(), ImportError> {
    let expected = configured
        .filter(|k| !k.is_empty())
        .ok_or(ImportError::Configuration(ENV_IMPORT_KEY))?;
    let given = provided.ok_or(ImportError::Unauthorized)?;

    if Sha256::digest(expected.as_bytes()) == Sha256::digest(given.as_bytes()) {
        Ok(())
    } else {
        Err(ImportError::Unauthorized)
    }
}
