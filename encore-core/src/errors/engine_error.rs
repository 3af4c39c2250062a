//! Caller-facing engine errors.
//!
//! A missing record is surfaced as a typed failure, never silently treated
//! as "denied" or "allowed" — it indicates a caller bug or stale cache, not
//! a transient condition, and is not retried.

use super::error_code::{self, EncoreErrorCode};
use super::storage_error::StorageError;

/// Errors surfaced by the engine facade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No license record for id {license_id}")]
    UnknownLicense { license_id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EncoreErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownLicense { .. } => error_code::UNKNOWN_LICENSE,
            Self::Storage(e) => e.error_code(),
        }
    }
}
