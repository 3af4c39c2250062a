//! Storage-layer errors for the SQLite-backed ledger.

use super::error_code::{self, EncoreErrorCode};

/// Errors that can occur in the ledger storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Ledger database corrupt: {details}")]
    Corrupt { details: String },
}

impl EncoreErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::Corrupt { .. } => error_code::DB_CORRUPT,
        }
    }
}
