//! Stable error codes for logs and caller-facing diagnostics.

/// Every Encore error maps to a stable machine-readable code.
pub trait EncoreErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_CORRUPT: &str = "DB_CORRUPT";

pub const SYNC_NETWORK: &str = "SYNC_NETWORK";
pub const SYNC_SERVER: &str = "SYNC_SERVER";
pub const SYNC_TIMEOUT: &str = "SYNC_TIMEOUT";

pub const UNKNOWN_LICENSE: &str = "UNKNOWN_LICENSE";
