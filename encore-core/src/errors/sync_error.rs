//! Remote-sync errors. Always recoverable: a failed submission leaves the
//! queue entry intact for the next drain.

use super::error_code::{self, EncoreErrorCode};

/// Errors from the remote sync client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    #[error("Network failure: {message}")]
    Network { message: String },

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Remote call timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

impl EncoreErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network { .. } => error_code::SYNC_NETWORK,
            Self::Server { .. } => error_code::SYNC_SERVER,
            Self::Timeout { .. } => error_code::SYNC_TIMEOUT,
        }
    }
}
