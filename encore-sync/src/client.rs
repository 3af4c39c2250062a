//! The remote sync contract — the engine's only network-facing dependency.

use async_trait::async_trait;

use encore_core::errors::SyncError;

/// Confirmation from the remote ledger that a delta was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAck {
    /// The number of consumption units the remote ledger applied.
    pub accepted_delta: u64,
}

/// Submits consumption deltas to the authoritative remote ledger.
///
/// The call is specified as "add N consumption units", so re-sending an
/// unacknowledged delta after a crash is safe: the ledger only advances its
/// confirmed counter after an ack, never before. Transport (HTTP, signed
/// transaction) is the implementor's concern.
#[async_trait]
pub trait RemoteSyncClient: Send + Sync {
    async fn submit_consumption(
        &self,
        license_id: &str,
        instance_id: &str,
        delta: u64,
    ) -> Result<SyncAck, SyncError>;
}
