//! `SyncManager` — drains the pending-sync queue through the remote client.
//!
//! A drain snapshots the queue from durable ledger state, performs all
//! network I/O without holding the ledger lock, then commits each
//! confirmation individually. Entries are independent: one license's
//! failure neither blocks nor rolls back another's success.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use encore_core::config::SyncConfig;
use encore_core::errors::{EncoreErrorCode, StorageError, SyncError};
use encore_ledger::UsageLedger;

use crate::client::RemoteSyncClient;
use crate::report::SyncReport;

pub struct SyncManager {
    ledger: Arc<UsageLedger>,
    client: Arc<dyn RemoteSyncClient>,
    config: SyncConfig,
    // Held for the duration of a drain; overlapping calls coalesce.
    drain_gate: Mutex<()>,
}

impl SyncManager {
    pub fn new(
        ledger: Arc<UsageLedger>,
        client: Arc<dyn RemoteSyncClient>,
        config: SyncConfig,
    ) -> Self {
        Self {
            ledger,
            client,
            config,
            drain_gate: Mutex::new(()),
        }
    }

    /// One attempt to flush all pending deltas to the remote ledger.
    ///
    /// Safe to call at any time; a call arriving while a drain is already
    /// running returns a `skipped` report instead of starting a second one.
    /// Sync errors are logged and counted, never propagated — only storage
    /// failures surface to the caller.
    pub async fn drain(&self) -> Result<SyncReport, StorageError> {
        let Ok(_gate) = self.drain_gate.try_lock() else {
            debug!("drain already in flight, coalescing");
            return Ok(SyncReport::skipped());
        };

        let snapshot = self
            .ledger
            .pending_entries(self.config.effective_max_entries_per_drain())?;
        if snapshot.is_empty() {
            debug!("nothing pending, drain is a no-op");
            return Ok(SyncReport::default());
        }

        let timeout = Duration::from_millis(self.config.effective_request_timeout_ms());
        let mut report = SyncReport::default();

        for entry in snapshot {
            report.attempted += 1;

            let outcome = match tokio::time::timeout(
                timeout,
                self.client.submit_consumption(
                    &entry.license_id,
                    &entry.instance_id,
                    entry.pending_delta,
                ),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(SyncError::Timeout {
                    elapsed_ms: timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(ack) => {
                    self.ledger
                        .commit_sync_success(&entry.license_id, entry.pending_delta)?;
                    report.succeeded += 1;
                    report.submitted_units += entry.pending_delta;
                    debug!(
                        license_id = %entry.license_id,
                        delta = entry.pending_delta,
                        accepted = ack.accepted_delta,
                        "consumption delta confirmed"
                    );
                }
                Err(e) => {
                    // Entry stays queued untouched; retried next drain.
                    self.ledger.note_sync_attempt(&entry.license_id)?;
                    report.failed += 1;
                    warn!(
                        license_id = %entry.license_id,
                        delta = entry.pending_delta,
                        code = e.error_code(),
                        error = %e,
                        "consumption submission failed, entry retained"
                    );
                }
            }
        }

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            units = report.submitted_units,
            "drain complete"
        );
        Ok(report)
    }
}
