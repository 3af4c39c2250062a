//! `UsageLedger` — the engine's only mutable state.
//!
//! Every mutation is a single transaction committed durably before the call
//! returns. A crash between "play started" and the next action therefore
//! never loses a consumption event, and `synced_consumed` only advances
//! after the remote ledger has confirmed a submission.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use encore_core::errors::StorageError;

use crate::connection::LedgerDb;
use crate::queries::ledger_ops::{self, LedgerEntry};
use crate::queries::queue_ops::{self, QueueEntry};

/// The persisted usage ledger and pending-sync queue.
pub struct UsageLedger {
    db: LedgerDb,
}

impl UsageLedger {
    /// Open a file-backed ledger at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: LedgerDb::open(path)?,
        })
    }

    /// Open an in-memory ledger (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: LedgerDb::open_in_memory()?,
        })
    }

    /// Record one consumption event: increments `local_consumed` and merges
    /// `+1` into the sync queue in the same transaction. Returns the new
    /// local count.
    ///
    /// Contract: the caller invokes this at most once per play start. The
    /// ledger has no session concept and trusts that single call.
    pub fn record_consumption(
        &self,
        license_id: &str,
        instance_id: &str,
    ) -> Result<u64, StorageError> {
        let now = now_rfc3339();
        let count = self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(crate::sqe)?;
            let count = ledger_ops::increment_consumed(&tx, license_id, instance_id, &now)?;
            queue_ops::merge_delta(&tx, license_id, instance_id, 1, &now)?;
            tx.commit().map_err(crate::sqe)?;
            Ok(count)
        })?;
        debug!(license_id, local_consumed = count, "consumption recorded");
        Ok(count)
    }

    /// Zero both counters and drop the queue entry. Administrative reset
    /// only — never part of the playback flow.
    pub fn reset(&self, license_id: &str) -> Result<(), StorageError> {
        let now = now_rfc3339();
        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(crate::sqe)?;
            queue_ops::remove(&tx, license_id)?;
            ledger_ops::reset(&tx, license_id, &now)?;
            tx.commit().map_err(crate::sqe)?;
            Ok(())
        })?;
        info!(license_id, "ledger entry reset");
        Ok(())
    }

    /// The ledger entry for a license, if one exists.
    pub fn entry(&self, license_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
        self.db.with_conn(|conn| ledger_ops::get_entry(conn, license_id))
    }

    /// Locally recorded consumption count; zero for licenses never played.
    pub fn local_consumed(&self, license_id: &str) -> Result<u64, StorageError> {
        Ok(self
            .entry(license_id)?
            .map(|e| e.local_consumed)
            .unwrap_or(0))
    }

    /// Snapshot of queue entries with nonzero delta, in enqueue order.
    /// What a drain submits; later consumption waits for the next drain.
    pub fn pending_entries(&self, limit: usize) -> Result<Vec<QueueEntry>, StorageError> {
        self.db.with_conn(|conn| queue_ops::snapshot(conn, limit))
    }

    /// The queue entry for a license, if any delta is pending.
    pub fn queue_entry(&self, license_id: &str) -> Result<Option<QueueEntry>, StorageError> {
        self.db.with_conn(|conn| queue_ops::get(conn, license_id))
    }

    /// Commit a confirmed submission: advances `synced_consumed` by exactly
    /// the submitted delta and shrinks the queue entry, dropping it only if
    /// no consumption arrived while the submission was in flight.
    pub fn commit_sync_success(
        &self,
        license_id: &str,
        submitted_delta: u64,
    ) -> Result<(), StorageError> {
        let now = now_rfc3339();
        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(crate::sqe)?;
            ledger_ops::advance_synced(&tx, license_id, submitted_delta, &now)?;
            queue_ops::decrement(&tx, license_id, submitted_delta)?;
            tx.commit().map_err(crate::sqe)?;
            Ok(())
        })?;
        debug!(license_id, submitted_delta, "sync confirmed");
        Ok(())
    }

    /// Record a failed submission attempt. The pending delta is untouched
    /// and will be retried on the next drain.
    pub fn note_sync_attempt(&self, license_id: &str) -> Result<(), StorageError> {
        let now = now_rfc3339();
        self.db
            .with_conn(|conn| queue_ops::note_attempt(conn, license_id, &now))
    }

    /// Number of licenses with a ledger entry.
    pub fn entry_count(&self) -> Result<i64, StorageError> {
        self.db.with_conn(ledger_ops::count_entries)
    }

    /// Number of licenses with unsynced consumption.
    pub fn pending_count(&self) -> Result<i64, StorageError> {
        self.db.with_conn(queue_ops::count)
    }

    /// WAL checkpoint delegation.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
