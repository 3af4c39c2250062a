//! `LicenseEngine` — central orchestrator.
//!
//! Permission evaluation is fully synchronous and local; it is never
//! blocked by sync activity. The only async surface is `trigger_sync`.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use encore_core::access::AccessState;
use encore_core::config::SyncConfig;
use encore_core::errors::{EngineError, StorageError};
use encore_core::evaluator::{self, PlaybackPermission};
use encore_core::license::LicenseRecord;
use encore_ledger::UsageLedger;
use encore_sync::{RemoteSyncClient, SyncManager, SyncReport};

use crate::records::RecordStore;

pub struct LicenseEngine {
    records: RecordStore,
    ledger: Arc<UsageLedger>,
    sync: SyncManager,
}

impl LicenseEngine {
    /// Open a file-backed engine at the given ledger path.
    pub fn open(
        ledger_path: &Path,
        client: Arc<dyn RemoteSyncClient>,
        config: SyncConfig,
    ) -> Result<Self, StorageError> {
        let ledger = Arc::new(UsageLedger::open(ledger_path)?);
        Ok(Self::with_ledger(ledger, client, config))
    }

    /// Open an engine over an in-memory ledger (for testing).
    pub fn open_in_memory(
        client: Arc<dyn RemoteSyncClient>,
        config: SyncConfig,
    ) -> Result<Self, StorageError> {
        let ledger = Arc::new(UsageLedger::open_in_memory()?);
        Ok(Self::with_ledger(ledger, client, config))
    }

    fn with_ledger(
        ledger: Arc<UsageLedger>,
        client: Arc<dyn RemoteSyncClient>,
        config: SyncConfig,
    ) -> Self {
        let sync = SyncManager::new(ledger.clone(), client, config);
        Self {
            records: RecordStore::new(),
            ledger,
            sync,
        }
    }

    /// Replace the license record snapshot with freshly fetched records.
    pub fn refresh_records(&self, records: Vec<LicenseRecord>) {
        debug!(count = records.len(), "license records refreshed");
        self.records.refresh(records);
    }

    /// Insert or replace a single license record.
    pub fn upsert_record(&self, record: LicenseRecord) {
        self.records.upsert(record);
    }

    fn record(&self, license_id: &str) -> Result<LicenseRecord, EngineError> {
        self.records
            .get(license_id)
            .ok_or_else(|| EngineError::UnknownLicense {
                license_id: license_id.to_string(),
            })
    }

    /// Evaluate whether playback may start right now.
    pub fn evaluate_playback(&self, license_id: &str) -> Result<PlaybackPermission, EngineError> {
        let record = self.record(license_id)?;
        let consumed = self.ledger.local_consumed(license_id)?;
        Ok(evaluator::evaluate_playback(&record, consumed, Utc::now()))
    }

    /// Whether download is allowed right now.
    pub fn can_download(&self, license_id: &str) -> Result<bool, EngineError> {
        Ok(evaluator::can_download(&self.record(license_id)?, Utc::now()))
    }

    /// Whether resale is allowed right now.
    pub fn can_resell(&self, license_id: &str) -> Result<bool, EngineError> {
        Ok(evaluator::can_resell(&self.record(license_id)?, Utc::now()))
    }

    /// Derived access classification for UI and gating.
    pub fn access_state(&self, license_id: &str) -> Result<AccessState, EngineError> {
        let record = self.record(license_id)?;
        let consumed = self.ledger.local_consumed(license_id)?;
        Ok(evaluator::access_state(&record, consumed, Utc::now()))
    }

    /// Remaining plays after subtracting local unsynced consumption.
    /// `UNLIMITED_PLAYS` for types without a play allowance.
    pub fn effective_remaining_plays(&self, license_id: &str) -> Result<u32, EngineError> {
        let record = self.record(license_id)?;
        let consumed = self.ledger.local_consumed(license_id)?;
        Ok(evaluator::effective_remaining_plays(&record, consumed))
    }

    /// Record one consumption event. Call exactly once per successful play
    /// start; the ledger trusts that contract.
    pub fn record_consumption(&self, license_id: &str) -> Result<u64, EngineError> {
        let record = self.record(license_id)?;
        Ok(self
            .ledger
            .record_consumption(license_id, &record.instance_id)?)
    }

    /// Administrative reset of a license's counters.
    pub fn reset(&self, license_id: &str) -> Result<(), EngineError> {
        Ok(self.ledger.reset(license_id)?)
    }

    /// Flush all pending consumption deltas to the remote ledger. Safe to
    /// call at any time; overlapping calls coalesce into one drain.
    pub async fn trigger_sync(&self) -> Result<SyncReport, EngineError> {
        Ok(self.sync.drain().await?)
    }

    /// The underlying usage ledger.
    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }
}
