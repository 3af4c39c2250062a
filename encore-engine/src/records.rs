//! Read-only license record snapshots, keyed by license id.
//!
//! Records come from the external fetch collaborator (the marketplace
//! indexer); the engine never refetches on its own and never writes back.

use std::collections::HashMap;
use std::sync::RwLock;

use encore_core::license::LicenseRecord;

/// Snapshot cache of license records, refreshed at the caller's discretion.
#[derive(Default)]
pub struct RecordStore {
    records: RwLock<HashMap<String, LicenseRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot with freshly fetched records.
    pub fn refresh(&self, records: Vec<LicenseRecord>) {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        *self.records.write().unwrap() = map;
    }

    /// Insert or replace a single record.
    pub fn upsert(&self, record: LicenseRecord) {
        self.records
            .write()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    /// Clone of the record for a license id, if known.
    pub fn get(&self, license_id: &str) -> Option<LicenseRecord> {
        self.records.read().unwrap().get(license_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}
