//! Insert, increment, read, reset for `usage_ledger` rows.

use rusqlite::{params, Connection, OptionalExtension};

use encore_core::errors::StorageError;

use crate::sqe;

/// One usage-ledger row: the local consumption counter and the last count
/// the remote ledger has confirmed. `synced_consumed <= local_consumed` is
/// enforced by a CHECK constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub license_id: String,
    pub instance_id: String,
    pub local_consumed: u64,
    pub synced_consumed: u64,
}

impl LedgerEntry {
    /// The portion of local consumption not yet acknowledged remotely.
    pub fn pending_delta(&self) -> u64 {
        self.local_consumed - self.synced_consumed
    }
}

/// Increment `local_consumed` by exactly one, creating the row lazily on
/// first consumption. Returns the new local count.
pub fn increment_consumed(
    conn: &Connection,
    license_id: &str,
    instance_id: &str,
    now_rfc3339: &str,
) -> Result<u64, StorageError> {
    conn.execute(
        "INSERT INTO usage_ledger (license_id, instance_id, local_consumed, synced_consumed, updated_at)
         VALUES (?1, ?2, 1, 0, ?3)
         ON CONFLICT(license_id) DO UPDATE SET
             local_consumed = local_consumed + 1,
             updated_at = excluded.updated_at",
        params![license_id, instance_id, now_rfc3339],
    )
    .map_err(sqe)?;

    conn.query_row(
        "SELECT local_consumed FROM usage_ledger WHERE license_id = ?1",
        params![license_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(sqe)
}

/// Get a single ledger entry by license id.
pub fn get_entry(conn: &Connection, license_id: &str) -> Result<Option<LedgerEntry>, StorageError> {
    conn.query_row(
        "SELECT license_id, instance_id, local_consumed, synced_consumed
         FROM usage_ledger WHERE license_id = ?1",
        params![license_id],
        |row| {
            Ok(LedgerEntry {
                license_id: row.get(0)?,
                instance_id: row.get(1)?,
                local_consumed: row.get::<_, i64>(2)? as u64,
                synced_consumed: row.get::<_, i64>(3)? as u64,
            })
        },
    )
    .optional()
    .map_err(sqe)
}

/// Advance `synced_consumed` by the delta the remote ledger just confirmed.
/// Called only after a successful submission.
pub fn advance_synced(
    conn: &Connection,
    license_id: &str,
    delta: u64,
    now_rfc3339: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE usage_ledger SET
             synced_consumed = synced_consumed + ?2,
             updated_at = ?3
         WHERE license_id = ?1",
        params![license_id, delta as i64, now_rfc3339],
    )
    .map_err(sqe)?;
    Ok(())
}

/// Zero both counters. Administrative/testing reset only, never called from
/// the playback flow.
pub fn reset(conn: &Connection, license_id: &str, now_rfc3339: &str) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE usage_ledger SET
             local_consumed = 0,
             synced_consumed = 0,
             updated_at = ?2
         WHERE license_id = ?1",
        params![license_id, now_rfc3339],
    )
    .map_err(sqe)
}

pub fn count_entries(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM usage_ledger", [], |row| row.get(0))
        .map_err(sqe)
}
