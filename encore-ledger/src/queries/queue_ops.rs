//! Merge, snapshot, decrement, and retry bookkeeping for `sync_queue` rows.
//!
//! The queue is not an event log: one row per license, merged by id. A new
//! consumption before an earlier delta syncs grows the same row.

use rusqlite::{params, Connection, OptionalExtension};

use encore_core::errors::StorageError;

use crate::sqe;

/// One pending-sync queue row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub license_id: String,
    pub instance_id: String,
    pub pending_delta: u64,
    pub attempts: u32,
    pub last_attempt_at: Option<String>,
}

/// Add `delta` to the license's queue entry, inserting it if absent.
pub fn merge_delta(
    conn: &Connection,
    license_id: &str,
    instance_id: &str,
    delta: u64,
    now_rfc3339: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO sync_queue (license_id, instance_id, pending_delta, enqueued_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(license_id) DO UPDATE SET
             pending_delta = pending_delta + excluded.pending_delta",
        params![license_id, instance_id, delta as i64, now_rfc3339],
    )
    .map_err(sqe)?;
    Ok(())
}

/// Snapshot up to `limit` queue entries in enqueue order. The snapshot is
/// what a drain submits; entries added afterwards wait for the next drain.
pub fn snapshot(conn: &Connection, limit: usize) -> Result<Vec<QueueEntry>, StorageError> {
    let mut stmt = conn
        .prepare(
            "SELECT license_id, instance_id, pending_delta, attempts, last_attempt_at
             FROM sync_queue ORDER BY enqueued_at, license_id LIMIT ?1",
        )
        .map_err(sqe)?;

    let rows = stmt
        .query_map(params![limit.min(i64::MAX as usize) as i64], |row| {
            Ok(QueueEntry {
                license_id: row.get(0)?,
                instance_id: row.get(1)?,
                pending_delta: row.get::<_, i64>(2)? as u64,
                attempts: row.get(3)?,
                last_attempt_at: row.get(4)?,
            })
        })
        .map_err(sqe)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqe)?;

    Ok(rows)
}

/// Get a single queue entry.
pub fn get(conn: &Connection, license_id: &str) -> Result<Option<QueueEntry>, StorageError> {
    conn.query_row(
        "SELECT license_id, instance_id, pending_delta, attempts, last_attempt_at
         FROM sync_queue WHERE license_id = ?1",
        params![license_id],
        |row| {
            Ok(QueueEntry {
                license_id: row.get(0)?,
                instance_id: row.get(1)?,
                pending_delta: row.get::<_, i64>(2)? as u64,
                attempts: row.get(3)?,
                last_attempt_at: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(sqe)
}

/// Subtract a successfully submitted delta; drop the row once nothing is
/// pending. Consumption recorded while the submission was in flight keeps
/// the row alive with the residue.
pub fn decrement(conn: &Connection, license_id: &str, delta: u64) -> Result<(), StorageError> {
    // Delete-first: a row whose whole delta was submitted disappears, one
    // with in-flight residue is decremented to the positive remainder.
    conn.execute(
        "DELETE FROM sync_queue WHERE license_id = ?1 AND pending_delta <= ?2",
        params![license_id, delta as i64],
    )
    .map_err(sqe)?;
    conn.execute(
        "UPDATE sync_queue SET pending_delta = pending_delta - ?2
         WHERE license_id = ?1",
        params![license_id, delta as i64],
    )
    .map_err(sqe)?;
    Ok(())
}

/// Record a failed submission attempt. The delta itself stays untouched.
pub fn note_attempt(
    conn: &Connection,
    license_id: &str,
    now_rfc3339: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE sync_queue SET attempts = attempts + 1, last_attempt_at = ?2
         WHERE license_id = ?1",
        params![license_id, now_rfc3339],
    )
    .map_err(sqe)?;
    Ok(())
}

/// Remove a queue entry outright (used by reset).
pub fn remove(conn: &Connection, license_id: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM sync_queue WHERE license_id = ?1",
        params![license_id],
    )
    .map_err(sqe)?;
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))
        .map_err(sqe)
}
