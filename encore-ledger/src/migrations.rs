//! Migration runner — version tracking, forward-only, transactional per
//! migration.

use rusqlite::Connection;
use tracing::{debug, info};

use encore_core::errors::StorageError;

use crate::sqe;

/// Total number of migrations.
pub const LATEST_VERSION: u32 = 1;

type MigrationFn = fn(&Connection) -> Result<(), StorageError>;

const MIGRATIONS: [(u32, &str, MigrationFn); 1] = [(1, "ledger_schema", v001_ledger_schema)];

/// Get the current schema version. Returns 0 if the `schema_version` table
/// doesn't exist yet.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(sqe)?;

    if !exists {
        return Ok(0);
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(sqe)
}

/// Run all pending migrations. Forward-only, each wrapped in a transaction.
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<u32, StorageError> {
    let current = current_version(conn)?;
    if current >= LATEST_VERSION {
        debug!("ledger schema is up to date (v{current})");
        return Ok(0);
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .map_err(sqe)?;

    let mut applied = 0;
    for (version, name, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        let tx = conn.unchecked_transaction().map_err(sqe)?;
        migrate(&tx).map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            rusqlite::params![version, name],
        )
        .map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })?;
        tx.commit().map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })?;
        info!(version, name, "applied ledger migration");
        applied += 1;
    }

    Ok(applied)
}

/// v001: the usage ledger and the pending-sync queue.
///
/// `sync_queue.pending_delta` is derivable from the ledger counters but is
/// kept as an explicit table for processing order and retry bookkeeping.
fn v001_ledger_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE usage_ledger (
            license_id      TEXT PRIMARY KEY,
            instance_id     TEXT NOT NULL,
            local_consumed  INTEGER NOT NULL DEFAULT 0
                            CHECK (local_consumed >= 0),
            synced_consumed INTEGER NOT NULL DEFAULT 0
                            CHECK (synced_consumed >= 0
                                   AND synced_consumed <= local_consumed),
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE sync_queue (
            license_id      TEXT PRIMARY KEY
                            REFERENCES usage_ledger(license_id) ON DELETE CASCADE,
            instance_id     TEXT NOT NULL,
            pending_delta   INTEGER NOT NULL CHECK (pending_delta > 0),
            enqueued_at     TEXT NOT NULL,
            attempts        INTEGER NOT NULL DEFAULT 0,
            last_attempt_at TEXT
        );

        CREATE INDEX idx_sync_queue_enqueued ON sync_queue(enqueued_at);",
    )
    .map_err(sqe)
}
