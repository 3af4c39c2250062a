//! `LedgerDb` — the single owner of the ledger's SQLite connection.
//!
//! The ledger is a single-writer store: all reads and writes go through one
//! mutex-guarded connection, so `local_consumed` and `synced_consumed` can
//! never be observed mid-mutation. No code outside this crate should touch
//! a raw `&Connection`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use encore_core::errors::StorageError;

use crate::migrations;
use crate::sqe;

/// Mutex-guarded SQLite connection with durable-write pragmas applied.
pub struct LedgerDb {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl LedgerDb {
    /// Open a file-backed ledger database. Applies pragmas and runs
    /// migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sqe)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory ledger database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqe)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StorageError> {
        apply_pragmas(&conn)?;
        let applied = migrations::run_migrations(&conn)?;
        if applied > 0 {
            debug!(applied, "ledger migrations applied");
        }
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Run a closure against the guarded connection. The closure may open
    /// its own transaction via `unchecked_transaction`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// WAL checkpoint (TRUNCATE).
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(sqe)
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// WAL for concurrent-reader friendliness, `synchronous=FULL` so a commit
/// is durable before `record_consumption` returns. Losing a consumption
/// event would let a license be replayed for free.
fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = FULL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(sqe)
}
