//! # encore-ledger
//!
//! SQLite persistence layer for the Encore license engine: the per-license
//! usage ledger and the durable pending-sync queue. Single write connection,
//! WAL mode, `synchronous=FULL` — every acknowledged mutation is on disk.

pub mod connection;
pub mod ledger;
pub mod migrations;
pub mod queries;

pub use connection::LedgerDb;
pub use ledger::UsageLedger;
pub use queries::ledger_ops::LedgerEntry;
pub use queries::queue_ops::QueueEntry;

use encore_core::errors::StorageError;

/// Helper to convert an rusqlite error into a `StorageError`.
pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}
