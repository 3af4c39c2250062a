//! # encore-sync
//!
//! The sync queue drain & retry manager: submits unsynced consumption
//! deltas to the remote ledger through the `RemoteSyncClient` contract and
//! reconciles confirmations back into the usage ledger. Failures never
//! touch the playback path; they leave the queue entry in place for the
//! next externally triggered drain.

pub mod client;
pub mod manager;
pub mod report;

pub use client::{RemoteSyncClient, SyncAck};
pub use manager::SyncManager;
pub use report::SyncReport;
