//! # encore-engine
//!
//! The caller-facing license engine: answers "is this action allowed right
//! now" for playback, download, and resale, records consumption into the
//! durable ledger, and reconciles unsynced consumption against the remote
//! ledger on demand.

pub mod engine;
pub mod records;

pub use engine::LicenseEngine;
pub use records::RecordStore;
