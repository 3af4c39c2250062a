//! # encore-core
//!
//! Foundation crate for the Encore license engine.
//! Defines the license data model, the access-control table, the
//! access-state machine, the pure permission evaluator, errors, and config.
//! Every other crate in the workspace depends on this.

pub mod access;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod license;
pub mod tracing;

// Re-export the most commonly used types at the crate root.
pub use access::{AccessState, Capabilities, DownloadFormat};
pub use config::SyncConfig;
pub use errors::{EncoreErrorCode, EngineError, StorageError, SyncError};
pub use evaluator::{PlaybackPermission, UNLIMITED_PLAYS};
pub use license::{LicenseRecord, LicenseType};
