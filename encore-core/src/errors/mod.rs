//! Error taxonomy for the Encore engine.

pub mod engine_error;
pub mod error_code;
pub mod storage_error;
pub mod sync_error;

pub use engine_error::EngineError;
pub use error_code::EncoreErrorCode;
pub use storage_error::StorageError;
pub use sync_error::SyncError;
