//! FiringStore trait — pluggable persistence backend
//!
//! Abstracts firing-log, calibration, and active-firing persistence so
//! backends can be swapped without touching core logic:
//! - `MemoryStore`: in-memory store for tests and minimal deployments
//! - `SledStore`: durable local store (big-endian timestamp keys give
//!   chronological log iteration)
//!
//! All operations are assumed eventually consistent; calibration tolerates
//! stale reads by recomputing from whatever log set it is handed. The one
//! operation with stronger semantics is `update_watermark`, a compare-and-set
//! so that independent pollers of the same firing record neither duplicate
//! nor drop milestone notifications.

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use crate::types::{ActiveFiring, CalibrationResult, FiringLog};

/// Trait for pluggable persistence backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across async tasks.
pub trait FiringStore: Send + Sync {
    /// All firing logs, oldest first
    fn all_logs(&self) -> Result<Vec<FiringLog>, StoreError>;

    /// Append one firing log (logs are append-only, never mutated)
    fn append_log(&self, log: &FiringLog) -> Result<(), StoreError>;

    /// Latest saved calibration, if any
    fn calibration(&self) -> Result<Option<CalibrationResult>, StoreError>;

    /// Save the latest calibration (supersedes the previous one)
    fn save_calibration(&self, calibration: &CalibrationResult) -> Result<(), StoreError>;

    /// Active firing record by id, if present
    fn active_firing(&self, id: &str) -> Result<Option<ActiveFiring>, StoreError>;

    /// Create or replace an active firing record
    fn set_active_firing(&self, firing: &ActiveFiring) -> Result<(), StoreError>;

    /// Remove an active firing record (no-op when absent)
    fn clear_active_firing(&self, id: &str) -> Result<(), StoreError>;

    /// Compare-and-set the notification watermark.
    ///
    /// Returns `Ok(true)` when the stored watermark equaled `expected` and
    /// was advanced to `new`; `Ok(false)` when another writer got there
    /// first. Errors when no such firing exists.
    fn update_watermark(&self, id: &str, expected: u8, new: u8) -> Result<bool, StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("active firing not found: {0}")]
    FiringNotFound(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
