//! Durable sled-backed firing store
//!
//! Three trees: firing logs keyed by timestamp as big-endian millis (sorts
//! chronologically), active firings keyed by id, and a meta tree holding the
//! latest calibration. Writes rely on sled's background flushing; on crash
//! at most the last few writes may be lost, which this system tolerates
//! because calibration is recomputed from the full log set on demand.

use std::path::Path;
use std::sync::Arc;

use crate::types::{ActiveFiring, CalibrationResult, FiringLog};

use super::{FiringStore, StoreError};

const LOGS_TREE: &str = "firing_logs";
const ACTIVE_TREE: &str = "active_firings";
const META_TREE: &str = "meta";

const CALIBRATION_KEY: &[u8] = b"calibration";

/// Sled-backed `FiringStore` backend
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
    logs: sled::Tree,
    active: sled::Tree,
    meta: sled::Tree,
}

impl SledStore {
    /// Open or create the store at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let logs = db.open_tree(LOGS_TREE)?;
        let active = db.open_tree(ACTIVE_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self {
            db: Arc::new(db),
            logs,
            active,
            meta,
        })
    }

    /// Total number of stored firing logs
    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    /// Flush all trees to disk (normally unnecessary; sled flushes in the
    /// background)
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Log key: completion timestamp as big-endian millis, so the tree
    /// iterates oldest-first.
    fn log_key(log: &FiringLog) -> [u8; 8] {
        log.timestamp.timestamp_millis().to_be_bytes()
    }
}

impl FiringStore for SledStore {
    fn all_logs(&self) -> Result<Vec<FiringLog>, StoreError> {
        let mut logs = Vec::with_capacity(self.logs.len());
        for item in self.logs.iter() {
            let (_key, value) = item?;
            logs.push(serde_json::from_slice::<FiringLog>(&value)?);
        }
        Ok(logs)
    }

    fn append_log(&self, log: &FiringLog) -> Result<(), StoreError> {
        let value = serde_json::to_vec(log)?;
        self.logs.insert(Self::log_key(log), value)?;
        Ok(())
    }

    fn calibration(&self) -> Result<Option<CalibrationResult>, StoreError> {
        match self.meta.get(CALIBRATION_KEY)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn save_calibration(&self, calibration: &CalibrationResult) -> Result<(), StoreError> {
        let value = serde_json::to_vec(calibration)?;
        self.meta.insert(CALIBRATION_KEY, value)?;
        Ok(())
    }

    fn active_firing(&self, id: &str) -> Result<Option<ActiveFiring>, StoreError> {
        match self.active.get(id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn set_active_firing(&self, firing: &ActiveFiring) -> Result<(), StoreError> {
        let value = serde_json::to_vec(firing)?;
        self.active.insert(firing.id.as_bytes(), value)?;
        Ok(())
    }

    fn clear_active_firing(&self, id: &str) -> Result<(), StoreError> {
        self.active.remove(id.as_bytes())?;
        Ok(())
    }

    fn update_watermark(&self, id: &str, expected: u8, new: u8) -> Result<bool, StoreError> {
        let Some(old_bytes) = self.active.get(id.as_bytes())? else {
            return Err(StoreError::FiringNotFound(id.to_string()));
        };

        let mut firing: ActiveFiring = serde_json::from_slice(&old_bytes)?;
        if firing.watermark != expected {
            return Ok(false);
        }
        firing.watermark = new;
        let new_bytes = serde_json::to_vec(&firing)?;

        // Conditional write: if any other poller changed the record between
        // our read and here, the swap fails and their notification stands.
        match self
            .active
            .compare_and_swap(id.as_bytes(), Some(old_bytes), Some(new_bytes))?
        {
            Ok(()) => Ok(true),
            Err(_cas) => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}
