//! In-memory persistence for tests and minimal deployments
//!
//! Thread-safe via `RwLock`. Not durable — data lost on restart.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{ActiveFiring, CalibrationResult, FiringLog};

use super::{FiringStore, StoreError};

/// In-memory `FiringStore` backend
pub struct MemoryStore {
    logs: RwLock<Vec<FiringLog>>,
    calibration: RwLock<Option<CalibrationResult>>,
    active: RwLock<HashMap<String, ActiveFiring>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
            calibration: RwLock::new(None),
            active: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FiringStore for MemoryStore {
    fn all_logs(&self) -> Result<Vec<FiringLog>, StoreError> {
        let mut logs = self
            .logs
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .clone();
        logs.sort_by_key(|log| log.timestamp);
        Ok(logs)
    }

    fn append_log(&self, log: &FiringLog) -> Result<(), StoreError> {
        self.logs
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .push(log.clone());
        Ok(())
    }

    fn calibration(&self) -> Result<Option<CalibrationResult>, StoreError> {
        Ok(self
            .calibration
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .clone())
    }

    fn save_calibration(&self, calibration: &CalibrationResult) -> Result<(), StoreError> {
        *self
            .calibration
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))? = Some(calibration.clone());
        Ok(())
    }

    fn active_firing(&self, id: &str) -> Result<Option<ActiveFiring>, StoreError> {
        Ok(self
            .active
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .get(id)
            .cloned())
    }

    fn set_active_firing(&self, firing: &ActiveFiring) -> Result<(), StoreError> {
        self.active
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .insert(firing.id.clone(), firing.clone());
        Ok(())
    }

    fn clear_active_firing(&self, id: &str) -> Result<(), StoreError> {
        self.active
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .remove(id);
        Ok(())
    }

    fn update_watermark(&self, id: &str, expected: u8, new: u8) -> Result<bool, StoreError> {
        let mut active = self
            .active
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let firing = active
            .get_mut(id)
            .ok_or_else(|| StoreError::FiringNotFound(id.to_string()))?;

        if firing.watermark != expected {
            return Ok(false);
        }
        firing.watermark = new;
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
