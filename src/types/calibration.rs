//! Calibration result types

use serde::{Deserialize, Serialize};

// ============================================================================
// Baseline Method
// ============================================================================

/// Which per-log baseline the calibration ratios were computed against.
///
/// Logs recorded after the calibration-free physics estimate was introduced
/// carry a theoretical duration; older logs fall back to the estimate that
/// was shown to the user, which already contained the factor of its day and
/// is therefore systematically less accurate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    /// Pure physics estimate, free of prior calibration
    #[default]
    Theoretical,
    /// Legacy fallback: the calibration-inclusive estimate shown to the user
    HistoricalEstimate,
}

impl std::fmt::Display for BaselineMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineMethod::Theoretical => write!(f, "absolute theoretical"),
            BaselineMethod::HistoricalEstimate => write!(f, "historical estimate"),
        }
    }
}

// ============================================================================
// Calibration Result
// ============================================================================

/// A multiplicative duration correction plus the reasoning behind it.
///
/// Recomputed on demand from the full log history and superseded each time;
/// the store may keep past factors as an audit trail but the engine always
/// works from the latest full log set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Multiplicative correction, 1.0 = no correction, rounded to 3 decimals
    pub factor: f64,

    /// Human-readable derivation of the factor
    pub advice: String,

    /// Predominant baseline method across the surviving logs
    #[serde(default)]
    pub method: BaselineMethod,

    /// Number of logs that survived filtering and outlier rejection
    #[serde(default)]
    pub sample_count: usize,
}

impl CalibrationResult {
    /// The identity correction with an explanation of why no correction
    /// could be learned.
    pub fn identity(advice: impl Into<String>) -> Self {
        Self {
            factor: 1.0,
            advice: advice.into(),
            method: BaselineMethod::default(),
            sample_count: 0,
        }
    }

    /// Apply this factor to a theoretical duration (minutes).
    pub fn apply(&self, theoretical_minutes: f64) -> u32 {
        (theoretical_minutes * self.factor).round().max(0.0) as u32
    }
}

impl Default for CalibrationResult {
    fn default() -> Self {
        Self::identity("No calibration computed yet")
    }
}
