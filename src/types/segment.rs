//! Firing segments and schedules

use serde::{Deserialize, Serialize};

use super::firing::{FiringStage, SampleType};

// ============================================================================
// Firing Segment
// ============================================================================

/// One step of a firing schedule: a temperature ramp or a constant dwell.
///
/// Segments are evaluated left-to-right starting from ambient (25 °C);
/// each segment begins at the previous segment's target temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FiringSegment {
    /// Temperature change at a fixed rate. The rate's sign is a heating vs
    /// cooling convention only; duration math uses its magnitude.
    Ramp {
        /// Ramp rate in °C per hour (signed, magnitude used for timing)
        rate: f64,
        /// Temperature at the end of the ramp (°C)
        target_temp: f64,
    },
    /// Constant-temperature dwell for a fixed number of minutes.
    Hold {
        /// Dwell temperature (°C)
        target_temp: f64,
        /// Dwell length in minutes
        hold_minutes: f64,
    },
}

impl FiringSegment {
    /// Temperature at the end of this segment (°C).
    pub fn target_temp(&self) -> f64 {
        match *self {
            FiringSegment::Ramp { target_temp, .. } | FiringSegment::Hold { target_temp, .. } => {
                target_temp
            }
        }
    }

    /// Short code for logging
    pub fn short_code(&self) -> &'static str {
        match self {
            FiringSegment::Ramp { .. } => "RAMP",
            FiringSegment::Hold { .. } => "HOLD",
        }
    }
}

impl std::fmt::Display for FiringSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            FiringSegment::Ramp { rate, target_temp } => {
                write!(f, "ramp to {target_temp:.0} °C at {rate:.0} °C/h")
            }
            FiringSegment::Hold {
                target_temp,
                hold_minutes,
            } => write!(f, "hold {target_temp:.0} °C for {hold_minutes:.0} min"),
        }
    }
}

// ============================================================================
// Firing Schedule
// ============================================================================

/// An ordered segment sequence with display metadata.
///
/// Immutable once a firing starts — the live monitor and the completion log
/// both read the schedule as it was when the firing began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringSchedule {
    /// Display name shown in notifications and logs
    pub name: String,

    /// Segments evaluated left-to-right from ambient
    pub segments: Vec<FiringSegment>,

    /// Predicted wall-clock duration shown to the user (minutes).
    /// Includes the generator time modifier and the calibration factor.
    pub estimated_duration_minutes: u32,

    /// Clay load in kilograms, when known
    #[serde(default)]
    pub clay_weight_kg: Option<f64>,

    /// Ware geometry the schedule was generated for, when known
    #[serde(default)]
    pub sample_type: Option<SampleType>,

    /// Firing stage the schedule was generated for, when known
    #[serde(default)]
    pub firing_stage: Option<FiringStage>,
}
