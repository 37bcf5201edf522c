//! Firing lifecycle types: stages, ware types, outcomes, logs, active state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::segment::FiringSchedule;

// ============================================================================
// Firing Stage
// ============================================================================

/// Which firing this schedule is for.
///
/// `Uncertain` is a deliberate "cannot generate" sentinel: the generator
/// returns an empty schedule plus an actionable warning rather than guessing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FiringStage {
    /// First firing of dried greenware
    #[default]
    Bisque,
    /// Glaze firing of bisqued ware
    Glaze,
    /// Stage not yet decided by the user
    Uncertain,
}

impl FiringStage {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            FiringStage::Bisque => "Bisque",
            FiringStage::Glaze => "Glaze",
            FiringStage::Uncertain => "Uncertain",
        }
    }

    /// Parse from string (for CLI/config)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bisque" | "biscuit" => Some(FiringStage::Bisque),
            "glaze" | "glost" => Some(FiringStage::Glaze),
            "uncertain" | "unknown" => Some(FiringStage::Uncertain),
            _ => None,
        }
    }
}

impl std::fmt::Display for FiringStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Sample Type
// ============================================================================

/// Ware geometry, used to adjust ramp rates, holds, and the time modifier.
///
/// Thermal-shock risk is highest below 200 °C and near the ~573 °C quartz
/// inversion, so thicker and more complex ware gets slower low-temperature
/// ramps and longer peak holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    /// Typical thrown or handbuilt ware
    #[default]
    Standard,
    /// Walls over ~2 cm — slow moisture release
    Thick,
    /// Delicate thin-walled ware
    Thin,
    /// Platters and tiles — prone to uneven heating
    LargeFlat,
    /// Solid or enclosed sculptural forms
    Sculpture,
}

impl SampleType {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            SampleType::Standard => "Standard",
            SampleType::Thick => "Thick-walled",
            SampleType::Thin => "Thin-walled",
            SampleType::LargeFlat => "Large flat",
            SampleType::Sculpture => "Sculpture",
        }
    }

    /// Parse from string (for CLI/config)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "normal" => Some(SampleType::Standard),
            "thick" | "thick_walled" => Some(SampleType::Thick),
            "thin" | "thin_walled" => Some(SampleType::Thin),
            "large_flat" | "flat" | "platter" | "tile" => Some(SampleType::LargeFlat),
            "sculpture" | "sculptural" => Some(SampleType::Sculpture),
            _ => None,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Firing Outcome
// ============================================================================

/// How a completed or aborted firing turned out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FiringOutcome {
    /// Fired to the intended cone
    Perfect,
    /// Did not reach full maturity
    Underfired,
    /// Went past the intended cone
    Overfired,
    /// Controller or operator error during the firing
    Error,
    /// Firing aborted (power cut, element failure, manual stop)
    Failure,
}

impl FiringOutcome {
    /// Whether this firing's timing is usable for calibration.
    ///
    /// Errors and failures are aborted or anomalous runs whose durations say
    /// nothing about how the kiln tracks its schedule.
    pub fn usable_for_timing(&self) -> bool {
        !matches!(self, FiringOutcome::Error | FiringOutcome::Failure)
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            FiringOutcome::Perfect => "Perfect",
            FiringOutcome::Underfired => "Underfired",
            FiringOutcome::Overfired => "Overfired",
            FiringOutcome::Error => "Error",
            FiringOutcome::Failure => "Failure",
        }
    }
}

impl std::fmt::Display for FiringOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Firing Log
// ============================================================================

/// One historical record per completed or aborted firing.
///
/// Append-only: created once at completion or cancellation, never mutated by
/// this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringLog {
    /// Name of the schedule that was fired
    pub schedule_name: String,

    /// When the firing finished (or was cancelled)
    pub timestamp: DateTime<Utc>,

    /// Estimate shown to the user before firing (minutes).
    /// Includes the calibration factor current at the time.
    pub predicted_duration: f64,

    /// Calibration-free physics estimate (minutes). Absent on legacy logs
    /// recorded before this field existed.
    #[serde(default)]
    pub theoretical_duration: Option<f64>,

    /// Measured wall-clock duration (minutes)
    pub actual_duration: f64,

    /// Clay load in kilograms, when recorded
    #[serde(default)]
    pub clay_weight_kg: Option<f64>,

    /// Ware geometry, when recorded
    #[serde(default)]
    pub sample_type: Option<SampleType>,

    /// Firing stage, when recorded
    #[serde(default)]
    pub firing_stage: Option<FiringStage>,

    /// Free-text operator notes
    #[serde(default)]
    pub notes: String,

    /// Outcome classification
    pub outcome: FiringOutcome,
}

// ============================================================================
// Firing State
// ============================================================================

/// Lifecycle state of a firing.
///
/// `Completed` and `Cancelled` are terminal — no further samples are taken
/// once either is reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FiringState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl std::fmt::Display for FiringState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FiringState::Idle => write!(f, "Idle"),
            FiringState::Running => write!(f, "Running"),
            FiringState::Completed => write!(f, "Completed"),
            FiringState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

// ============================================================================
// Active Firing
// ============================================================================

/// Persisted state of the firing currently in progress.
///
/// The `watermark` is the highest milestone already notified (0–100, with
/// sentinels 99 = "almost done" and 100 = "overdue"). It only moves up, and
/// only via the store's compare-and-set so that independent pollers sharing
/// the record neither duplicate nor drop notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveFiring {
    /// Opaque identifier for this firing (one per user session)
    pub id: String,

    /// Schedule being fired, frozen at start
    pub schedule: FiringSchedule,

    /// When the firing started
    pub started_at: DateTime<Utc>,

    /// Lifecycle state
    pub state: FiringState,

    /// Highest milestone already notified
    pub watermark: u8,
}
