//! Live Monitor - progress sampling and milestone detection
//!
//! While a firing is `Running`, a periodic sampler computes elapsed time,
//! progress percentage, simulated kiln temperature, and signed remaining
//! minutes, then checks the sample against a monotone notification
//! watermark. Per tick at most one event fires; conditions are evaluated in
//! order (progress thresholds, then near-completion, then overrun) with each
//! later condition overwriting the earlier, so coarse polling that skips
//! several thresholds produces a single notification for the furthest one.
//!
//! The math here is pure — tests drive it with synthetic timestamps. The
//! timer loop lives in [`session`].

pub mod session;

pub use session::{cancel_firing, complete_firing, start_firing, FiringMonitor};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::config::defaults;
use crate::thermal::temperature_at_elapsed;
use crate::types::FiringSchedule;

// ============================================================================
// Config-aware accessors
// ============================================================================

fn cfg_progress_thresholds() -> Vec<u8> {
    if config::is_initialized() {
        config::get().monitor.progress_thresholds.clone()
    } else {
        defaults::PROGRESS_THRESHOLDS.to_vec()
    }
}

fn cfg_near_done_minutes() -> f64 {
    if config::is_initialized() {
        config::get().monitor.near_done_minutes
    } else {
        defaults::NEAR_DONE_MINUTES
    }
}

fn cfg_overdue_minutes() -> f64 {
    if config::is_initialized() {
        config::get().monitor.overdue_minutes
    } else {
        defaults::OVERDUE_MINUTES
    }
}

// ============================================================================
// Monitor Sample
// ============================================================================

/// One snapshot of a running firing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorSample {
    /// Minutes since the firing started
    pub elapsed_minutes: f64,

    /// Elapsed as a percentage of the estimated duration
    pub progress_percent: f64,

    /// Simulated kiln temperature (°C)
    pub current_temp: f64,

    /// Estimated minutes left; goes negative once the estimate is exceeded
    pub remaining_minutes: f64,
}

/// Sample a running firing at `now`.
pub fn sample_firing(
    schedule: &FiringSchedule,
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> MonitorSample {
    let elapsed_minutes = (now - started_at).num_milliseconds() as f64 / 60_000.0;
    let estimated = f64::from(schedule.estimated_duration_minutes);

    // A zero-length estimate cannot produce a meaningful percentage.
    let progress_percent = if estimated > 0.0 {
        elapsed_minutes / estimated * 100.0
    } else {
        0.0
    };

    MonitorSample {
        elapsed_minutes,
        progress_percent,
        current_temp: temperature_at_elapsed(&schedule.segments, elapsed_minutes),
        remaining_minutes: estimated - elapsed_minutes,
    }
}

// ============================================================================
// Milestones
// ============================================================================

/// What kind of notification a milestone carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneKind {
    /// A progress threshold (percent) was crossed
    Progress(u8),
    /// Fewer than the configured minutes remain
    AlmostDone,
    /// The estimate has been exceeded by more than the configured minutes
    Overdue,
}

impl std::fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MilestoneKind::Progress(pct) => write!(f, "{pct}% progress"),
            MilestoneKind::AlmostDone => write!(f, "almost done"),
            MilestoneKind::Overdue => write!(f, "overdue"),
        }
    }
}

/// A milestone to notify, paired with the watermark value that records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub kind: MilestoneKind,
    /// New watermark value; always greater than the watermark it replaces
    pub watermark: u8,
}

/// Check a sample against the watermark and the configured thresholds.
///
/// At most one milestone is returned per call: the highest newly crossed
/// progress threshold, overwritten by near-completion, overwritten by
/// overrun. The returned watermark is strictly greater than `watermark`, so
/// repeated samples can only move it up.
pub fn evaluate_milestones(sample: &MonitorSample, watermark: u8) -> Option<Milestone> {
    let thresholds = cfg_progress_thresholds();
    let near_done = cfg_near_done_minutes();
    let overdue = cfg_overdue_minutes();

    let mut milestone = None;

    for &threshold in &thresholds {
        if f64::from(threshold) <= sample.progress_percent && threshold > watermark {
            milestone = Some(Milestone {
                kind: MilestoneKind::Progress(threshold),
                watermark: threshold,
            });
        }
    }

    if sample.remaining_minutes > 0.0
        && sample.remaining_minutes <= near_done
        && watermark < defaults::WATERMARK_NEAR_DONE_GUARD
    {
        milestone = Some(Milestone {
            kind: MilestoneKind::AlmostDone,
            watermark: defaults::WATERMARK_NEAR_DONE,
        });
    }

    if sample.remaining_minutes < -overdue && watermark < defaults::WATERMARK_OVERDUE {
        milestone = Some(Milestone {
            kind: MilestoneKind::Overdue,
            watermark: defaults::WATERMARK_OVERDUE,
        });
    }

    milestone
}
