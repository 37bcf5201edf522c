//! KilnWatch: Kiln Firing Scheduling and Monitoring
//!
//! Scheduling assistant and live monitor for electric studio kilns.
//!
//! ## Architecture
//!
//! - **Thermal Model**: Segment math (durations, simulated temperature, plot points)
//! - **Schedule Generator**: Builds ramp/hold programs from stage and load parameters
//! - **Calibration Engine**: Recency-weighted correction factor learned from firing logs
//! - **Live Monitor**: Progress sampling with monotone milestone notifications

pub mod calibration;
pub mod config;
pub mod generator;
pub mod monitor;
pub mod notify;
pub mod storage;
pub mod thermal;
pub mod types;

// Re-export studio configuration
pub use config::StudioConfig;

// Re-export commonly used types
pub use types::{
    ActiveFiring, BaselineMethod, CalibrationResult, FiringLog, FiringOutcome, FiringSchedule,
    FiringSegment, FiringStage, FiringState, SampleType,
};

// Re-export the thermal model
pub use thermal::{
    schedule_points, segment_duration_minutes, temperature_at_elapsed, theoretical_duration,
    SchedulePoint,
};

// Re-export the generator
pub use generator::{generate, GeneratedSchedule};

// Re-export calibration
pub use calibration::calculate_calibration;

// Re-export monitoring
pub use monitor::{
    cancel_firing, complete_firing, evaluate_milestones, sample_firing, start_firing,
    FiringMonitor, Milestone, MilestoneKind, MonitorSample,
};

// Re-export storage backends
pub use storage::{FiringStore, MemoryStore, SledStore, StoreError};

// Re-export notification channels
pub use notify::{Notifier, NotifyMessage, NullNotifier, WebhookNotifier};
