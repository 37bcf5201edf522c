//! Shared data records for schedules, firings, and calibration.

pub mod calibration;
pub mod firing;
pub mod segment;

pub use calibration::{BaselineMethod, CalibrationResult};
pub use firing::{ActiveFiring, FiringLog, FiringOutcome, FiringStage, FiringState, SampleType};
pub use segment::{FiringSchedule, FiringSegment};
