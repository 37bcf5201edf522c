//! Segment Model - pure timeline math over firing segments
//!
//! Everything here is a pure function of the segment sequence:
//!
//! - `theoretical_duration`: total wall-clock minutes from ramp rates and holds
//! - `temperature_at_elapsed`: simulated kiln temperature at a point in time
//! - `schedule_points`: polyline vertices for plotting the profile
//!
//! Segments are never validated — schedules are user-edited and must stay
//! previewable mid-edit, so malformed segments degrade arithmetically
//! (contributing zero time) instead of erroring.

pub mod points;
pub mod timeline;

pub use points::{SchedulePoint, SchedulePoints, schedule_points};
pub use timeline::{segment_duration_minutes, temperature_at_elapsed, theoretical_duration};
