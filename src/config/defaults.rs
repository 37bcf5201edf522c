//! Built-in constants - every operator-tunable value in one place
//!
//! These are the values used when no `studio_config.toml` is present; the
//! corresponding `StudioConfig` fields default to them.

// ============================================================================
// Thermal model
// ============================================================================

/// Implicit ambient start temperature for every schedule (°C)
pub const AMBIENT_TEMP_C: f64 = 25.0;

/// Upper bound of the slow low-temperature zone (°C) — thermal-shock risk
/// is highest below ~200 °C
pub const LOW_ZONE_CEILING_C: f64 = 120.0;

/// Upper bound of the mid zone (°C), which spans the ~573 °C quartz inversion
pub const MID_ZONE_CEILING_C: f64 = 600.0;

// ============================================================================
// Stage parameter tables
// ============================================================================

/// Bisque peak temperature (°C, ~cone 06)
pub const BISQUE_PEAK_TEMP_C: f64 = 955.0;
/// Bisque hold at peak (minutes)
pub const BISQUE_PEAK_HOLD_MIN: f64 = 30.0;
/// Bisque ramp rate, ambient–120 °C (°C/h)
pub const BISQUE_LOW_RATE: f64 = 80.0;
/// Bisque ramp rate, 120–600 °C (°C/h)
pub const BISQUE_MID_RATE: f64 = 150.0;
/// Bisque ramp rate, 600 °C–peak (°C/h)
pub const BISQUE_MAIN_RATE: f64 = 120.0;
/// Bisque controlled cooldown rate (°C/h, negative = cooling)
pub const BISQUE_COOLDOWN_RATE: f64 = -150.0;

/// Glaze peak temperature (°C, ~cone 6)
pub const GLAZE_PEAK_TEMP_C: f64 = 1230.0;
/// Glaze hold at peak (minutes)
pub const GLAZE_PEAK_HOLD_MIN: f64 = 20.0;
/// Glaze ramp rate, ambient–120 °C (°C/h)
pub const GLAZE_LOW_RATE: f64 = 100.0;
/// Glaze ramp rate, 120–600 °C (°C/h)
pub const GLAZE_MID_RATE: f64 = 180.0;
/// Glaze ramp rate, 600 °C–peak (°C/h)
pub const GLAZE_MAIN_RATE: f64 = 150.0;
/// Glaze controlled cooldown rate (°C/h, negative = cooling)
pub const GLAZE_COOLDOWN_RATE: f64 = -120.0;

/// Controlled cooldown ends here for high-fire glaze loads (°C)
pub const COOLDOWN_FLOOR_HIGH_FIRE_C: f64 = 900.0;
/// Controlled cooldown ends here otherwise (°C)
pub const COOLDOWN_FLOOR_C: f64 = 700.0;
/// Peak above which a glaze firing counts as high-fire (°C)
pub const HIGH_FIRE_PEAK_C: f64 = 1200.0;

/// Sentinel rate for the final uncontrolled "natural cooldown" ramp (°C/h).
/// Excluded from pacing decisions but still feeds the standard ramp formula.
pub const NATURAL_COOLDOWN_RATE: f64 = -500.0;

/// Moisture hold inserted for thick and sculptural ware
pub const MOISTURE_HOLD_TEMP_C: f64 = 120.0;
pub const MOISTURE_HOLD_MIN: f64 = 60.0;

/// Clay load above which the flat heat-load compensation kicks in (kg)
pub const HEAVY_LOAD_KG: f64 = 5.0;
/// Flat modifier applied for heavy loads (+10%)
pub const HEAVY_LOAD_MODIFIER: f64 = 1.10;

// ============================================================================
// Calibration
// ============================================================================

/// Exponential recency base: each subsequent firing weighs this much more
/// than the one before it (the 10th firing counts ~68x the 1st)
pub const RECENCY_BASE: f64 = 1.6;

/// Ratios at or below this are rejected as anomalies
pub const OUTLIER_RATIO_FLOOR: f64 = 0.5;

/// Ratios at or above this are rejected as anomalies
pub const OUTLIER_RATIO_CEILING: f64 = 1.5;

// ============================================================================
// Live monitor
// ============================================================================

/// Progress percentages that trigger a milestone notification
pub const PROGRESS_THRESHOLDS: [u8; 3] = [50, 75, 90];

/// "Almost done" fires when this many minutes (or fewer) remain
pub const NEAR_DONE_MINUTES: f64 = 15.0;

/// "Overdue" fires once the estimate is exceeded by more than this
pub const OVERDUE_MINUTES: f64 = 10.0;

/// Watermark sentinel for the "almost done" notification
pub const WATERMARK_NEAR_DONE: u8 = 99;

/// "Almost done" is suppressed once the watermark reaches this value
pub const WATERMARK_NEAR_DONE_GUARD: u8 = 95;

/// Watermark sentinel for the "overdue" notification
pub const WATERMARK_OVERDUE: u8 = 100;

/// Sampler period for a local monitor (seconds)
pub const POLL_INTERVAL_SECS: u64 = 1;

/// Sampler period for a remote scheduled poller (seconds)
pub const REMOTE_POLL_INTERVAL_SECS: u64 = 300;
