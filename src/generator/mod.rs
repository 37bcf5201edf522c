//! Schedule Generator - recommended firing profiles per stage and ware type
//!
//! Derives stage-specific constants (peak, peak hold, three ramp-rate zones,
//! controlled cooldown) from the built-in tables, adjusts them for the ware
//! geometry, and assembles segments in a fixed order:
//!
//! 1. ramp ambient → 120 °C at the low-zone rate
//! 2. (thick/sculpture) 60 min moisture hold at 120 °C
//! 3. ramp 120 → 600 °C at the mid-zone rate
//! 4. ramp 600 °C → peak at the main rate
//! 5. hold at peak
//! 6. controlled cooldown to 900 °C (high-fire glaze) or 700 °C
//! 7. "natural cooldown" ramp to ambient at a sentinel rate
//!
//! Every adjustment the generator applies is echoed back as a human-readable
//! advice string.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::defaults;
use crate::thermal::theoretical_duration;
use crate::types::{FiringSchedule, FiringSegment, FiringStage, SampleType};

// ============================================================================
// Stage Parameters
// ============================================================================

/// Stage-specific firing constants before ware-type adjustment.
#[derive(Debug, Clone, Copy)]
struct StageParams {
    peak_temp: f64,
    peak_hold_min: f64,
    low_rate: f64,
    mid_rate: f64,
    main_rate: f64,
    cooldown_rate: f64,
}

impl StageParams {
    fn bisque() -> Self {
        Self {
            peak_temp: defaults::BISQUE_PEAK_TEMP_C,
            peak_hold_min: defaults::BISQUE_PEAK_HOLD_MIN,
            low_rate: defaults::BISQUE_LOW_RATE,
            mid_rate: defaults::BISQUE_MID_RATE,
            main_rate: defaults::BISQUE_MAIN_RATE,
            cooldown_rate: defaults::BISQUE_COOLDOWN_RATE,
        }
    }

    fn glaze() -> Self {
        Self {
            peak_temp: defaults::GLAZE_PEAK_TEMP_C,
            peak_hold_min: defaults::GLAZE_PEAK_HOLD_MIN,
            low_rate: defaults::GLAZE_LOW_RATE,
            mid_rate: defaults::GLAZE_MID_RATE,
            main_rate: defaults::GLAZE_MAIN_RATE,
            cooldown_rate: defaults::GLAZE_COOLDOWN_RATE,
        }
    }
}

// ============================================================================
// Ware-Type Adjustments
// ============================================================================

/// Low-zone (ambient–120 °C) ramp-rate scale per ware type.
fn low_rate_scale(sample: SampleType) -> f64 {
    match sample {
        SampleType::Standard => 1.0,
        SampleType::Thick => 0.6,
        SampleType::Thin => 1.2,
        SampleType::LargeFlat => 0.7,
        SampleType::Sculpture => 0.5,
    }
}

/// Mid-zone (120–600 °C) ramp-rate scale per ware type. The mid zone spans
/// the ~573 °C quartz inversion, so only the touchiest geometries slow down.
fn mid_rate_scale(sample: SampleType) -> f64 {
    match sample {
        SampleType::LargeFlat => 0.9,
        SampleType::Sculpture => 0.8,
        _ => 1.0,
    }
}

/// Extra minutes of peak hold per ware type.
fn extra_peak_hold(sample: SampleType) -> f64 {
    match sample {
        SampleType::Thick => 30.0,
        SampleType::LargeFlat => 15.0,
        SampleType::Sculpture => 45.0,
        _ => 0.0,
    }
}

/// Wall-clock time modifier per ware type (1.0 baseline).
fn sample_time_modifier(sample: SampleType) -> f64 {
    match sample {
        SampleType::Standard => 1.0,
        SampleType::Thin => 0.95,
        SampleType::Thick => 1.20,
        SampleType::LargeFlat => 1.15,
        SampleType::Sculpture => 1.35,
    }
}

/// Thick and sculptural ware gets a moisture hold at 120 °C.
fn needs_moisture_hold(sample: SampleType) -> bool {
    matches!(sample, SampleType::Thick | SampleType::Sculpture)
}

// ============================================================================
// Generated Schedule
// ============================================================================

/// Output of the generator: segments plus everything the user needs to judge
/// the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    /// Recommended segment sequence (empty when the stage is uncertain)
    pub segments: Vec<FiringSegment>,

    /// Conditions that prevented or degraded generation
    pub warnings: Vec<String>,

    /// Which adjustments were applied and why
    pub advice: Vec<String>,

    /// `round(theoretical_duration * time_modifier)` in minutes
    pub estimated_duration_minutes: u32,

    /// Wall-clock multiplier from ware type and clay load
    pub time_modifier: f64,
}

impl GeneratedSchedule {
    /// Package the recommendation as a named schedule ready to fire.
    pub fn into_schedule(
        self,
        name: impl Into<String>,
        sample_type: SampleType,
        firing_stage: FiringStage,
        clay_weight_kg: f64,
    ) -> FiringSchedule {
        FiringSchedule {
            name: name.into(),
            segments: self.segments,
            estimated_duration_minutes: self.estimated_duration_minutes,
            clay_weight_kg: Some(clay_weight_kg),
            sample_type: Some(sample_type),
            firing_stage: Some(firing_stage),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Produce a recommended segment sequence for the given stage, ware type,
/// and clay load.
///
/// `FiringStage::Uncertain` short-circuits: an empty segment list, a single
/// actionable warning, and zero duration — a deliberate "cannot generate"
/// sentinel, not an error.
pub fn generate(
    sample_type: SampleType,
    firing_stage: FiringStage,
    clay_weight_kg: f64,
) -> GeneratedSchedule {
    let params = match firing_stage {
        FiringStage::Bisque => StageParams::bisque(),
        FiringStage::Glaze => StageParams::glaze(),
        FiringStage::Uncertain => {
            return GeneratedSchedule {
                segments: Vec::new(),
                warnings: vec![
                    "Firing stage is uncertain — pick bisque or glaze before generating a schedule."
                        .to_string(),
                ],
                advice: Vec::new(),
                estimated_duration_minutes: 0,
                time_modifier: 1.0,
            };
        }
    };

    let mut advice = Vec::new();
    let mut segments = Vec::new();

    // (1) Slow climb out of the thermal-shock zone.
    let low_scale = low_rate_scale(sample_type);
    let low_rate = params.low_rate * low_scale;
    segments.push(FiringSegment::Ramp {
        rate: low_rate,
        target_temp: defaults::LOW_ZONE_CEILING_C,
    });
    if low_scale < 1.0 {
        advice.push(format!(
            "Lowered the 25–120 °C ramp to {low_rate:.0} °C/h for {} ware (thermal-shock risk is highest below 200 °C).",
            sample_type.display_name().to_lowercase(),
        ));
    } else if low_scale > 1.0 {
        advice.push(format!(
            "Raised the 25–120 °C ramp to {low_rate:.0} °C/h — {} ware releases moisture quickly.",
            sample_type.display_name().to_lowercase(),
        ));
    }

    // (2) Moisture hold for slow-drying geometries.
    if needs_moisture_hold(sample_type) {
        segments.push(FiringSegment::Hold {
            target_temp: defaults::MOISTURE_HOLD_TEMP_C,
            hold_minutes: defaults::MOISTURE_HOLD_MIN,
        });
        advice.push(format!(
            "Added a {:.0} min hold at {:.0} °C to drive off residual moisture.",
            defaults::MOISTURE_HOLD_MIN,
            defaults::MOISTURE_HOLD_TEMP_C,
        ));
    }

    // (3) Mid zone through the quartz inversion.
    let mid_scale = mid_rate_scale(sample_type);
    let mid_rate = params.mid_rate * mid_scale;
    segments.push(FiringSegment::Ramp {
        rate: mid_rate,
        target_temp: defaults::MID_ZONE_CEILING_C,
    });
    if mid_scale < 1.0 {
        advice.push(format!(
            "Slowed the 120–600 °C ramp to {mid_rate:.0} °C/h through the 573 °C quartz inversion.",
        ));
    }

    // (4) Main climb to peak.
    segments.push(FiringSegment::Ramp {
        rate: params.main_rate,
        target_temp: params.peak_temp,
    });

    // (5) Peak hold.
    let extra_hold = extra_peak_hold(sample_type);
    let peak_hold = params.peak_hold_min + extra_hold;
    segments.push(FiringSegment::Hold {
        target_temp: params.peak_temp,
        hold_minutes: peak_hold,
    });
    if extra_hold > 0.0 {
        advice.push(format!(
            "Extended the peak hold by {extra_hold:.0} min for {} ware.",
            sample_type.display_name().to_lowercase(),
        ));
    }

    // (6) Controlled cooldown out of the glaze-sensitive range.
    let cooldown_floor = if firing_stage == FiringStage::Glaze
        && params.peak_temp > defaults::HIGH_FIRE_PEAK_C
    {
        defaults::COOLDOWN_FLOOR_HIGH_FIRE_C
    } else {
        defaults::COOLDOWN_FLOOR_C
    };
    segments.push(FiringSegment::Ramp {
        rate: params.cooldown_rate,
        target_temp: cooldown_floor,
    });

    // (7) Natural cooldown to ambient at the sentinel rate.
    segments.push(FiringSegment::Ramp {
        rate: defaults::NATURAL_COOLDOWN_RATE,
        target_temp: defaults::AMBIENT_TEMP_C,
    });

    // Wall-clock modifier: ware type, plus flat heat-load compensation.
    let mut time_modifier = sample_time_modifier(sample_type);
    if time_modifier != 1.0 {
        advice.push(format!(
            "Applied a {time_modifier:.2}x time modifier for {} ware.",
            sample_type.display_name().to_lowercase(),
        ));
    }
    if clay_weight_kg > defaults::HEAVY_LOAD_KG {
        time_modifier *= defaults::HEAVY_LOAD_MODIFIER;
        advice.push(format!(
            "Clay load over {:.0} kg — estimate extended by 10% for the extra heat load.",
            defaults::HEAVY_LOAD_KG,
        ));
    }

    let theoretical = theoretical_duration(&segments);
    let estimated = (f64::from(theoretical) * time_modifier).round() as u32;

    debug!(
        stage = %firing_stage,
        sample = %sample_type,
        weight_kg = clay_weight_kg,
        segments = segments.len(),
        theoretical_min = theoretical,
        estimated_min = estimated,
        "Generated firing schedule"
    );

    GeneratedSchedule {
        segments,
        warnings: Vec::new(),
        advice,
        estimated_duration_minutes: estimated,
        time_modifier,
    }
}
