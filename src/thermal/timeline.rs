//! Theoretical duration and temperature-at-time over a segment sequence

use crate::config::defaults::AMBIENT_TEMP_C;
use crate::types::FiringSegment;

/// Minutes a single segment takes, starting from `start_temp`.
///
/// Ramps use the magnitude of the rate; a zero-rate ramp contributes no time
/// (it still moves the working temperature — see `theoretical_duration`).
/// Negative hold times clamp to zero.
pub fn segment_duration_minutes(start_temp: f64, segment: &FiringSegment) -> f64 {
    match *segment {
        FiringSegment::Ramp { rate, target_temp } => {
            if rate == 0.0 {
                0.0
            } else {
                (target_temp - start_temp).abs() / rate.abs() * 60.0
            }
        }
        FiringSegment::Hold { hold_minutes, .. } => hold_minutes.max(0.0),
    }
}

/// Total theoretical firing duration in minutes, rounded once at the end.
///
/// Walks the sequence from ambient (25 °C); each segment starts at the
/// previous segment's target temperature. Zero-rate ramps contribute zero
/// time but still advance the working temperature — a long-standing quirk
/// that saved schedules depend on, preserved deliberately.
pub fn theoretical_duration(segments: &[FiringSegment]) -> u32 {
    let mut current_temp = AMBIENT_TEMP_C;
    let mut total = 0.0;

    for segment in segments {
        total += segment_duration_minutes(current_temp, segment);
        current_temp = segment.target_temp();
    }

    // Round half-up on the final sum, not per segment.
    total.round().max(0.0) as u32
}

/// Simulated kiln temperature (°C, nearest whole degree) at `elapsed_minutes`.
///
/// Linear interpolation inside ramp windows, constant target inside hold
/// windows. Past the end of the timeline the schedule is considered finished
/// and its terminal temperature is reported — never an error. An empty
/// sequence reads ambient.
pub fn temperature_at_elapsed(segments: &[FiringSegment], elapsed_minutes: f64) -> f64 {
    let mut current_temp = AMBIENT_TEMP_C;
    let mut window_start = 0.0;

    for segment in segments {
        let duration = segment_duration_minutes(current_temp, segment);
        let window_end = window_start + duration;

        if duration > 0.0 && elapsed_minutes < window_end {
            let temp = match *segment {
                FiringSegment::Ramp { target_temp, .. } => {
                    let fraction = (elapsed_minutes - window_start) / duration;
                    current_temp + (target_temp - current_temp) * fraction
                }
                FiringSegment::Hold { target_temp, .. } => target_temp,
            };
            return temp.round();
        }

        current_temp = segment.target_temp();
        window_start = window_end;
    }

    current_temp.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rate: f64, target_temp: f64) -> FiringSegment {
        FiringSegment::Ramp { rate, target_temp }
    }

    fn hold(target_temp: f64, hold_minutes: f64) -> FiringSegment {
        FiringSegment::Hold {
            target_temp,
            hold_minutes,
        }
    }

    #[test]
    fn test_duration_ramp_hold_cooldown() {
        // (600-25)/100*60 + 30 + (600-25)/200*60 = 345 + 30 + 172.5 = 547.5
        // Round-half-up on the final sum -> 548.
        let segments = [ramp(100.0, 600.0), hold(600.0, 30.0), ramp(200.0, 25.0)];
        assert_eq!(theoretical_duration(&segments), 548);
    }

    #[test]
    fn test_duration_empty_schedule() {
        assert_eq!(theoretical_duration(&[]), 0);
    }

    #[test]
    fn test_duration_is_pure() {
        let segments = [ramp(150.0, 1000.0), hold(1000.0, 15.0)];
        assert_eq!(
            theoretical_duration(&segments),
            theoretical_duration(&segments)
        );
    }

    #[test]
    fn test_zero_rate_ramp_teleports_temperature() {
        // Zero time, but the next ramp starts from 500 °C, not ambient.
        let segments = [ramp(0.0, 500.0), ramp(100.0, 600.0)];
        // (600-500)/100*60 = 60
        assert_eq!(theoretical_duration(&segments), 60);
    }

    #[test]
    fn test_negative_hold_contributes_nothing() {
        let segments = [hold(200.0, -30.0)];
        assert_eq!(theoretical_duration(&segments), 0);
    }

    #[test]
    fn test_negative_cooldown_rate_uses_magnitude() {
        let segments = [ramp(0.0, 625.0), ramp(-200.0, 25.0)];
        // |25-625|/200*60 = 180
        assert_eq!(theoretical_duration(&segments), 180);
    }

    #[test]
    fn test_temperature_at_start_is_ambient() {
        let segments = [ramp(100.0, 600.0), hold(600.0, 30.0)];
        assert!((temperature_at_elapsed(&segments, 0.0) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_temperature_interpolates_within_ramp() {
        // 25 -> 625 at 100 °C/h takes 360 min; halfway is 325 °C.
        let segments = [ramp(100.0, 625.0)];
        assert!((temperature_at_elapsed(&segments, 180.0) - 325.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_temperature_constant_during_hold() {
        let segments = [ramp(100.0, 600.0), hold(600.0, 60.0)];
        let ramp_minutes = 345.0;
        assert!((temperature_at_elapsed(&segments, ramp_minutes + 1.0) - 600.0).abs() < f64::EPSILON);
        assert!((temperature_at_elapsed(&segments, ramp_minutes + 59.0) - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_temperature_past_end_is_terminal() {
        let segments = [ramp(100.0, 600.0), hold(600.0, 30.0), ramp(200.0, 25.0)];
        assert!((temperature_at_elapsed(&segments, 100_000.0) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_temperature_empty_schedule_is_ambient() {
        assert!((temperature_at_elapsed(&[], 45.0) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_temperature_rounds_to_whole_degree() {
        // 25 -> 100 at 90 °C/h takes 50 min; at 7 min: 25 + 75*(7/50) = 35.5 -> 36.
        let segments = [ramp(90.0, 100.0)];
        assert!((temperature_at_elapsed(&segments, 7.0) - 36.0).abs() < f64::EPSILON);
    }
}
