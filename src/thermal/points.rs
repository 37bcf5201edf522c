//! Schedule polyline for plotting

use crate::config::defaults::AMBIENT_TEMP_C;
use crate::types::FiringSegment;

use super::timeline::segment_duration_minutes;

/// One polyline vertex: cumulative minutes from start, temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulePoint {
    pub minutes: f64,
    pub temp_c: f64,
}

/// Lazy polyline over a segment sequence, one vertex per segment boundary,
/// starting at `(0, 25)`.
///
/// Restartable: the iterator is `Clone`, so a plot layer can re-walk the
/// same schedule without recomputing anything up front. Uses the identical
/// per-segment duration formula as `theoretical_duration`, so the final
/// vertex's time always agrees with the (unrounded) duration sum.
#[derive(Debug, Clone)]
pub struct SchedulePoints<'a> {
    segments: &'a [FiringSegment],
    index: usize,
    minutes: f64,
    current_temp: f64,
    origin_emitted: bool,
}

impl<'a> Iterator for SchedulePoints<'a> {
    type Item = SchedulePoint;

    fn next(&mut self) -> Option<SchedulePoint> {
        if !self.origin_emitted {
            self.origin_emitted = true;
            return Some(SchedulePoint {
                minutes: 0.0,
                temp_c: AMBIENT_TEMP_C,
            });
        }

        let segment = self.segments.get(self.index)?;
        self.index += 1;

        self.minutes += segment_duration_minutes(self.current_temp, segment);
        self.current_temp = segment.target_temp();

        Some(SchedulePoint {
            minutes: self.minutes,
            temp_c: self.current_temp,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining =
            self.segments.len() - self.index + usize::from(!self.origin_emitted);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SchedulePoints<'_> {}

/// Polyline vertices for a segment sequence.
pub fn schedule_points(segments: &[FiringSegment]) -> SchedulePoints<'_> {
    SchedulePoints {
        segments,
        index: 0,
        minutes: 0.0,
        current_temp: AMBIENT_TEMP_C,
        origin_emitted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermal::theoretical_duration;

    #[test]
    fn test_points_start_at_origin() {
        let segments = [FiringSegment::Ramp {
            rate: 100.0,
            target_temp: 600.0,
        }];
        let first = schedule_points(&segments).next();
        assert_eq!(
            first,
            Some(SchedulePoint {
                minutes: 0.0,
                temp_c: 25.0
            })
        );
    }

    #[test]
    fn test_points_one_vertex_per_boundary() {
        let segments = [
            FiringSegment::Ramp {
                rate: 100.0,
                target_temp: 600.0,
            },
            FiringSegment::Hold {
                target_temp: 600.0,
                hold_minutes: 30.0,
            },
            FiringSegment::Ramp {
                rate: 200.0,
                target_temp: 25.0,
            },
        ];

        let points: Vec<SchedulePoint> = schedule_points(&segments).collect();
        assert_eq!(points.len(), 4);

        // Ramp boundary: 345 min at 600 °C
        assert!((points[1].minutes - 345.0).abs() < 1e-9);
        assert!((points[1].temp_c - 600.0).abs() < f64::EPSILON);

        // Hold advances time, not temperature
        assert!((points[2].minutes - 375.0).abs() < 1e-9);
        assert!((points[2].temp_c - 600.0).abs() < f64::EPSILON);

        // Final vertex agrees with the duration sum before rounding
        assert!((points[3].minutes - 547.5).abs() < 1e-9);
        assert!((points[3].temp_c - 25.0).abs() < f64::EPSILON);
        assert_eq!(theoretical_duration(&segments), points[3].minutes.round() as u32);
    }

    #[test]
    fn test_points_are_restartable() {
        let segments = [FiringSegment::Ramp {
            rate: 150.0,
            target_temp: 955.0,
        }];
        let points = schedule_points(&segments);
        let first_pass: Vec<SchedulePoint> = points.clone().collect();
        let second_pass: Vec<SchedulePoint> = points.collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_points_empty_schedule() {
        let points: Vec<SchedulePoint> = schedule_points(&[]).collect();
        assert_eq!(points.len(), 1);
        assert!((points[0].temp_c - 25.0).abs() < f64::EPSILON);
    }
}
