//! Calibration Engine - learns a duration correction from firing history
//!
//! The kiln never tracks its theoretical profile exactly: elements age, loads
//! vary, thermocouples drift. This module compares each logged firing's
//! actual duration against its baseline estimate and folds the ratios into a
//! single multiplicative correction factor applied to future estimates,
//! closing the feedback loop.
//!
//! ## Algorithm
//!
//! 1. Drop `Error`/`Failure` logs (aborted runs say nothing about timing)
//! 2. Sort ascending by timestamp — chronology drives the recency weighting
//! 3. Ratio per log: `actual / baseline`, baseline = theoretical duration
//!    when present, else the legacy calibration-inclusive estimate
//! 4. Reject ratios outside (0.5, 1.5) as anomalies (sensor fault, mis-timed
//!    manual stop) rather than true kiln drift
//! 5. Weight the i-th surviving log `1.6^i` and take the weighted mean
//!
//! Always returns a usable factor and a readable explanation; never errors.

use tracing::debug;

use crate::config;
use crate::config::defaults;
use crate::types::{BaselineMethod, CalibrationResult, FiringLog};

// ============================================================================
// Config-aware accessors (read from studio_config.toml when available)
// ============================================================================

fn cfg_recency_base() -> f64 {
    if config::is_initialized() {
        config::get().calibration.recency_base
    } else {
        defaults::RECENCY_BASE
    }
}

fn cfg_outlier_floor() -> f64 {
    if config::is_initialized() {
        config::get().calibration.outlier_ratio_floor
    } else {
        defaults::OUTLIER_RATIO_FLOOR
    }
}

fn cfg_outlier_ceiling() -> f64 {
    if config::is_initialized() {
        config::get().calibration.outlier_ratio_ceiling
    } else {
        defaults::OUTLIER_RATIO_CEILING
    }
}

// ============================================================================
// Ratio extraction
// ============================================================================

/// A usable (ratio, baseline-method) pair extracted from one log.
struct LogRatio {
    ratio: f64,
    method: BaselineMethod,
}

/// Compute `actual / baseline` for one log, if a positive finite baseline
/// exists. Legacy logs without a theoretical duration fall back to the
/// calibration-inclusive estimate; that makes their ratios systematically
/// less accurate, which shows up in the advice text only.
fn log_ratio(log: &FiringLog) -> Option<LogRatio> {
    let (baseline, method) = match log.theoretical_duration {
        Some(t) if t > 0.0 => (t, BaselineMethod::Theoretical),
        _ => (log.predicted_duration, BaselineMethod::HistoricalEstimate),
    };

    if baseline <= 0.0 || !baseline.is_finite() || !log.actual_duration.is_finite() {
        return None;
    }

    Some(LogRatio {
        ratio: log.actual_duration / baseline,
        method,
    })
}

// ============================================================================
// Calibration
// ============================================================================

/// Compute the calibration factor from the full log history.
///
/// Pure and side-effect-free over its input: safe to rerun on every data
/// refresh, and calling twice with the same logs yields the same result.
pub fn calculate_calibration(logs: &[FiringLog]) -> CalibrationResult {
    // 1. Filter out aborted/anomalous runs.
    let mut usable: Vec<&FiringLog> = logs
        .iter()
        .filter(|log| log.outcome.usable_for_timing())
        .collect();

    if usable.is_empty() {
        debug!(total = logs.len(), "No usable firing logs for calibration");
        return CalibrationResult::identity(
            "No completed firings on record yet — using the uncorrected theoretical estimate.",
        );
    }

    // 2. Chronological order, oldest first. The weighting below depends on
    //    this sort being correct.
    usable.sort_by_key(|log| log.timestamp);

    // 3-4. Ratios, with outlier rejection.
    let floor = cfg_outlier_floor();
    let ceiling = cfg_outlier_ceiling();
    let survivors: Vec<LogRatio> = usable
        .iter()
        .filter_map(|log| log_ratio(log))
        .filter(|r| r.ratio > floor && r.ratio < ceiling)
        .collect();

    if survivors.is_empty() {
        debug!(
            usable = usable.len(),
            "Every firing ratio rejected as an outlier"
        );
        return CalibrationResult::identity(format!(
            "Every recorded firing deviated more than {:.0}% from its baseline. \
             Inspect the thermocouple and kiln elements before trusting time estimates.",
            (ceiling - 1.0) * 100.0,
        ));
    }

    // 5. Exponential recency weighting over chronological order.
    let base = cfg_recency_base();
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut any_theoretical = false;
    for (index, entry) in survivors.iter().enumerate() {
        let weight = base.powi(index as i32);
        weighted_sum += entry.ratio * weight;
        weight_sum += weight;
        if entry.method == BaselineMethod::Theoretical {
            any_theoretical = true;
        }
    }

    let factor = round3(weighted_sum / weight_sum);
    let method = if any_theoretical {
        BaselineMethod::Theoretical
    } else {
        BaselineMethod::HistoricalEstimate
    };

    let percentage = ((factor - 1.0) * 100.0).round() as i64;
    let advice = if percentage.abs() < 1 {
        format!(
            "Kiln is well calibrated against the {} baseline ({} usable firings, factor {:.3}).",
            method,
            survivors.len(),
            factor,
        )
    } else if percentage > 0 {
        format!(
            "Kiln runs about {}% slower than the {} baseline; firing estimates have been extended (factor {:.3}).",
            percentage, method, factor,
        )
    } else {
        format!(
            "Kiln runs about {}% faster than the {} baseline; firing estimates have been shortened (factor {:.3}).",
            percentage.abs(), method, factor,
        )
    };

    debug!(
        factor,
        sample_count = survivors.len(),
        %method,
        "Calibration recomputed"
    );

    CalibrationResult {
        factor,
        advice,
        method,
        sample_count: survivors.len(),
    }
}

/// Round to 3 decimal places.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FiringOutcome;
    use chrono::{Duration, TimeZone, Utc};

    fn log_at(day: i64, predicted: f64, theoretical: Option<f64>, actual: f64) -> FiringLog {
        FiringLog {
            schedule_name: "test".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(day),
            predicted_duration: predicted,
            theoretical_duration: theoretical,
            actual_duration: actual,
            clay_weight_kg: None,
            sample_type: None,
            firing_stage: None,
            notes: String::new(),
            outcome: FiringOutcome::Perfect,
        }
    }

    #[test]
    fn test_empty_history_returns_identity() {
        let result = calculate_calibration(&[]);
        assert!((result.factor - 1.0).abs() < f64::EPSILON);
        assert!(result.advice.contains("No completed firings"));
        assert_eq!(result.sample_count, 0);
    }

    #[test]
    fn test_error_and_failure_logs_are_dropped() {
        let mut err = log_at(0, 500.0, Some(500.0), 550.0);
        err.outcome = FiringOutcome::Error;
        let mut fail = log_at(1, 500.0, Some(500.0), 450.0);
        fail.outcome = FiringOutcome::Failure;

        let result = calculate_calibration(&[err, fail]);
        assert!((result.factor - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.sample_count, 0);
    }

    #[test]
    fn test_two_log_weighted_mean() {
        // Oldest ratio 1.0, newest 1.2; weights 1 and 1.6:
        // (1.0 + 1.2*1.6) / 2.6 = 1.1230... -> 1.123
        let logs = [
            log_at(0, 500.0, Some(500.0), 500.0),
            log_at(1, 500.0, Some(500.0), 600.0),
        ];
        let result = calculate_calibration(&logs);
        assert!((result.factor - 1.123).abs() < 1e-9);
        assert_eq!(result.sample_count, 2);
        assert!(result.advice.contains("slower"));
        assert!(result.advice.contains("absolute theoretical"));
    }

    #[test]
    fn test_weighting_is_order_sensitive() {
        // Same multiset of ratios, reversed chronology: the factor must move,
        // proving recency weighting follows the timestamp sort.
        let forward = [
            log_at(0, 500.0, Some(500.0), 500.0),
            log_at(1, 500.0, Some(500.0), 600.0),
        ];
        let reversed = [
            log_at(0, 500.0, Some(500.0), 600.0),
            log_at(1, 500.0, Some(500.0), 500.0),
        ];
        let a = calculate_calibration(&forward).factor;
        let b = calculate_calibration(&reversed).factor;
        assert!((a - b).abs() > 0.01);
    }

    #[test]
    fn test_sort_ignores_slice_order() {
        // Shuffled input with the same timestamps must give the same factor.
        let l0 = log_at(0, 500.0, Some(500.0), 500.0);
        let l1 = log_at(1, 500.0, Some(500.0), 600.0);
        let a = calculate_calibration(&[l0.clone(), l1.clone()]).factor;
        let b = calculate_calibration(&[l1, l0]).factor;
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outlier_is_fully_excluded() {
        // A ratio-3.0 log injected into a tight history must not shift the
        // factor at all.
        let tight = [
            log_at(0, 500.0, Some(500.0), 525.0),
            log_at(1, 500.0, Some(500.0), 540.0),
            log_at(2, 500.0, Some(500.0), 530.0),
        ];
        let mut with_outlier = tight.to_vec();
        with_outlier.insert(1, log_at(0, 500.0, Some(500.0), 1500.0));

        let clean = calculate_calibration(&tight);
        let spiked = calculate_calibration(&with_outlier);
        assert!((clean.factor - spiked.factor).abs() < f64::EPSILON);
        assert_eq!(spiked.sample_count, 3);
    }

    #[test]
    fn test_all_outliers_recommend_inspection() {
        let logs = [
            log_at(0, 500.0, Some(500.0), 1500.0),
            log_at(1, 500.0, Some(500.0), 100.0),
        ];
        let result = calculate_calibration(&logs);
        assert!((result.factor - 1.0).abs() < f64::EPSILON);
        assert!(result.advice.contains("thermocouple"));
    }

    #[test]
    fn test_legacy_logs_fall_back_to_predicted() {
        // No theoretical duration: ratio comes from the predicted estimate,
        // and the advice names the historical baseline.
        let logs = [
            log_at(0, 500.0, None, 550.0),
            log_at(1, 520.0, None, 572.0),
        ];
        let result = calculate_calibration(&logs);
        assert!((result.factor - 1.1).abs() < 1e-9);
        assert!(result.advice.contains("historical estimate"));
        assert_eq!(result.method, BaselineMethod::HistoricalEstimate);
    }

    #[test]
    fn test_mixed_baselines_report_theoretical() {
        let logs = [
            log_at(0, 500.0, None, 550.0),
            log_at(1, 500.0, Some(500.0), 550.0),
        ];
        let result = calculate_calibration(&logs);
        assert_eq!(result.method, BaselineMethod::Theoretical);
        assert!(result.advice.contains("absolute theoretical"));
    }

    #[test]
    fn test_fast_kiln_shortens_estimates() {
        let logs = [
            log_at(0, 500.0, Some(500.0), 450.0),
            log_at(1, 500.0, Some(500.0), 440.0),
        ];
        let result = calculate_calibration(&logs);
        assert!(result.factor < 1.0);
        assert!(result.advice.contains("faster"));
        assert!(result.advice.contains("shortened"));
    }

    #[test]
    fn test_well_calibrated_within_one_percent() {
        let logs = [
            log_at(0, 500.0, Some(500.0), 501.0),
            log_at(1, 500.0, Some(500.0), 499.0),
        ];
        let result = calculate_calibration(&logs);
        assert!(result.advice.contains("well calibrated"));
    }

    #[test]
    fn test_zero_baseline_log_is_skipped() {
        let logs = [
            log_at(0, 0.0, None, 500.0),
            log_at(1, 500.0, Some(500.0), 525.0),
        ];
        let result = calculate_calibration(&logs);
        assert_eq!(result.sample_count, 1);
        assert!((result.factor - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_calibration_is_pure() {
        let logs = [
            log_at(0, 500.0, Some(500.0), 510.0),
            log_at(1, 500.0, Some(500.0), 560.0),
        ];
        assert_eq!(calculate_calibration(&logs), calculate_calibration(&logs));
    }
}
