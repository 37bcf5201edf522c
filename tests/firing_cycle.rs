//! End-to-end firing cycle
//!
//! Drives the full loop with synthetic timestamps: generate a schedule,
//! start a firing, sample it across the whole run, complete it, and feed
//! the resulting log back into calibration. A recording notifier captures
//! every message so the milestone sequence can be asserted exactly.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use kilnwatch::{
    calculate_calibration, complete_firing, evaluate_milestones, generate, notify, sample_firing,
    start_firing, BaselineMethod, FiringOutcome, FiringStage, FiringStore, MemoryStore, Notifier,
    NotifyMessage, SampleType,
};

/// Captures message titles instead of delivering them.
struct RecordingNotifier {
    titles: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            titles: Mutex::new(Vec::new()),
        }
    }

    fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &NotifyMessage) -> bool {
        self.titles.lock().unwrap().push(message.title.clone());
        true
    }

    fn channel_name(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test]
async fn test_full_firing_cycle_with_milestones() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();

    let recommendation = generate(SampleType::Standard, FiringStage::Bisque, 3.0);
    assert!(recommendation.warnings.is_empty());
    let schedule =
        recommendation.into_schedule("cycle test", SampleType::Standard, FiringStage::Bisque, 3.0);
    let estimated = schedule.estimated_duration_minutes;
    assert!(estimated > 0);

    let started = Utc::now();
    start_firing(&store, &notifier, "f1", schedule, started)
        .await
        .unwrap();

    // Sample every 5 simulated minutes, past the estimate so overdue fires.
    let horizon = i64::from(estimated) + 20;
    let mut elapsed = 0i64;
    while elapsed <= horizon {
        let now = started + Duration::minutes(elapsed);
        let firing = store.active_firing("f1").unwrap().unwrap();
        let sample = sample_firing(&firing.schedule, firing.started_at, now);

        if let Some(milestone) = evaluate_milestones(&sample, firing.watermark) {
            notifier
                .send(&notify::milestone_reached(&firing, &milestone, &sample))
                .await;
            assert!(store
                .update_watermark("f1", firing.watermark, milestone.watermark)
                .unwrap());
        }
        elapsed += 5;
    }

    // The watermark walked the full ladder without skipping or repeating.
    let firing = store.active_firing("f1").unwrap().unwrap();
    assert_eq!(firing.watermark, 100);

    let log = complete_firing(
        &store,
        &notifier,
        "f1",
        FiringOutcome::Perfect,
        "",
        started + Duration::minutes(horizon),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(store.active_firing("f1").unwrap().is_none());
    assert!(log.theoretical_duration.is_some());

    let titles = notifier.titles();
    // started, 50%, 75%, 90%, almost done, overdue, completed
    assert_eq!(titles.len(), 7);
    assert!(titles[0].contains("Firing started"));
    assert!(titles[1].contains("50% complete"));
    assert!(titles[2].contains("75% complete"));
    assert!(titles[3].contains("90% complete"));
    assert!(titles[4].contains("nearly complete"));
    assert!(titles[5].contains("running over"));
    assert!(titles[6].contains("Firing complete"));
}

#[tokio::test]
async fn test_completed_log_feeds_calibration() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();

    let recommendation = generate(SampleType::Thick, FiringStage::Glaze, 6.0);
    let schedule =
        recommendation.into_schedule("glaze load", SampleType::Thick, FiringStage::Glaze, 6.0);

    let started = Utc::now();
    start_firing(&store, &notifier, "f1", schedule, started)
        .await
        .unwrap();

    // Finished 10% over the theoretical profile.
    let log = complete_firing(
        &store,
        &notifier,
        "f1",
        FiringOutcome::Perfect,
        "",
        started + Duration::minutes(600),
    )
    .await
    .unwrap()
    .unwrap();

    let theoretical = log.theoretical_duration.unwrap();
    assert!(theoretical > 0.0);

    let result = calculate_calibration(&store.all_logs().unwrap());
    assert_eq!(result.sample_count, 1);
    assert_eq!(result.method, BaselineMethod::Theoretical);
    let expected = (600.0 / theoretical * 1000.0).round() / 1000.0;
    assert!((result.factor - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_cancelled_firing_never_reaches_calibration() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();

    let recommendation = generate(SampleType::Standard, FiringStage::Bisque, 2.0);
    let schedule =
        recommendation.into_schedule("aborted", SampleType::Standard, FiringStage::Bisque, 2.0);

    let started = Utc::now();
    start_firing(&store, &notifier, "f1", schedule, started)
        .await
        .unwrap();
    kilnwatch::cancel_firing(
        &store,
        &notifier,
        "f1",
        "element failure",
        started + Duration::minutes(45),
    )
    .await
    .unwrap()
    .unwrap();

    // The failure is logged but contributes no timing sample.
    assert_eq!(store.all_logs().unwrap().len(), 1);
    let result = calculate_calibration(&store.all_logs().unwrap());
    assert_eq!(result.sample_count, 0);
    assert!((result.factor - 1.0).abs() < f64::EPSILON);

    let titles = notifier.titles();
    assert!(titles.last().unwrap().contains("Firing cancelled"));
}
