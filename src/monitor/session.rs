//! Firing session lifecycle and the periodic sampling loop
//!
//! `start_firing` / `complete_firing` / `cancel_firing` tie the store and
//! notifier together around the `Idle → Running → {Completed, Cancelled}`
//! state machine. `FiringMonitor` is the recurring sampler: a plain
//! `tokio::time::interval` loop with cooperative cancellation, one sampler
//! per firing, one firing per session.
//!
//! A milestone's watermark is advanced through the store's compare-and-set
//! and only after the notification attempt, so independent pollers sharing
//! the persisted record (a remote scheduled job and a local session) neither
//! duplicate nor drop notifications.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config;
use crate::config::defaults;
use crate::notify::{self, Notifier};
use crate::storage::{FiringStore, StoreError};
use crate::thermal::theoretical_duration;
use crate::types::{ActiveFiring, FiringLog, FiringOutcome, FiringSchedule, FiringState};

use super::{evaluate_milestones, sample_firing};

// ============================================================================
// Lifecycle
// ============================================================================

/// Record a new active firing and announce it.
///
/// The schedule is frozen as-is; the watermark starts at zero.
pub async fn start_firing(
    store: &dyn FiringStore,
    notifier: &dyn Notifier,
    id: &str,
    schedule: FiringSchedule,
    now: DateTime<Utc>,
) -> Result<ActiveFiring, StoreError> {
    let firing = ActiveFiring {
        id: id.to_string(),
        schedule,
        started_at: now,
        state: FiringState::Running,
        watermark: 0,
    };
    store.set_active_firing(&firing)?;

    info!(
        firing_id = %firing.id,
        schedule = %firing.schedule.name,
        estimated_min = firing.schedule.estimated_duration_minutes,
        "Firing started"
    );
    notifier.send(&notify::firing_started(&firing)).await;

    Ok(firing)
}

/// Close out a running firing as completed, append its log, and announce the
/// summary. Returns `None` when no active firing exists under `id`.
pub async fn complete_firing(
    store: &dyn FiringStore,
    notifier: &dyn Notifier,
    id: &str,
    outcome: FiringOutcome,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<Option<FiringLog>, StoreError> {
    let Some(firing) = store.active_firing(id)? else {
        return Ok(None);
    };

    let log = close_out(&firing, outcome, notes, now);
    store.append_log(&log)?;
    store.clear_active_firing(id)?;

    info!(
        firing_id = %id,
        schedule = %log.schedule_name,
        actual_min = log.actual_duration,
        outcome = %log.outcome,
        "Firing completed"
    );
    notifier.send(&notify::firing_completed(&log)).await;

    Ok(Some(log))
}

/// Cancel a running firing. The log records a `Failure` outcome; sampling
/// stops because the active record is cleared. Any in-flight notification
/// from the sampler is disregarded, not aborted.
pub async fn cancel_firing(
    store: &dyn FiringStore,
    notifier: &dyn Notifier,
    id: &str,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<Option<FiringLog>, StoreError> {
    let Some(firing) = store.active_firing(id)? else {
        return Ok(None);
    };

    let log = close_out(&firing, FiringOutcome::Failure, notes, now);
    store.append_log(&log)?;
    store.clear_active_firing(id)?;

    info!(
        firing_id = %id,
        schedule = %log.schedule_name,
        elapsed_min = log.actual_duration,
        "Firing cancelled"
    );
    notifier.send(&notify::firing_cancelled(&log)).await;

    Ok(Some(log))
}

/// Build the append-only log record for a finished or aborted firing.
fn close_out(
    firing: &ActiveFiring,
    outcome: FiringOutcome,
    notes: &str,
    now: DateTime<Utc>,
) -> FiringLog {
    let actual = (now - firing.started_at).num_milliseconds() as f64 / 60_000.0;
    FiringLog {
        schedule_name: firing.schedule.name.clone(),
        timestamp: now,
        predicted_duration: f64::from(firing.schedule.estimated_duration_minutes),
        theoretical_duration: Some(f64::from(theoretical_duration(&firing.schedule.segments))),
        actual_duration: actual,
        clay_weight_kg: firing.schedule.clay_weight_kg,
        sample_type: firing.schedule.sample_type,
        firing_stage: firing.schedule.firing_stage,
        notes: notes.to_string(),
        outcome,
    }
}

// ============================================================================
// Firing Monitor
// ============================================================================

fn cfg_poll_interval() -> Duration {
    let secs = if config::is_initialized() {
        config::get().monitor.poll_interval_secs
    } else {
        defaults::POLL_INTERVAL_SECS
    };
    Duration::from_secs(secs.max(1))
}

/// Periodic sampler for one active firing.
///
/// Built with [`new()`](FiringMonitor::new), then consumed by
/// [`run()`](FiringMonitor::run), which samples until cancellation or until
/// the firing leaves the `Running` state.
pub struct FiringMonitor {
    store: Arc<dyn FiringStore>,
    notifier: Arc<dyn Notifier>,
    firing_id: String,
    poll_interval: Duration,
    cancel_token: CancellationToken,
}

impl FiringMonitor {
    pub fn new(
        store: Arc<dyn FiringStore>,
        notifier: Arc<dyn Notifier>,
        firing_id: impl Into<String>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            notifier,
            firing_id: firing_id.into(),
            poll_interval: cfg_poll_interval(),
            cancel_token,
        }
    }

    /// Override the sampling period (the config default suits a local
    /// session; a remote scheduled poller runs much coarser).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run the sampling loop until cancellation or until the firing is no
    /// longer running.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            firing_id = %self.firing_id,
            period_secs = self.poll_interval.as_secs(),
            "Firing monitor started"
        );

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!(firing_id = %self.firing_id, "Firing monitor cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if !self.tick(Utc::now()).await {
                        info!(firing_id = %self.firing_id, "Firing no longer running, monitor stopping");
                        break;
                    }
                }
            }
        }
    }

    /// One sampling tick. Returns false once the firing should no longer be
    /// sampled.
    async fn tick(&self, now: DateTime<Utc>) -> bool {
        let firing = match self.store.active_firing(&self.firing_id) {
            Ok(Some(f)) if f.state == FiringState::Running => f,
            Ok(_) => return false,
            Err(e) => {
                warn!(firing_id = %self.firing_id, error = %e, "Failed to read active firing");
                return true; // transient store error, keep sampling
            }
        };

        let sample = sample_firing(&firing.schedule, firing.started_at, now);
        debug!(
            firing_id = %self.firing_id,
            progress = format!("{:.1}%", sample.progress_percent),
            temp_c = sample.current_temp,
            remaining_min = format!("{:.0}", sample.remaining_minutes),
            "Sampled firing"
        );

        if let Some(milestone) = evaluate_milestones(&sample, firing.watermark) {
            // Notification attempt first; the watermark only advances once
            // the attempt has happened.
            let message = notify::milestone_reached(&firing, &milestone, &sample);
            self.notifier.send(&message).await;

            match self
                .store
                .update_watermark(&self.firing_id, firing.watermark, milestone.watermark)
            {
                Ok(true) => {
                    info!(
                        firing_id = %self.firing_id,
                        milestone = %milestone.kind,
                        watermark = milestone.watermark,
                        "Milestone notified"
                    );
                }
                Ok(false) => {
                    // Another poller advanced the watermark between our read
                    // and our write; its notification stands, ours is noise.
                    debug!(
                        firing_id = %self.firing_id,
                        milestone = %milestone.kind,
                        "Watermark CAS lost, another poller already notified"
                    );
                }
                Err(e) => {
                    warn!(firing_id = %self.firing_id, error = %e, "Failed to advance watermark");
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;
    use crate::storage::MemoryStore;
    use crate::types::FiringSegment;

    fn schedule() -> FiringSchedule {
        FiringSchedule {
            name: "bisque load".to_string(),
            segments: vec![FiringSegment::Ramp {
                rate: 100.0,
                target_temp: 600.0,
            }],
            estimated_duration_minutes: 345,
            clay_weight_kg: Some(3.0),
            sample_type: None,
            firing_stage: None,
        }
    }

    #[tokio::test]
    async fn test_start_then_complete_appends_log() {
        let store = MemoryStore::new();
        let notifier = NullNotifier;
        let started = Utc::now();

        start_firing(&store, &notifier, "f1", schedule(), started)
            .await
            .unwrap();
        assert!(store.active_firing("f1").unwrap().is_some());

        let log = complete_firing(
            &store,
            &notifier,
            "f1",
            FiringOutcome::Perfect,
            "even heat",
            started + chrono::Duration::minutes(360),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(store.active_firing("f1").unwrap().is_none());
        assert!((log.actual_duration - 360.0).abs() < 1e-9);
        assert_eq!(log.theoretical_duration, Some(345.0));
        assert_eq!(store.all_logs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_logs_failure() {
        let store = MemoryStore::new();
        let notifier = NullNotifier;
        let started = Utc::now();

        start_firing(&store, &notifier, "f1", schedule(), started)
            .await
            .unwrap();
        let log = cancel_firing(
            &store,
            &notifier,
            "f1",
            "power cut",
            started + chrono::Duration::minutes(90),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(log.outcome, FiringOutcome::Failure);
        assert_eq!(log.notes, "power cut");
        assert!(store.active_firing("f1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_without_active_firing_is_none() {
        let store = MemoryStore::new();
        let notifier = NullNotifier;
        let result = complete_firing(
            &store,
            &notifier,
            "ghost",
            FiringOutcome::Perfect,
            "",
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_tick_advances_watermark_once() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(NullNotifier);
        let started = Utc::now();

        start_firing(store.as_ref(), notifier.as_ref(), "f1", schedule(), started)
            .await
            .unwrap();

        let monitor = FiringMonitor::new(
            store.clone(),
            notifier,
            "f1",
            CancellationToken::new(),
        );

        // 55% through the 345-minute estimate.
        let now = started + chrono::Duration::minutes(190);
        assert!(monitor.tick(now).await);
        let firing = store.active_firing("f1").unwrap().unwrap();
        assert_eq!(firing.watermark, 50);

        // Same moment again: watermark already covers it.
        assert!(monitor.tick(now).await);
        let firing = store.active_firing("f1").unwrap().unwrap();
        assert_eq!(firing.watermark, 50);
    }

    #[tokio::test]
    async fn test_tick_stops_after_clear() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(NullNotifier);
        let monitor = FiringMonitor::new(
            store.clone(),
            notifier,
            "missing",
            CancellationToken::new(),
        );
        assert!(!monitor.tick(Utc::now()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_when_no_firing() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(NullNotifier);
        let monitor = FiringMonitor::new(
            store,
            notifier,
            "missing",
            CancellationToken::new(),
        )
        .with_poll_interval(Duration::from_secs(1));

        // First tick finds no active firing and the loop exits on its own.
        monitor.run().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_honors_cancellation() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(NullNotifier);
        let started = Utc::now();

        start_firing(store.as_ref(), &NullNotifier, "f1", schedule(), started)
            .await
            .unwrap();

        let token = CancellationToken::new();
        let monitor = FiringMonitor::new(store, notifier, "f1", token.clone())
            .with_poll_interval(Duration::from_secs(3600));

        let handle = tokio::spawn(monitor.run());
        token.cancel();
        handle.await.unwrap();
    }
}
