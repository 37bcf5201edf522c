//! Notification collaborator - best-effort chat delivery
//!
//! The core hands fully formatted payloads (title, color, field list,
//! timestamp) to a `Notifier`; delivery is fire-and-forget and a failure
//! never blocks or rolls back a firing's logical state. `WebhookNotifier`
//! posts embeds to configured chat webhooks; `NullNotifier` swallows
//! messages for headless and test runs.

pub mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::monitor::{Milestone, MilestoneKind, MonitorSample};
use crate::types::{ActiveFiring, FiringLog, FiringOutcome};

// ============================================================================
// Message Model
// ============================================================================

/// Embed colors per event kind
pub const COLOR_START: u32 = 0x3498DB;
pub const COLOR_PROGRESS: u32 = 0x2ECC71;
pub const COLOR_ALMOST_DONE: u32 = 0xF1C40F;
pub const COLOR_OVERDUE: u32 = 0xE74C3C;
pub const COLOR_COMPLETED: u32 = 0x9B59B6;
pub const COLOR_CANCELLED: u32 = 0x95A5A6;

/// One name/value pair in an embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyField {
    pub name: String,
    pub value: String,
}

impl NotifyField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A fully formatted notification payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyMessage {
    pub title: String,
    pub color: u32,
    pub fields: Vec<NotifyField>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Notifier Trait
// ============================================================================

/// Best-effort message delivery to zero or more chat channels.
///
/// `send` returns whether at least one delivery attempt succeeded; callers
/// may log the result but must never let it affect firing state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotifyMessage) -> bool;

    /// Channel name for logging
    fn channel_name(&self) -> &'static str;
}

/// Swallows every message. For headless runs and tests.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, message: &NotifyMessage) -> bool {
        debug!(title = %message.title, "Notification suppressed (null notifier)");
        true
    }

    fn channel_name(&self) -> &'static str {
        "null"
    }
}

// ============================================================================
// Message Builders
// ============================================================================

/// Minutes rendered as "Xh Ym" for embeds.
fn format_minutes(minutes: f64) -> String {
    let total = minutes.round().abs() as i64;
    let sign = if minutes < 0.0 { "-" } else { "" };
    format!("{}{}h {:02}m", sign, total / 60, total % 60)
}

/// Announcement posted when a firing starts.
pub fn firing_started(firing: &ActiveFiring) -> NotifyMessage {
    NotifyMessage {
        title: format!("🔥 Firing started: {}", firing.schedule.name),
        color: COLOR_START,
        fields: vec![
            NotifyField::new(
                "Estimated duration",
                format_minutes(f64::from(firing.schedule.estimated_duration_minutes)),
            ),
            NotifyField::new("Segments", firing.schedule.segments.len().to_string()),
        ],
        timestamp: firing.started_at,
    }
}

/// Milestone notification (progress threshold, almost done, or overdue).
pub fn milestone_reached(
    firing: &ActiveFiring,
    milestone: &Milestone,
    sample: &MonitorSample,
) -> NotifyMessage {
    let (title, color) = match milestone.kind {
        MilestoneKind::Progress(pct) => (
            format!("⏳ {}: {pct}% complete", firing.schedule.name),
            COLOR_PROGRESS,
        ),
        MilestoneKind::AlmostDone => (
            format!("🏁 {}: nearly complete", firing.schedule.name),
            COLOR_ALMOST_DONE,
        ),
        MilestoneKind::Overdue => (
            format!("⚠️ {}: running over its estimate", firing.schedule.name),
            COLOR_OVERDUE,
        ),
    };

    NotifyMessage {
        title,
        color,
        fields: vec![
            NotifyField::new("Elapsed", format_minutes(sample.elapsed_minutes)),
            NotifyField::new("Remaining", format_minutes(sample.remaining_minutes)),
            NotifyField::new(
                "Simulated temperature",
                format!("{:.0} °C", sample.current_temp),
            ),
        ],
        timestamp: Utc::now(),
    }
}

/// Final summary posted at completion.
pub fn firing_completed(log: &FiringLog) -> NotifyMessage {
    let delta = log.actual_duration - log.predicted_duration;
    NotifyMessage {
        title: format!("✅ Firing complete: {}", log.schedule_name),
        color: completion_color(log.outcome),
        fields: vec![
            NotifyField::new("Outcome", log.outcome.to_string()),
            NotifyField::new("Actual duration", format_minutes(log.actual_duration)),
            NotifyField::new("Predicted", format_minutes(log.predicted_duration)),
            NotifyField::new(
                "Versus estimate",
                format!(
                    "{}{}",
                    if delta >= 0.0 { "+" } else { "" },
                    format_minutes(delta)
                ),
            ),
        ],
        timestamp: log.timestamp,
    }
}

/// Final summary posted at cancellation.
pub fn firing_cancelled(log: &FiringLog) -> NotifyMessage {
    let mut fields = vec![NotifyField::new(
        "Elapsed before stop",
        format_minutes(log.actual_duration),
    )];
    if !log.notes.is_empty() {
        fields.push(NotifyField::new("Notes", log.notes.clone()));
    }

    NotifyMessage {
        title: format!("🛑 Firing cancelled: {}", log.schedule_name),
        color: COLOR_CANCELLED,
        fields,
        timestamp: log.timestamp,
    }
}

fn completion_color(outcome: FiringOutcome) -> u32 {
    match outcome {
        FiringOutcome::Perfect => COLOR_COMPLETED,
        FiringOutcome::Underfired | FiringOutcome::Overfired => COLOR_ALMOST_DONE,
        FiringOutcome::Error | FiringOutcome::Failure => COLOR_OVERDUE,
    }
}
