//! Webhook delivery - posts embed payloads to chat webhooks
//!
//! Speaks the Discord-compatible embed format, which several chat products
//! accept. Delivery is best-effort: each configured URL gets one attempt per
//! message, failures are logged and never retried (the next milestone will
//! carry fresher information anyway).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use super::{Notifier, NotifyMessage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts notification embeds to one or more chat webhook URLs
pub struct WebhookNotifier {
    client: reqwest::Client,
    urls: Vec<String>,
}

impl WebhookNotifier {
    /// Build a notifier for the given webhook URLs.
    ///
    /// Returns an error only when the HTTP client itself cannot be
    /// constructed; an empty URL list is valid and simply delivers nowhere.
    pub fn new(urls: Vec<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, urls })
    }

    /// Number of configured delivery targets
    pub fn target_count(&self) -> usize {
        self.urls.len()
    }

    fn payload(message: &NotifyMessage) -> serde_json::Value {
        json!({
            "embeds": [{
                "title": message.title,
                "color": message.color,
                "fields": message
                    .fields
                    .iter()
                    .map(|f| json!({ "name": f.name, "value": f.value, "inline": true }))
                    .collect::<Vec<_>>(),
                "timestamp": message.timestamp.to_rfc3339(),
            }]
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &NotifyMessage) -> bool {
        if self.urls.is_empty() {
            debug!(title = %message.title, "No webhook URLs configured, skipping delivery");
            return false;
        }

        let payload = Self::payload(message);
        let mut delivered = false;

        for url in &self.urls {
            match self.client.post(url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(title = %message.title, "Webhook delivered");
                    delivered = true;
                }
                Ok(response) => {
                    warn!(
                        status = %response.status(),
                        title = %message.title,
                        "Webhook rejected notification"
                    );
                }
                Err(e) => {
                    warn!(error = %e, title = %message.title, "Webhook delivery failed");
                }
            }
        }

        delivered
    }

    fn channel_name(&self) -> &'static str {
        "webhook"
    }
}
