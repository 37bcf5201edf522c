//! Studio Configuration - operator-tunable values loaded from TOML
//!
//! Every tunable that would otherwise be hardcoded is a field here. Each
//! section implements `Default` with values matching `config::defaults`, so
//! behavior is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a studio deployment.
///
/// Load with `StudioConfig::load()` which searches:
/// 1. `$KILNWATCH_CONFIG` env var
/// 2. `./studio_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Kiln identification
    #[serde(default)]
    pub kiln: KilnInfo,

    /// Calibration engine tuning
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Live monitor thresholds and polling
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Chat webhook delivery targets
    #[serde(default)]
    pub webhooks: WebhookConfig,
}

impl StudioConfig {
    /// Load configuration using the standard search order:
    /// 1. `$KILNWATCH_CONFIG` environment variable
    /// 2. `./studio_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("KILNWATCH_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), kiln = %config.kiln.name, "Loaded studio config from KILNWATCH_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from KILNWATCH_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "KILNWATCH_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("studio_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(kiln = %config.kiln.name, "Loaded studio config from ./studio_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./studio_config.toml, using defaults");
                }
            }
        }

        info!("No studio_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: StudioConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Sections
// ============================================================================

/// Kiln identification, used in notification titles and log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KilnInfo {
    /// Display name of the kiln
    #[serde(default = "default_kiln_name")]
    pub name: String,
}

fn default_kiln_name() -> String {
    "Studio kiln".to_string()
}

impl Default for KilnInfo {
    fn default() -> Self {
        Self {
            name: default_kiln_name(),
        }
    }
}

/// Calibration engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Exponential recency base for log weighting
    #[serde(default = "default_recency_base")]
    pub recency_base: f64,

    /// Ratios at or below this are rejected as anomalies
    #[serde(default = "default_outlier_floor")]
    pub outlier_ratio_floor: f64,

    /// Ratios at or above this are rejected as anomalies
    #[serde(default = "default_outlier_ceiling")]
    pub outlier_ratio_ceiling: f64,
}

fn default_recency_base() -> f64 {
    defaults::RECENCY_BASE
}

fn default_outlier_floor() -> f64 {
    defaults::OUTLIER_RATIO_FLOOR
}

fn default_outlier_ceiling() -> f64 {
    defaults::OUTLIER_RATIO_CEILING
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            recency_base: defaults::RECENCY_BASE,
            outlier_ratio_floor: defaults::OUTLIER_RATIO_FLOOR,
            outlier_ratio_ceiling: defaults::OUTLIER_RATIO_CEILING,
        }
    }
}

/// Live monitor thresholds and polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Progress percentages that trigger a milestone notification (ascending)
    #[serde(default = "default_progress_thresholds")]
    pub progress_thresholds: Vec<u8>,

    /// "Almost done" fires when this many minutes (or fewer) remain
    #[serde(default = "default_near_done_minutes")]
    pub near_done_minutes: f64,

    /// "Overdue" fires once the estimate is exceeded by more than this
    #[serde(default = "default_overdue_minutes")]
    pub overdue_minutes: f64,

    /// Sampler period in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_progress_thresholds() -> Vec<u8> {
    defaults::PROGRESS_THRESHOLDS.to_vec()
}

fn default_near_done_minutes() -> f64 {
    defaults::NEAR_DONE_MINUTES
}

fn default_overdue_minutes() -> f64 {
    defaults::OVERDUE_MINUTES
}

fn default_poll_interval_secs() -> u64 {
    defaults::POLL_INTERVAL_SECS
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            progress_thresholds: defaults::PROGRESS_THRESHOLDS.to_vec(),
            near_done_minutes: defaults::NEAR_DONE_MINUTES,
            overdue_minutes: defaults::OVERDUE_MINUTES,
            poll_interval_secs: defaults::POLL_INTERVAL_SECS,
        }
    }
}

/// Chat webhook delivery targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URLs to post progress embeds to (zero or more)
    #[serde(default)]
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = StudioConfig::default();
        assert!((config.calibration.recency_base - defaults::RECENCY_BASE).abs() < f64::EPSILON);
        assert_eq!(
            config.monitor.progress_thresholds,
            defaults::PROGRESS_THRESHOLDS.to_vec()
        );
        assert!(config.webhooks.urls.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [kiln]
            name = "Big Blue"

            [monitor]
            progress_thresholds = [25, 50, 75, 90]
        "#;
        let config: StudioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.kiln.name, "Big Blue");
        assert_eq!(config.monitor.progress_thresholds, vec![25, 50, 75, 90]);
        // Unspecified sections keep built-in defaults
        assert!((config.monitor.near_done_minutes - defaults::NEAR_DONE_MINUTES).abs() < f64::EPSILON);
        assert!((config.calibration.recency_base - defaults::RECENCY_BASE).abs() < f64::EPSILON);
    }
}
