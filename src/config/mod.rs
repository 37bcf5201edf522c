//! Studio Configuration Module
//!
//! Per-studio configuration loaded from TOML, replacing ambient globals and
//! hardcoded thresholds with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `KILNWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `studio_config.toml` in the current working directory
//! 3. Built-in defaults (see `config::defaults`)
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(StudioConfig::load());
//!
//! // Anywhere in the codebase:
//! let base = config::get().calibration.recency_base;
//! ```

pub mod defaults;
mod studio_config;

pub use studio_config::*;

use std::sync::OnceLock;

/// Global studio configuration, initialized once at startup.
static STUDIO_CONFIG: OnceLock<StudioConfig> = OnceLock::new();

/// Initialize the global studio configuration.
///
/// Must be called exactly once before any calls to `get()`.
pub fn init(config: StudioConfig) {
    if STUDIO_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global studio configuration.
///
/// Panics if `init()` has not been called. This is by design — a missing
/// config is a fatal startup error, not a recoverable condition.
pub fn get() -> &'static StudioConfig {
    STUDIO_CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

/// Check whether the config has been initialized.
///
/// Useful for tests and library embedders that never call `init()`.
pub fn is_initialized() -> bool {
    STUDIO_CONFIG.get().is_some()
}
