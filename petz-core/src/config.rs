//! Configuration for the PETZ simulation.
//!
//! Maps directly to `petz.toml`. Every section and field has a default, so an
//! empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::types::{HOUR_MS, MAX_STAT};

/// Top-level PETZ configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetzConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Tunable simulation rules.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl PetzConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PetzError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PetzError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How often the host fires a background tick, in seconds.
    #[serde(default = "default_60")]
    pub tick_interval_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_interval_seconds: 60,
        }
    }
}

/// Simulation rules that are safe to tune without breaking invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// How long both needs must stay capped before the pet dies.
    #[serde(default = "default_168")]
    pub overload_duration_hours: u32,
    /// Need level at which the pet complains.
    #[serde(default = "default_15")]
    pub warn_threshold: u8,
}

impl RulesConfig {
    /// Overload duration in milliseconds.
    #[must_use]
    pub fn overload_duration_ms(&self) -> i64 {
        i64::from(self.overload_duration_hours) * HOUR_MS
    }

    /// Warning threshold, clamped into the stat range.
    #[must_use]
    pub fn warn_threshold(&self) -> u8 {
        self.warn_threshold.min(MAX_STAT)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            overload_duration_hours: 168,
            warn_threshold: 15,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "sqlite" or "memory" (nothing survives the process).
    #[serde(default = "default_sqlite")]
    pub backend: String,
    /// Save file location for the sqlite backend.
    #[serde(default = "default_path")]
    pub path: String,
    /// Versioned key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Use WAL mode for the sqlite backend.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            path: "petz.db".to_string(),
            storage_key: "petz-state-v1".to_string(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_sqlite() -> String { "sqlite".to_string() }
fn default_path() -> String { "petz.db".to_string() }
fn default_storage_key() -> String { "petz-state-v1".to_string() }
fn default_15() -> u8 { 15 }
fn default_60() -> u64 { 60 }
fn default_168() -> u32 { 168 }
