//! Configuration types for monitor settings
//!
//! This module defines the configuration structs loaded from YAML. Every
//! field has a default, so an empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::adapters::factory::SUPPORTED_SOURCES;
use crate::core::aggregator::DEFAULT_FETCH_TIMEOUT_MS;
use crate::core::digest::DEFAULT_UTC_OFFSET_HOURS;
use crate::core::gate::{
    CooldownPolicy, DEFAULT_COOLDOWN_MS, DEFAULT_RETENTION_WINDOWS, DEFAULT_TOP_N,
};
use crate::core::monitor::MonitorSettings;
use crate::core::ranker::DEFAULT_THRESHOLD;
use crate::error::AppError;

/// Environment variable overriding `notifier.wechat_webhook`
pub const WEBHOOK_ENV: &str = "WECHAT_WEBHOOK";

// ============================================================================
// Defaults
// ============================================================================

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_cooldown_secs() -> u64 {
    DEFAULT_COOLDOWN_MS / 1000
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_cycle_interval_secs() -> u64 {
    10
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_retention_windows() -> u32 {
    DEFAULT_RETENTION_WINDOWS
}

fn default_utc_offset_hours() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}

fn default_sources() -> Vec<String> {
    SUPPORTED_SOURCES.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Detection, gating and scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Minimum net profit as a fraction (0.004 = 0.4%)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Cooldown per (symbol, high, low) key, seconds
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Opportunities per digest
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Seconds between aggregation cycles
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// Seconds between schedule refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Per-source fetch deadline, milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Cooldown ledger retention, in cooldown windows
    #[serde(default = "default_retention_windows")]
    pub ledger_retention_windows: u32,
    /// Display offset for digest timestamps
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            cooldown_secs: default_cooldown_secs(),
            top_n: default_top_n(),
            cycle_interval_secs: default_cycle_interval_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            ledger_retention_windows: default_retention_windows(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl MonitorConfig {
    /// Validate monitor configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: threshold is a finite fraction in [0, 1)
        if !self.threshold.is_finite() || self.threshold < 0.0 || self.threshold >= 1.0 {
            return Err(AppError::Config(format!(
                "threshold must be in [0, 1) (got {})",
                self.threshold
            )));
        }

        if self.cooldown_secs == 0 {
            return Err(AppError::Config("cooldown_secs must be > 0".to_string()));
        }

        if self.top_n == 0 {
            return Err(AppError::Config("top_n must be >= 1".to_string()));
        }

        if self.cycle_interval_secs == 0 || self.refresh_interval_secs == 0 {
            return Err(AppError::Config(format!(
                "cycle_interval_secs and refresh_interval_secs must be > 0 (got {} and {})",
                self.cycle_interval_secs, self.refresh_interval_secs
            )));
        }

        if self.fetch_timeout_ms == 0 {
            return Err(AppError::Config("fetch_timeout_ms must be > 0".to_string()));
        }

        if self.ledger_retention_windows == 0 {
            return Err(AppError::Config(
                "ledger_retention_windows must be >= 1".to_string(),
            ));
        }

        // Rule: a real-world UTC offset
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(AppError::Config(format!(
                "utc_offset_hours must be between -12 and 14 (got {})",
                self.utc_offset_hours
            )));
        }

        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Notification transport settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// WeChat Work robot webhook URL; absent means detection-only
    #[serde(default)]
    pub wechat_webhook: Option<String>,
}

/// Root configuration structure loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Source names, see `SUPPORTED_SOURCES`
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            sources: default_sources(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        self.monitor.validate()?;

        if self.sources.is_empty() {
            return Err(AppError::Config(
                "At least one source must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.sources {
            if !SUPPORTED_SOURCES.contains(&name.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown source '{}' (supported: {})",
                    name,
                    SUPPORTED_SOURCES.join(", ")
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(AppError::Config(format!("Duplicate source '{}'", name)));
            }
        }

        Ok(())
    }

    /// Apply environment overrides (`WECHAT_WEBHOOK`).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV) {
            if !url.trim().is_empty() {
                self.notifier.wechat_webhook = Some(url.trim().to_string());
            }
        }
    }

    /// Configured webhook, None when missing or blank
    pub fn webhook(&self) -> Option<&str> {
        self.notifier
            .wechat_webhook
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Runtime settings for the monitor
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            threshold: self.monitor.threshold,
            cooldown: CooldownPolicy {
                cooldown_ms: self.monitor.cooldown_secs.saturating_mul(1000),
                top_n: self.monitor.top_n,
                retention_windows: self.monitor.ledger_retention_windows,
            },
            fetch_timeout: Duration::from_millis(self.monitor.fetch_timeout_ms),
            utc_offset_hours: self.monitor.utc_offset_hours,
        }
    }
}
