//! Configuration loading.
//!
//! [`EngineConfig`] carries the resolved engine policy: the night window,
//! the surcharge stacking policy, the reminder cool-down, the signing token
//! TTL and the report cache TTL. It is loaded from a YAML file or built
//! from the documented defaults.

use std::fs;
use std::path::Path;

use chrono::Duration;

use crate::error::{EngineError, EngineResult};
use crate::payroll::{NightWindow, StackingPolicy};
use crate::workflow::DEFAULT_REMINDER_COOLDOWN_DAYS;

use super::types::{EngineConfigFile, StackingMode};

/// Resolved engine policy configuration.
///
/// # Example
///
/// ```no_run
/// use timesheet_engine::config::EngineConfig;
///
/// let config = EngineConfig::load("./config/engine.yaml")?;
/// # Ok::<(), timesheet_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The nightly surcharge window.
    pub night_window: NightWindow,
    /// How overlapping surcharges stack.
    pub stacking: StackingPolicy,
    /// Cool-down between recipient reminders.
    pub reminder_cooldown: Duration,
    /// Validity of minted signing tokens.
    pub token_ttl: Duration,
    /// Time-to-live of cached pay reports.
    pub report_cache_ttl: std::time::Duration,
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;
        let file: EngineConfigFile =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        Self::resolve(file, &path_str)
    }

    fn resolve(file: EngineConfigFile, path: &str) -> EngineResult<Self> {
        let night_window = NightWindow::new(
            &file.policy.night_window.start,
            &file.policy.night_window.end,
        )?;

        let stacking = match file.policy.stacking.mode {
            StackingMode::Additive => StackingPolicy::Additive,
            StackingMode::Capped => {
                let cap = file.policy.stacking.cap_percent.ok_or_else(|| {
                    EngineError::ConfigParseError {
                        path: path.to_string(),
                        message: "stacking mode 'capped' requires cap_percent".to_string(),
                    }
                })?;
                StackingPolicy::CappedPercent(cap)
            }
        };

        Ok(Self {
            night_window,
            stacking,
            reminder_cooldown: Duration::days(file.reminders.cooldown_days),
            token_ttl: Duration::days(file.tokens.ttl_days),
            report_cache_ttl: std::time::Duration::from_secs(file.cache.report_ttl_seconds),
        })
    }
}

impl Default for EngineConfig {
    /// The documented defaults: 22:00-06:00 night window, additive
    /// stacking, 2-day reminder cool-down, 14-day tokens, 5-minute report
    /// cache.
    fn default() -> Self {
        Self {
            night_window: NightWindow::default(),
            stacking: StackingPolicy::Additive,
            reminder_cooldown: Duration::days(DEFAULT_REMINDER_COOLDOWN_DAYS),
            token_ttl: Duration::days(14),
            report_cache_ttl: std::time::Duration::from_secs(300),
        }
    }
}
