//! Configuration file structures.
//!
//! These types mirror the YAML layout of `engine.yaml` and are resolved
//! into the runtime [`EngineConfig`](super::EngineConfig) by the loader.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root structure of `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfigFile {
    /// Surcharge policy settings.
    pub policy: PolicySection,
    /// Reminder sweep settings.
    pub reminders: ReminderSection,
    /// Signing token settings.
    pub tokens: TokenSection,
    /// Report cache settings.
    pub cache: CacheSection,
}

/// Surcharge policy section.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    /// Boundaries of the nightly surcharge window.
    pub night_window: NightWindowSection,
    /// How overlapping surcharges stack.
    pub stacking: StackingSection,
}

/// Night window boundaries as "HH:MM" strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NightWindowSection {
    /// Window start, e.g. "22:00".
    pub start: String,
    /// Window end, e.g. "06:00".
    pub end: String,
}

/// Stacking mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingMode {
    /// Overlapping surcharges add up uncapped.
    Additive,
    /// The combined percentage is capped at `cap_percent`.
    Capped,
}

/// Stacking policy section.
#[derive(Debug, Clone, Deserialize)]
pub struct StackingSection {
    /// The selected mode.
    pub mode: StackingMode,
    /// Combined percentage ceiling; required for the capped mode.
    #[serde(default)]
    pub cap_percent: Option<Decimal>,
}

/// Reminder sweep section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderSection {
    /// Cool-down between reminders, in days.
    pub cooldown_days: i64,
}

/// Signing token section.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSection {
    /// Token validity, in days.
    pub ttl_days: i64,
}

/// Report cache section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Time-to-live of cached pay reports, in seconds.
    pub report_ttl_seconds: u64,
}
