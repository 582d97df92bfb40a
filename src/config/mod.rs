//! Engine policy configuration.
//!
//! The engine's tunable policy — night window, surcharge stacking, reminder
//! cool-down, token TTL, report cache TTL — is loaded from a YAML file; see
//! `config/engine.yaml` for the shipped defaults.

mod loader;
mod types;

pub use loader::EngineConfig;
pub use types::{
    CacheSection, EngineConfigFile, NightWindowSection, PolicySection, ReminderSection,
    StackingMode, StackingSection, TokenSection,
};
