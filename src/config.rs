//! Tracker configuration, settable from the page through `configure(json)`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// How long the page shows the "rolling" state before the roll settles.
    pub roll_delay_ms: u64,
    /// Die size used for initiative.
    pub die_sides: u32,
    /// Largest `amount` a single add request may create.
    pub max_batch: usize,
    /// Dark mode when nothing is stored yet.
    pub default_dark_mode: bool,
    /// `tracing` filter directive passed to `init_logging`.
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            roll_delay_ms: 1_000,
            die_sides: 20,
            max_batch: 100,
            default_dark_mode: true,
            log_filter: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: TrackerConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid tracker config: {}", e))?;
        if config.die_sides == 0 {
            return Err("Invalid tracker config: die_sides must be at least 1".to_string());
        }
        if config.max_batch == 0 {
            return Err("Invalid tracker config: max_batch must be at least 1".to_string());
        }
        Ok(config)
    }
}

thread_local! {
    static CONFIG: RefCell<TrackerConfig> = RefCell::new(TrackerConfig::default());
}

/// Copy of the active configuration.
pub fn current() -> TrackerConfig {
    CONFIG.with(|c| c.borrow().clone())
}

/// Replace the active configuration from JSON. Leaves it untouched on error.
pub fn apply_json(json: &str) -> Result<(), String> {
    let config = TrackerConfig::from_json(json)?;
    CONFIG.with(|c| *c.borrow_mut() = config);
    Ok(())
}

pub fn reset() {
    CONFIG.with(|c| *c.borrow_mut() = TrackerConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config = TrackerConfig::from_json(r#"{"roll_delay_ms": 250}"#).unwrap();
        assert_eq!(config.roll_delay_ms, 250);
        assert_eq!(config.die_sides, 20);
        assert_eq!(config.max_batch, 100);
        assert!(config.default_dark_mode);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_sides() {
        assert!(TrackerConfig::from_json(r#"{"roll_delay": 5}"#).is_err());
        assert!(TrackerConfig::from_json(r#"{"die_sides": 0}"#).is_err());
        assert!(TrackerConfig::from_json(r#"{"max_batch": 0}"#).is_err());
    }

    #[test]
    fn apply_json_keeps_previous_on_error() {
        reset();
        apply_json(r#"{"die_sides": 12}"#).unwrap();
        assert!(apply_json("not json").is_err());
        assert_eq!(current().die_sides, 12);
        reset();
        assert_eq!(current(), TrackerConfig::default());
    }
}
