//! Run parameters supplied by the front-end.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest delay between two scheduled steps.
pub const MIN_DELAY_MS: u64 = 50;
/// Longest delay between two scheduled steps.
pub const MAX_DELAY_MS: u64 = 2000;
pub const DEFAULT_DELAY_MS: u64 = 500;
/// Increment used by speed controls.
pub const DELAY_STEP_MS: u64 = 50;

/// Settings for the timed run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Delay before each scheduled step, in milliseconds. Out-of-range values are
    /// clamped into `MIN_DELAY_MS..=MAX_DELAY_MS` when used.
    pub delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl RunConfig {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: clamp(delay_ms),
        }
    }

    /// The effective inter-step delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(clamp(self.delay_ms))
    }

    /// One speed notch faster (shorter delay).
    pub fn faster(self) -> Self {
        Self::new(clamp(self.delay_ms).saturating_sub(DELAY_STEP_MS))
    }

    /// One speed notch slower (longer delay).
    pub fn slower(self) -> Self {
        Self::new(clamp(self.delay_ms).saturating_add(DELAY_STEP_MS))
    }
}

fn clamp(delay_ms: u64) -> u64 {
    delay_ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_is_clamped() {
        assert_eq!(RunConfig::new(0).delay_ms, MIN_DELAY_MS);
        assert_eq!(RunConfig::new(60_000).delay_ms, MAX_DELAY_MS);
        assert_eq!(RunConfig::new(300).delay(), Duration::from_millis(300));

        let raw = RunConfig { delay_ms: 1 };
        assert_eq!(raw.delay(), Duration::from_millis(MIN_DELAY_MS));
    }

    #[test]
    fn test_speed_notches_stay_in_range() {
        let config = RunConfig::default();
        assert_eq!(config.faster().delay_ms, DEFAULT_DELAY_MS - DELAY_STEP_MS);
        assert_eq!(config.slower().delay_ms, DEFAULT_DELAY_MS + DELAY_STEP_MS);

        assert_eq!(RunConfig::new(MIN_DELAY_MS).faster().delay_ms, MIN_DELAY_MS);
        assert_eq!(RunConfig::new(MAX_DELAY_MS).slower().delay_ms, MAX_DELAY_MS);
    }

    #[test]
    fn test_deserialize_uses_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());

        let config: RunConfig = serde_json::from_str(r#"{"delay_ms": 150}"#).unwrap();
        assert_eq!(config.delay(), Duration::from_millis(150));
    }
}
