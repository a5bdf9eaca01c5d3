//! Conversation context configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// History entries kept per conversation
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Idle time after which a context is dropped, in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How often stale contexts are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Platform recorded when the inbound message names none
    #[serde(default = "default_platform")]
    pub default_platform: String,
}

impl ContextConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        if self.ttl_secs == 0 || self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            ttl_secs: default_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            default_platform: default_platform(),
        }
    }
}

fn default_history_window() -> usize {
    crate::domain::context::DEFAULT_HISTORY_WINDOW
}

fn default_ttl() -> u64 {
    24 * 3600
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_platform() -> String {
    "web".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.history_window, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ContextConfig {
            history_window: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidHistoryWindow)
        ));
    }
}
