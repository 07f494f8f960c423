//! Heartbeat scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Heartbeat broadcast configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    /// Broadcast period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl HeartbeatConfig {
    /// The broadcast period as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate heartbeat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_ms == 0 {
            return Err(ValidationError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}
