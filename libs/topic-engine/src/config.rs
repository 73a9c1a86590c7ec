use std::time::Duration;

use serde::Deserialize;

use crate::error::EngineError;

fn default_max_messages_per_topic() -> usize {
    100
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Engine settings. Fixed for the lifetime of a [`crate::Broker`].
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Retention bound: oldest messages beyond it are evicted.
    #[serde(default = "default_max_messages_per_topic")]
    pub max_messages_per_topic: usize,
    /// Delay between two polls of one subscription session.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_messages_per_topic: default_max_messages_per_topic(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_messages_per_topic == 0 {
            return Err(EngineError::Config(
                "max_messages_per_topic must be positive".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(EngineError::Config("poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
