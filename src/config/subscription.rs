//! Workload subscription settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the workload subscription behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Fixed delay between reconnection attempts.
    pub reconnect_delay_ms: u64,
    /// How long one-shot commands wait for the subscription and the reply.
    pub command_timeout_seconds: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 5000,
            command_timeout_seconds: 10,
        }
    }
}

impl SubscriptionConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}
