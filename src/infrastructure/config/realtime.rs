//! Push channel reconnection and heartbeat configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Realtime client tunables.
///
/// Reconnection uses a fixed delay with no backoff growth.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealtimeConfig {
    /// Delay before each automatic reconnection attempt (milliseconds).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Automatic attempts allowed before giving up until the next `connect()`.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Interval between heartbeat pings once connected (milliseconds).
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

const fn default_reconnect_delay_ms() -> u64 {
    3000
}

const fn default_max_reconnect_attempts() -> u32 {
    5
}

const fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

impl RealtimeConfig {
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Heartbeat period, never shorter than one millisecond.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        if self.heartbeat_interval_ms == 0 {
            return Duration::from_millis(1);
        }
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_heartbeat_is_clamped() {
        let config = RealtimeConfig {
            heartbeat_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.heartbeat_interval(), Duration::from_millis(1));
    }

    #[test]
    fn defaults() {
        let config = RealtimeConfig::default();
        assert_eq!(config.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(30));
    }
}
