//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::infrastructure::config::dashboard::DashboardConfig;
use crate::infrastructure::config::realtime::RealtimeConfig;
use crate::infrastructure::config::settings::Config;

/// Fast realtime config: millisecond reconnect delay, default attempt cap.
///
/// The heartbeat is long enough that no ping lands in a test's sent frames
/// unless the test asks for one with [`realtime_with_heartbeat`].
pub fn realtime() -> RealtimeConfig {
    RealtimeConfig {
        reconnect_delay_ms: 10,
        max_reconnect_attempts: 5,
        heartbeat_interval_ms: 60_000,
    }
}

/// [`realtime`] with a short heartbeat.
pub fn realtime_with_heartbeat(heartbeat_interval_ms: u64) -> RealtimeConfig {
    RealtimeConfig {
        heartbeat_interval_ms,
        ..realtime()
    }
}

/// Dashboard endpoints on localhost.
pub fn dashboard() -> DashboardConfig {
    DashboardConfig {
        ws_url: "ws://127.0.0.1:9/ws/dashboard".into(),
        api_url: "http://127.0.0.1:9".into(),
        ..DashboardConfig::default()
    }
}

/// Complete config with fast timings.
pub fn config() -> Config {
    Config {
        dashboard: dashboard(),
        realtime: realtime(),
        ..Config::default()
    }
}
