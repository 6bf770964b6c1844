//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - Mock [`Transport`](crate::port::outbound::transport::Transport)
//!   implementations: `ChannelTransport`, `FailingTransport`, and factories.
//! - [`fetcher`] - Scripted [`SnapshotFetcher`](crate::port::outbound::snapshot::SnapshotFetcher).
//! - [`domain`] - Builders for snapshots and wire frames.
//! - [`config`] - Canonical test configurations with fast timings.

pub mod config;
pub mod domain;
pub mod fetcher;
pub mod transport;

use std::time::Duration;

/// Poll `condition` until it holds.
///
/// # Panics
///
/// Panics if the condition is still false after two seconds.
pub async fn wait_until<F: FnMut() -> bool>(mut condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
