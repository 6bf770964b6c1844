//! Composition root for runtime wiring.
//!
//! The only place that picks concrete adapters. Everything above this layer
//! talks to ports.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::outbound::http::HttpSnapshotClient;
use crate::adapter::outbound::websocket::websocket_factory;
use crate::application::dashboard::DashboardCoordinator;
use crate::application::realtime::RealtimeClient;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::credential::{CredentialSource, EnvCredential};
use crate::port::outbound::snapshot::SnapshotFetcher;

/// Bearer token source named by `dashboard.token_env`.
#[must_use]
pub fn build_credentials(config: &Config) -> Arc<dyn CredentialSource> {
    let credentials = EnvCredential::new(config.dashboard.token_env.clone());
    if credentials.bearer_token().is_none() {
        warn!(
            var = %config.dashboard.token_env,
            "Authentication token not set; push channel will not connect"
        );
    }
    Arc::new(credentials)
}

/// Realtime client over WebSocket.
#[must_use]
pub fn build_realtime_client(
    config: &Config,
    credentials: Arc<dyn CredentialSource>,
) -> RealtimeClient {
    debug!(url = %config.dashboard.ws_url, "Building realtime client");
    RealtimeClient::new(
        config.realtime.clone(),
        websocket_factory(config.dashboard.ws_url.clone()),
        credentials,
    )
}

/// HTTP client for the stats endpoint.
#[must_use]
pub fn build_snapshot_client(
    config: &Config,
    credentials: Arc<dyn CredentialSource>,
) -> HttpSnapshotClient {
    HttpSnapshotClient::from_config(&config.dashboard, &config.http, credentials)
}

/// Fully wired coordinator. Call `initialize()` to start it.
#[must_use]
pub fn build_dashboard(config: &Config) -> DashboardCoordinator {
    let credentials = build_credentials(config);
    let client = build_realtime_client(config, Arc::clone(&credentials));
    let fetcher: Arc<dyn SnapshotFetcher> = Arc::new(build_snapshot_client(config, credentials));
    DashboardCoordinator::new(client, fetcher)
}
