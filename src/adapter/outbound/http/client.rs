//! REST client for the dashboard statistics endpoint.
//!
//! Fetches the full snapshot the dashboard falls back on when the push
//! channel is unavailable. Transient failures (timeouts, refused
//! connections) are retried with a fixed backoff; HTTP error statuses are
//! returned immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::StatsSnapshot;
use crate::error::{Error, ProtocolError, Result};
use crate::infrastructure::config::dashboard::DashboardConfig;
use crate::infrastructure::config::http::HttpConfig;
use crate::port::outbound::credential::CredentialSource;
use crate::port::outbound::snapshot::SnapshotFetcher;

/// HTTP client for the dashboard snapshot endpoint.
pub struct HttpSnapshotClient {
    http: HttpClient,
    /// Fully qualified snapshot URL.
    url: String,
    credentials: Arc<dyn CredentialSource>,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl HttpSnapshotClient {
    /// Create a client with default HTTP settings and a single attempt.
    #[must_use]
    pub fn new(url: String, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            http: HttpClient::new(),
            url,
            credentials,
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(
        dashboard: &DashboardConfig,
        config: &HttpConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            url: dashboard.stats_url(),
            credentials,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get_with_retry(&self) -> Result<Value> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let mut request = self.http.get(&self.url);
            if let Some(token) = self.credentials.bearer_token() {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                });
            }

            match response.json::<Value>().await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

/// Accept either a bare snapshot object or one wrapped in `{"data": ...}`.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

#[async_trait]
impl SnapshotFetcher for HttpSnapshotClient {
    async fn fetch_snapshot(&self) -> Result<StatsSnapshot> {
        info!(url = %self.url, "Fetching dashboard snapshot");

        let body = unwrap_data(self.get_with_retry().await?);
        let snapshot =
            StatsSnapshot::from_value(body).map_err(|reason| ProtocolError::InvalidPayload {
                event: "snapshot".into(),
                reason,
            })?;

        debug!(counters = snapshot.counters().len(), "Fetched dashboard snapshot");
        Ok(snapshot)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
