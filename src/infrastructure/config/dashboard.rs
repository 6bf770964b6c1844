//! Dashboard endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where the dashboard lives and how to find the bearer token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Push endpoint (e.g., `wss://hub.example.org/ws/dashboard`).
    #[serde(default)]
    pub ws_url: String,
    /// REST API base URL (e.g., `https://hub.example.org`).
    #[serde(default)]
    pub api_url: String,
    /// Path of the snapshot endpoint, appended to `api_url`.
    #[serde(default = "default_stats_path")]
    pub stats_path: String,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_stats_path() -> String {
    "/api/admin/dashboard/stats".into()
}

fn default_token_env() -> String {
    "RESOURCEHUB_TOKEN".into()
}

impl DashboardConfig {
    /// Full URL of the snapshot endpoint.
    #[must_use]
    pub fn stats_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        if self.stats_path.starts_with('/') {
            format!("{base}{}", self.stats_path)
        } else {
            format!("{base}/{}", self.stats_path)
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ws_url: String::new(),
            api_url: String::new(),
            stats_path: default_stats_path(),
            token_env: default_token_env(),
        }
    }
}
