//! Handlers for `check` subcommands.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::credential::{CredentialSource, EnvCredential};

/// Validate a configuration file and print the effective settings.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Endpoints");
    output::field("Push channel", &config.dashboard.ws_url);
    output::field("Stats", config.dashboard.stats_url());

    output::section("Realtime");
    output::field(
        "Reconnect delay",
        format!("{}ms", config.realtime.reconnect_delay_ms),
    );
    output::field("Max attempts", config.realtime.max_reconnect_attempts);
    output::field(
        "Heartbeat",
        format!("{}ms", config.realtime.heartbeat_interval_ms),
    );
    if config.realtime.max_reconnect_attempts == 0 {
        output::warning("Automatic reconnection is disabled");
    }

    if output::verbosity() > 0 {
        output::section("HTTP");
        output::field("Timeout", format!("{}ms", config.http.timeout_ms));
        output::field(
            "Connect timeout",
            format!("{}ms", config.http.connect_timeout_ms),
        );
        output::field("Retries", config.http.retry_max_attempts);
        output::field("Backoff", format!("{}ms", config.http.retry_backoff_ms));
        output::field(
            "Logging",
            format!("{} ({})", config.logging.level, config.logging.format),
        );
    }

    let credentials = EnvCredential::new(config.dashboard.token_env.clone());
    if credentials.bearer_token().is_some() {
        output::success(&format!("Token found in {}", credentials.var()));
    } else {
        output::warning(&format!(
            "{} is not set; the push channel will not connect",
            credentials.var()
        ));
        output::hint("export the admin bearer token or add it to .env");
    }

    output::success("Configuration check complete");

    Ok(())
}
