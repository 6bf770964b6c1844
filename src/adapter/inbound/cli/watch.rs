//! Handler for the `watch` command.
//!
//! Keys read from stdin, one per line: `r` retries the snapshot fetch and
//! reconnects the push channel if it is down, `u` asks for fresh data.

use std::io::BufRead;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::adapter::inbound::cli::command::ConfigPathArg;
use crate::adapter::inbound::cli::{output, snapshot};
use crate::application::dashboard::{DashboardCoordinator, ViewState};
use crate::domain::TransportState;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// How long shutdown waits for the close handshake.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

const KEYS_HINT: &str = "press r + Enter to retry, u + Enter to refresh";

/// A manual action typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Retry,
    Refresh,
}

impl Action {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "retry" => Some(Self::Retry),
            "u" | "refresh" => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// Forward stdin lines from a dedicated thread.
///
/// The thread is never joined; the process may exit while it is blocked on a
/// read.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn apply(coordinator: &DashboardCoordinator, action: Action) {
    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    match action {
        Action::Retry => {
            output::info(&timestamp, "retry", "fetching snapshot and reconnecting");
            coordinator.retry();
        }
        Action::Refresh => {
            output::info(&timestamp, "refresh", "requesting fresh data");
            coordinator.refresh();
        }
    }
}

/// Run the live dashboard until Ctrl-C.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    let coordinator = bootstrap::build_dashboard(&config);
    let mut revisions = coordinator.watch();

    if !output::is_quiet() {
        output::header(env!("CARGO_PKG_VERSION"));
        output::field("Push channel", &config.dashboard.ws_url);
        output::field("Stats", config.dashboard.stats_url());
        output::hint(KEYS_HINT);
    }

    coordinator.initialize();
    info!("Watching dashboard");

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut input = stdin_lines();
    let mut input_open = true;

    let mut last = None;
    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = coordinator.current_view();
                if last.as_ref() != Some(&state) {
                    render(&state);
                    last = Some(state);
                }
            }
            line = input.recv(), if input_open => match line {
                Some(line) => match Action::parse(&line) {
                    Some(action) => apply(&coordinator, action),
                    None if line.trim().is_empty() => {}
                    None => output::hint(KEYS_HINT),
                },
                None => {
                    debug!("stdin closed, manual actions disabled");
                    input_open = false;
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    close(&coordinator).await;
    Ok(())
}

async fn close(coordinator: &DashboardCoordinator) {
    coordinator.shutdown();

    let client = coordinator.client();
    let deadline = tokio::time::Instant::now() + CLOSE_GRACE;
    while client.connection_status().transport_state != TransportState::Closed
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    output::success("Disconnected");
}

fn render(state: &ViewState) {
    if output::is_json() {
        output::emit_json_line("view", json!(state));
        return;
    }

    let timestamp = Utc::now().format("%H:%M:%S").to_string();
    match state {
        ViewState::Loading => output::info(&timestamp, "loading", "waiting for first snapshot"),
        ViewState::Failed { message } => {
            output::error(&format!("Dashboard unavailable: {message}"));
            output::hint("check the API URL and token, then press r + Enter to retry");
        }
        ViewState::Ready(view) => {
            if output::is_quiet() {
                return;
            }
            output::info(
                &timestamp,
                &view.source.to_string(),
                &output::health(view.health),
            );
            snapshot::print_snapshot(&view.snapshot);
            if let Some(latest) = view.notifications.last() {
                output::field(
                    "Notification",
                    format!(
                        "[{}] {} {}",
                        latest.kind,
                        latest.payload.get("message").and_then(|m| m.as_str()).unwrap_or_default(),
                        output::muted(latest.received_at.format("%H:%M:%S"))
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manual_actions() {
        assert_eq!(Action::parse("r"), Some(Action::Retry));
        assert_eq!(Action::parse(" R \n"), Some(Action::Retry));
        assert_eq!(Action::parse("u"), Some(Action::Refresh));
        assert_eq!(Action::parse("refresh"), Some(Action::Refresh));
        assert_eq!(Action::parse("x"), None);
        assert_eq!(Action::parse(""), None);
    }
}
