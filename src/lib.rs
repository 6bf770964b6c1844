//! ResourceHub dashboard - realtime synchronization client for the admin
//! dashboard.
//!
//! Keeps one authenticated WebSocket connection to the dashboard push
//! endpoint, fans typed events out to subscribers, and combines pushed
//! statistics with the REST snapshot into a single view.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Snapshots, notifications and connection state. No I/O.
//! - [`port`] - Traits at the I/O seams: transport, snapshot fetcher, credentials
//! - [`adapter`] - `tokio-tungstenite` and `reqwest` implementations, plus the CLI
//! - [`application`] - The realtime client and the dashboard coordinator
//! - [`infrastructure`] - Configuration and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use resourcehub_dashboard::application::dashboard::ViewState;
//! use resourcehub_dashboard::infrastructure::bootstrap;
//! use resourcehub_dashboard::infrastructure::config::settings::Config;
//!
//! # async fn run() -> resourcehub_dashboard::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let dashboard = bootstrap::build_dashboard(&config);
//! dashboard.initialize();
//!
//! let mut revisions = dashboard.watch();
//! while revisions.changed().await.is_ok() {
//!     if let ViewState::Ready(view) = dashboard.current_view() {
//!         println!("{} users ({})", view.snapshot.counter("userCount").unwrap_or(0.0), view.health);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
