//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems: the dashboard push socket, the REST snapshot endpoint and
//! wherever the bearer token lives.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌────────────┐
//! │WebSocket│            │    HTTP     │              │ Credential │
//! │ Adapter │            │   Adapter   │              │   Source   │
//! └─────────┘            └─────────────┘              └────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`outbound::transport::Transport`], [`outbound::transport::TransportFactory`] - Push channel socket
//! - [`outbound::snapshot::SnapshotFetcher`] - REST snapshot endpoint
//! - [`outbound::credential::CredentialSource`] - Bearer token lookup

pub mod outbound;
