//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the dashboard depends on:
//! the push socket, the snapshot endpoint, and credential storage.

pub mod credential;
pub mod snapshot;
pub mod transport;
