//! Application services (use cases).
//!
//! - [`realtime`] - Push channel client: connection lifecycle and event fan-out
//! - [`dashboard`] - Combines HTTP and pushed snapshots into one view

pub mod dashboard;
pub mod realtime;
