//! REST snapshot endpoint integration.

pub mod client;

pub use client::HttpSnapshotClient;
