//! CLI module graph.

pub mod check;
pub mod command;
pub mod output;
pub mod snapshot;
pub mod watch;
