//! Infrastructure configuration modules.

pub mod dashboard;
pub mod http;
pub mod logging;
pub mod realtime;
pub mod settings;
