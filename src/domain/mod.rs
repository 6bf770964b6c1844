//! Transport-agnostic dashboard types.

mod connection;
mod notification;
mod stats;

pub use connection::{ChannelHealth, ConnectionState, ConnectionStatus, TransportState};
pub use notification::{NotificationLog, NotificationRecord, NOTIFICATION_CAPACITY};
pub use stats::{SeriesPoint, StatsSnapshot};
