//! Typed events published by the realtime client.

use std::fmt;

use crate::domain::{NotificationRecord, StatsSnapshot};

/// An event delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// The transport opened.
    Connected,
    /// The transport closed.
    Disconnected {
        /// WebSocket close code.
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },
    /// The server accepted the bearer token.
    Authenticated,
    /// Any failure: missing credential, transport error, or server-reported.
    Error {
        /// Human-readable description.
        message: String,
    },
    /// First snapshot after authentication (`initial_stats`).
    StatsSnapshot(StatsSnapshot),
    /// Subsequent snapshot (`stats_update`).
    StatsUpdate(StatsSnapshot),
    /// Out-of-band alert.
    Notification(NotificationRecord),
}

impl DashboardEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::Authenticated => EventKind::Authenticated,
            Self::Error { .. } => EventKind::Error,
            Self::StatsSnapshot(_) => EventKind::StatsSnapshot,
            Self::StatsUpdate(_) => EventKind::StatsUpdate,
            Self::Notification(_) => EventKind::Notification,
        }
    }

    /// The snapshot carried by `StatsSnapshot` or `StatsUpdate`.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&StatsSnapshot> {
        match self {
            Self::StatsSnapshot(snapshot) | Self::StatsUpdate(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Subscription key: one per [`DashboardEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Connected,
    Disconnected,
    Authenticated,
    Error,
    StatsSnapshot,
    StatsUpdate,
    Notification,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Authenticated,
        EventKind::Error,
        EventKind::StatsSnapshot,
        EventKind::StatsUpdate,
        EventKind::Notification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Authenticated => "authenticated",
            Self::Error => "error",
            Self::StatsSnapshot => "statsSnapshot",
            Self::StatsUpdate => "statsUpdate",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
