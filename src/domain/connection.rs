//! Connection state for the dashboard push channel.

use std::fmt;

use serde::Serialize;

/// Lifecycle state of the realtime client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    /// Transport is open and the authenticate message has been sent.
    AwaitingAuth,
    Connected,
}

impl ConnectionState {
    /// True while a connection attempt or live connection exists.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::AwaitingAuth => write!(f, "awaiting-auth"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// State of the underlying socket, independent of authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    Connecting,
    Open,
    Closing,
    #[default]
    Closed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Read-only projection of the client's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub transport_state: TransportState,
    pub reconnect_attempts: u32,
}

/// Connectivity indicator shown next to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelHealth {
    Connected,
    Reconnecting { attempt: u32, max_attempts: u32 },
    Disconnected,
}

impl ChannelHealth {
    /// Derive the indicator from a status snapshot.
    ///
    /// `reconnect_pending` is true while the client waits out a reconnect
    /// delay or is opening the transport for a scheduled attempt.
    #[must_use]
    pub fn from_status(
        status: &ConnectionStatus,
        reconnect_pending: bool,
        max_attempts: u32,
    ) -> Self {
        if status.is_connected {
            Self::Connected
        } else if reconnect_pending {
            Self::Reconnecting {
                attempt: status.reconnect_attempts,
                max_attempts,
            }
        } else {
            Self::Disconnected
        }
    }
}

impl fmt::Display for ChannelHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting {
                attempt,
                max_attempts,
            } => write!(f, "reconnecting ({attempt}/{max_attempts})"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(is_connected: bool, attempts: u32) -> ConnectionStatus {
        ConnectionStatus {
            is_connected,
            transport_state: if is_connected {
                TransportState::Open
            } else {
                TransportState::Closed
            },
            reconnect_attempts: attempts,
        }
    }

    #[test]
    fn health_connected_wins() {
        let health = ChannelHealth::from_status(&status(true, 0), true, 5);
        assert_eq!(health, ChannelHealth::Connected);
    }

    #[test]
    fn health_reports_attempt_while_reconnecting() {
        let health = ChannelHealth::from_status(&status(false, 2), true, 5);
        assert_eq!(
            health,
            ChannelHealth::Reconnecting {
                attempt: 2,
                max_attempts: 5
            }
        );
        assert_eq!(health.to_string(), "reconnecting (2/5)");
    }

    #[test]
    fn health_disconnected_without_pending_reconnect() {
        let health = ChannelHealth::from_status(&status(false, 5), false, 5);
        assert_eq!(health, ChannelHealth::Disconnected);
    }

    #[test]
    fn only_idle_is_inactive() {
        assert!(!ConnectionState::Idle.is_active());
        assert!(ConnectionState::Connecting.is_active());
        assert!(ConnectionState::AwaitingAuth.is_active());
        assert!(ConnectionState::Connected.is_active());
    }
}
