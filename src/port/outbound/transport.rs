//! Transport port for the dashboard push channel.
//!
//! A [`Transport`] is one bidirectional text socket. The realtime client
//! never reuses a transport across connection attempts: every attempt asks
//! the [`TransportFactory`] for a fresh one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;

/// Close code for an intentional, non-error disconnection.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the socket went away without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// A frame received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFrame {
    /// A text message.
    Text(String),
    /// The peer closed the connection.
    Closed {
        /// WebSocket close code.
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },
    /// A low-level socket failure. A `Closed` frame or end of stream follows.
    Error(String),
}

/// Bidirectional text transport to the push endpoint.
#[async_trait]
pub trait Transport: Send {
    /// Open the connection.
    async fn open(&mut self) -> Result<(), Error>;

    /// Send one text message.
    async fn send_text(&mut self, text: String) -> Result<(), Error>;

    /// Receive the next frame.
    ///
    /// Returns `None` when the stream has ended without a close frame.
    /// Must be cancellation safe: the caller polls it inside `select!`.
    async fn next_frame(&mut self) -> Option<TransportFrame>;

    /// Close the connection with the given code.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), Error>;
}

/// Creates a fresh transport for each connection attempt.
pub type TransportFactory = Arc<dyn Fn() -> Box<dyn Transport> + Send + Sync>;
