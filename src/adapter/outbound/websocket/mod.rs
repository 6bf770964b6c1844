//! Dashboard push endpoint integration.
//!
//! - [`message`] - JSON envelope codec for client and server messages
//! - [`stream`] - `tokio-tungstenite` implementation of [`Transport`](crate::port::outbound::transport::Transport)

pub mod message;
pub mod stream;

pub use message::{ClientMessage, ServerMessage};
pub use stream::{websocket_factory, WebSocketTransport};
