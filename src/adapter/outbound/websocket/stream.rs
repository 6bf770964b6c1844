//! WebSocket transport for the dashboard push endpoint.
//!
//! Wraps a `tokio-tungstenite` stream behind the [`Transport`] port. The
//! transport only moves text; authentication, heartbeats and reconnection
//! belong to the realtime client driving it.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::port::outbound::transport::{
    Transport, TransportFactory, TransportFrame, CLOSE_ABNORMAL,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection to the dashboard push endpoint.
pub struct WebSocketTransport {
    /// The WebSocket URL to connect to (e.g., <wss://hub.example.org/ws/dashboard>)
    url: String,
    ws: Option<WsStream>,
}

impl WebSocketTransport {
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self { url, ws: None }
    }

    fn stream(&mut self) -> Result<&mut WsStream> {
        self.ws
            .as_mut()
            .ok_or_else(|| Error::Connection("transport is not open".into()))
    }
}

/// Build a factory producing a fresh [`WebSocketTransport`] per attempt.
#[must_use]
pub fn websocket_factory(url: String) -> TransportFactory {
    Arc::new(move || Box::new(WebSocketTransport::new(url.clone())))
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");

        let (ws_stream, response) = connect_async(&self.url).await?;

        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        trace!(bytes = text.len(), "Sending WebSocket text frame");
        self.stream()?.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<TransportFrame> {
        let ws = self.ws.as_mut()?;

        loop {
            match ws.next().await? {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return Some(TransportFrame::Text(text));
                }
                // The protocol requires pong responses to echo the ping payload
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        return Some(TransportFrame::Error(e.to_string()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(frame = ?frame, "WebSocket closed by server");
                    let (code, reason) = frame.map_or((CLOSE_ABNORMAL, String::new()), |f| {
                        (u16::from(f.code), f.reason.into_owned())
                    });
                    return Some(TransportFrame::Closed { code, reason });
                }
                // Binary, pong and raw frames carry nothing for the dashboard
                Ok(_) => {}
                Err(e) => return Some(TransportFrame::Error(e.to_string())),
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        let Some(mut ws) = self.ws.take() else {
            return Ok(());
        };
        debug!(code, reason, "Closing WebSocket");
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };
        ws.close(Some(frame)).await?;
        Ok(())
    }
}
