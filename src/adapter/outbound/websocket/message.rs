//! Dashboard push endpoint message types.
//!
//! Every message is a JSON object with an `event` discriminator. Payloads
//! travel in a `data` field:
//!
//! ```json
//! {"event": "authenticate", "data": {"token": "..."}}
//! {"event": "stats_update", "data": {"userCount": 42}}
//! {"event": "pong"}
//! ```
//!
//! When an inbound message has no `data` field, the remaining top-level
//! fields are used as the payload, so `{"event": "error", "message": "..."}`
//! decodes the same as the nested form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::StatsSnapshot;
use crate::error::ProtocolError;

/// Message used when the server reports an error without a message.
const UNSPECIFIED_ERROR: &str = "server reported an unspecified error";

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Establish identity after the transport opens.
    Authenticate { token: String },
    /// Heartbeat.
    Ping,
    /// Ask the server to push a fresh snapshot.
    RequestUpdate,
}

impl ClientMessage {
    #[must_use]
    pub fn authenticate(token: impl Into<String>) -> Self {
        Self::Authenticate {
            token: token.into(),
        }
    }

    /// Event name as it appears on the wire.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::Ping => "ping",
            Self::RequestUpdate => "request_update",
        }
    }

    /// Serialize to the JSON text sent over the socket.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Identity accepted.
    Authenticated,
    /// First snapshot after authentication.
    InitialStats(StatsSnapshot),
    /// Subsequent snapshot.
    StatsUpdate(StatsSnapshot),
    /// Out-of-band alert.
    Notification(Value),
    /// Server-reported failure.
    Error { message: String },
    /// Heartbeat acknowledgement.
    Pong,
    /// An event this client does not know about.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: Option<String>,
    data: Option<Value>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl ServerMessage {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the text is not a JSON object, has no
    /// `event` field, or a snapshot payload is not an object.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(ProtocolError::MalformedFrame)?;
        let event = envelope.event.ok_or(ProtocolError::MissingEvent)?;
        let payload = envelope
            .data
            .unwrap_or_else(|| Value::Object(envelope.rest));

        let message = match event.as_str() {
            "authenticated" => Self::Authenticated,
            "initial_stats" => Self::InitialStats(snapshot(&event, payload)?),
            "stats_update" => Self::StatsUpdate(snapshot(&event, payload)?),
            "notification" => Self::Notification(payload),
            "error" => Self::Error {
                message: payload
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| payload.as_str())
                    .unwrap_or(UNSPECIFIED_ERROR)
                    .to_string(),
            },
            "pong" => Self::Pong,
            _ => Self::Unknown(event),
        };
        Ok(message)
    }
}

fn snapshot(event: &str, payload: Value) -> Result<StatsSnapshot, ProtocolError> {
    StatsSnapshot::from_value(payload).map_err(|reason| ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason,
    })
}
