//! Connection session task.
//!
//! One [`Session`] runs per `connect()` call. It opens a transport,
//! authenticates, pumps frames into events, sends heartbeats, and applies the
//! close policy. Every write to the shared handle is tagged with the
//! session's generation; once `connect()` or `disconnect()` moves the
//! generation on, the session stops touching client state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use super::event::DashboardEvent;
use super::{Inner, MISSING_CREDENTIAL};
use crate::adapter::outbound::websocket::{ClientMessage, ServerMessage};
use crate::domain::{ConnectionState, NotificationRecord, TransportState};
use crate::port::outbound::transport::{Transport, TransportFrame, CLOSE_ABNORMAL, CLOSE_NORMAL};

/// Requests from the client handle to its session.
#[derive(Debug)]
pub(super) enum Command {
    Send(ClientMessage),
    Disconnect,
}

/// How one connection attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The transport closed with this code; the close policy decides what next.
    Closed(u16),
    /// Disconnect was requested or the session lost ownership.
    Stopped,
}

/// What the frame handler wants the receive loop to do.
enum Flow {
    Continue,
    /// Authentication was rejected; close normally.
    Reject(String),
}

pub(super) struct Session {
    inner: Arc<Inner>,
    generation: u64,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Session {
    pub(super) fn new(
        inner: Arc<Inner>,
        generation: u64,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            inner,
            generation,
            commands,
        }
    }

    pub(super) async fn run(mut self) {
        loop {
            match self.connect_once().await {
                Outcome::Stopped => break,
                Outcome::Closed(code) => {
                    if !self.schedule_reconnect(code).await {
                        break;
                    }
                }
            }
        }
        debug!(generation = self.generation, "Realtime session finished");
    }

    fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut super::ConnectionHandle),
    {
        self.inner.update(self.generation, f)
    }

    fn is_current(&self) -> bool {
        self.inner.handle.lock().generation == self.generation
    }

    /// Mark the socket closed after a requested disconnect.
    ///
    /// `disconnect()` bumps the generation exactly once, so the handle still
    /// belongs to this session's teardown unless a new `connect()` followed.
    fn finish_disconnect(&self) {
        self.inner.update(self.generation + 1, |handle| {
            handle.transport_state = TransportState::Closed;
        });
    }

    async fn connect_once(&mut self) -> Outcome {
        let Some(token) = self.inner.credentials.bearer_token() else {
            warn!("Authentication token disappeared, not reconnecting");
            if self.update(|handle| {
                handle.state = ConnectionState::Idle;
                handle.transport_state = TransportState::Closed;
                handle.reconnect_pending = false;
            }) {
                self.inner.emit(DashboardEvent::error(MISSING_CREDENTIAL));
            }
            return Outcome::Stopped;
        };

        if !self.update(|handle| {
            handle.state = ConnectionState::Connecting;
            handle.transport_state = TransportState::Connecting;
        }) {
            return Outcome::Stopped;
        }

        let mut transport = (self.inner.factory)();

        let opened = tokio::select! {
            result = transport.open() => result,
            () = wait_for_stop(&mut self.commands) => {
                debug!("Disconnect requested while opening");
                self.finish_disconnect();
                return Outcome::Stopped;
            }
        };

        if let Err(err) = opened {
            if !self.is_current() {
                return Outcome::Stopped;
            }
            error!(error = %err, "Failed to open push channel");
            self.inner.emit(DashboardEvent::error(err.to_string()));
            self.update(|handle| handle.transport_state = TransportState::Closed);
            self.inner.emit(DashboardEvent::Disconnected {
                code: CLOSE_ABNORMAL,
                reason: String::new(),
            });
            return Outcome::Closed(CLOSE_ABNORMAL);
        }

        if !self.update(|handle| {
            handle.state = ConnectionState::AwaitingAuth;
            handle.transport_state = TransportState::Open;
        }) {
            let _ = transport.close(CLOSE_NORMAL, "superseded").await;
            return Outcome::Stopped;
        }
        info!("Push channel open, authenticating");
        self.inner.emit(DashboardEvent::Connected);

        if let Err(message) = send(transport.as_mut(), ClientMessage::authenticate(token)).await {
            self.inner.emit(DashboardEvent::error(message));
            return self.closed(CLOSE_ABNORMAL, String::new());
        }

        self.pump(transport.as_mut()).await
    }

    /// Receive loop for an open transport.
    async fn pump(&mut self, transport: &mut dyn Transport) -> Outcome {
        let mut heartbeat: Option<Interval> = None;

        loop {
            tokio::select! {
                frame = transport.next_frame() => match frame {
                    Some(TransportFrame::Text(text)) => {
                        if let Flow::Reject(message) = self.handle_text(&text, &mut heartbeat) {
                            info!(reason = %message, "Authentication rejected, closing");
                            if let Err(err) = transport.close(CLOSE_NORMAL, "authentication rejected").await {
                                debug!(error = %err, "Close after rejection failed");
                            }
                            return self.closed(CLOSE_NORMAL, message);
                        }
                    }
                    Some(TransportFrame::Error(message)) => {
                        error!(error = %message, "Push channel error");
                        self.inner.emit(DashboardEvent::error(message));
                    }
                    Some(TransportFrame::Closed { code, reason }) => {
                        info!(code, reason = %reason, "Push channel closed by server");
                        return self.closed(code, reason);
                    }
                    None => {
                        warn!("Push channel ended without close frame");
                        return self.closed(CLOSE_ABNORMAL, String::new());
                    }
                },
                () = tick(&mut heartbeat) => {
                    if self.inner.state() == ConnectionState::Connected {
                        trace!("Sending heartbeat");
                        if let Err(message) = send(transport, ClientMessage::Ping).await {
                            self.inner.emit(DashboardEvent::error(message));
                        }
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::Send(message)) => {
                        if let Err(message) = send(transport, message).await {
                            self.inner.emit(DashboardEvent::error(message));
                        }
                    }
                    Some(Command::Disconnect) | None => {
                        if let Err(err) = transport.close(CLOSE_NORMAL, "client disconnect").await {
                            debug!(error = %err, "Close on disconnect failed");
                        }
                        self.finish_disconnect();
                        self.inner.emit(DashboardEvent::Disconnected {
                            code: CLOSE_NORMAL,
                            reason: String::new(),
                        });
                        return Outcome::Stopped;
                    }
                },
            }
        }
    }

    fn handle_text(&self, text: &str, heartbeat: &mut Option<Interval>) -> Flow {
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, bytes = text.len(), "Dropping malformed frame");
                return Flow::Continue;
            }
        };

        match message {
            ServerMessage::Authenticated => {
                if !self.update(|handle| {
                    handle.state = ConnectionState::Connected;
                    handle.reconnect_attempts = 0;
                    handle.reconnect_pending = false;
                }) {
                    return Flow::Continue;
                }
                if heartbeat.is_none() {
                    *heartbeat = Some(heartbeat_interval(self.inner.config.heartbeat_interval()));
                }
                info!("Push channel authenticated");
                self.inner.emit(DashboardEvent::Authenticated);
            }
            ServerMessage::InitialStats(snapshot) => {
                self.inner.emit(DashboardEvent::StatsSnapshot(snapshot));
            }
            ServerMessage::StatsUpdate(snapshot) => {
                self.inner.emit(DashboardEvent::StatsUpdate(snapshot));
            }
            ServerMessage::Notification(payload) => {
                let record = NotificationRecord::received(payload);
                debug!(kind = %record.kind, "Notification received");
                self.inner.emit(DashboardEvent::Notification(record));
            }
            ServerMessage::Error { message } => {
                warn!(error = %message, "Server reported error");
                self.inner.emit(DashboardEvent::error(message.clone()));
                if self.inner.state() == ConnectionState::AwaitingAuth && self.is_current() {
                    return Flow::Reject(message);
                }
            }
            ServerMessage::Pong => trace!("Heartbeat acknowledged"),
            ServerMessage::Unknown(event) => debug!(event = %event, "Ignoring unknown event"),
        }
        Flow::Continue
    }

    /// Record a close and report it.
    fn closed(&self, code: u16, reason: String) -> Outcome {
        if !self.update(|handle| handle.transport_state = TransportState::Closed) {
            return Outcome::Stopped;
        }
        self.inner.emit(DashboardEvent::Disconnected { code, reason });
        Outcome::Closed(code)
    }

    /// Apply the close policy. Returns true when another attempt should run.
    async fn schedule_reconnect(&mut self, code: u16) -> bool {
        let max_attempts = self.inner.config.max_reconnect_attempts;
        let mut scheduled = None;

        let current = self.update(|handle| {
            handle.state = ConnectionState::Idle;
            handle.transport_state = TransportState::Closed;
            if code != CLOSE_NORMAL && handle.reconnect_attempts < max_attempts {
                handle.reconnect_attempts += 1;
                handle.reconnect_pending = true;
                scheduled = Some(handle.reconnect_attempts);
            } else {
                handle.reconnect_pending = false;
            }
        });
        if !current {
            return false;
        }

        let Some(attempt) = scheduled else {
            if code == CLOSE_NORMAL {
                info!("Push channel closed normally");
            } else {
                warn!(max_attempts, "Reconnect attempts exhausted, staying idle");
            }
            return false;
        };

        let delay = self.inner.config.reconnect_delay();
        info!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        tokio::select! {
            () = sleep(delay) => self.is_current(),
            () = wait_for_stop(&mut self.commands) => {
                debug!("Disconnect requested during reconnect delay");
                self.finish_disconnect();
                false
            }
        }
    }
}

/// Serialize and send one message, mapping failures to a printable error.
async fn send(transport: &mut dyn Transport, message: ClientMessage) -> Result<(), String> {
    let event = message.event_name();
    let text = message.to_json().map_err(|e| e.to_string())?;
    transport.send_text(text).await.map_err(|e| {
        error!(event, error = %e, "Failed to send message");
        e.to_string()
    })?;
    trace!(event, "Sent message");
    Ok(())
}

/// Resolve once a disconnect is requested. Messages queued meanwhile are
/// dropped: nothing can be sent without an authenticated connection.
async fn wait_for_stop(commands: &mut mpsc::UnboundedReceiver<Command>) {
    loop {
        match commands.recv().await {
            Some(Command::Send(message)) => {
                debug!(event = message.event_name(), "Not connected, dropping queued message");
            }
            Some(Command::Disconnect) | None => return,
        }
    }
}

fn heartbeat_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
