//! Realtime dashboard client.
//!
//! Owns the single push-channel connection, authenticates it with the bearer
//! token, fans typed [`DashboardEvent`]s out to subscribers, and reconnects
//! after abnormal closures.
//!
//! # Connection Lifecycle
//!
//! ```text
//! Idle ──connect()──▶ Connecting ──open──▶ AwaitingAuth ──authenticated──▶ Connected
//!  ▲                      │                    │                              │
//!  │                      └──── close ≠ 1000 ──┴──────── close ≠ 1000 ────────┤
//!  │                               (attempts < max: wait delay, reconnect)    │
//!  └──────────── disconnect() / close 1000 / server error during auth ────────┘
//! ```
//!
//! Each `connect()` spawns one session task that owns the transport, the
//! heartbeat interval and the reconnect delay. `disconnect()` stops that task,
//! so no timer outlives the connection.
//!
//! Failures never surface as `Err` from this API. They are published as
//! [`DashboardEvent::Error`] and reflected in [`RealtimeClient::connection_status`].

mod event;
mod registry;
mod session;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use event::{DashboardEvent, EventKind};
pub use registry::{Callback, SubscriptionId, SubscriptionRegistry};

use crate::adapter::outbound::websocket::ClientMessage;
use crate::domain::{ChannelHealth, ConnectionState, ConnectionStatus, TransportState};
use crate::infrastructure::config::realtime::RealtimeConfig;
use crate::port::outbound::credential::CredentialSource;
use crate::port::outbound::transport::TransportFactory;

use session::{Command, Session};

/// Error message published when `connect()` finds no bearer token.
pub const MISSING_CREDENTIAL: &str = "no authentication token available";

/// Mutable connection bookkeeping, guarded by one lock.
#[derive(Debug, Default)]
struct ConnectionHandle {
    state: ConnectionState,
    transport_state: TransportState,
    reconnect_attempts: u32,
    reconnect_pending: bool,
    last_error: Option<String>,
    /// Bumped whenever the owning session changes; stale sessions stop.
    generation: u64,
    commands: Option<mpsc::UnboundedSender<Command>>,
    task: Option<JoinHandle<()>>,
}

struct Inner {
    config: RealtimeConfig,
    factory: TransportFactory,
    credentials: Arc<dyn CredentialSource>,
    registry: SubscriptionRegistry,
    handle: Mutex<ConnectionHandle>,
}

impl Inner {
    fn emit(&self, event: DashboardEvent) {
        if let DashboardEvent::Error { message } = &event {
            self.handle.lock().last_error = Some(message.clone());
        }
        let delivered = self.registry.dispatch(&event);
        debug!(kind = %event.kind(), delivered, "Dispatched realtime event");
    }

    /// Apply `f` if `generation` still owns the connection.
    fn update<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut ConnectionHandle),
    {
        let mut handle = self.handle.lock();
        if handle.generation != generation {
            return false;
        }
        f(&mut handle);
        true
    }

    fn state(&self) -> ConnectionState {
        self.handle.lock().state
    }
}

/// Client for the dashboard push endpoint.
///
/// Cloning is cheap; clones share one connection. Construct one instance in
/// the composition root and pass it to whatever needs it. Call
/// [`disconnect`](Self::disconnect) at shutdown: a running session keeps the
/// shared state alive.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl RealtimeClient {
    #[must_use]
    pub fn new(
        config: RealtimeConfig,
        factory: TransportFactory,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                factory,
                credentials,
                registry: SubscriptionRegistry::new(),
                handle: Mutex::new(ConnectionHandle::default()),
            }),
        }
    }

    /// Start connecting.
    ///
    /// No-op while connecting or connected. Without a bearer token this
    /// publishes an `error` event and opens nothing. Otherwise any pending
    /// reconnect is cancelled, the attempt counter resets, and a new session
    /// task is spawned. Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let mut handle = self.inner.handle.lock();
        if handle.state.is_active() {
            debug!(state = %handle.state, "connect() ignored, already active");
            return;
        }

        if self.inner.credentials.bearer_token().is_none() {
            drop(handle);
            warn!("Cannot connect: no authentication token");
            self.inner.emit(DashboardEvent::error(MISSING_CREDENTIAL));
            return;
        }

        if let Some(task) = handle.task.take() {
            task.abort();
        }

        handle.generation += 1;
        handle.state = ConnectionState::Connecting;
        handle.transport_state = TransportState::Connecting;
        handle.reconnect_attempts = 0;
        handle.reconnect_pending = false;
        handle.last_error = None;

        let (tx, rx) = mpsc::unbounded_channel();
        handle.commands = Some(tx);

        let session = Session::new(Arc::clone(&self.inner), handle.generation, rx);
        info!(generation = handle.generation, "Starting realtime session");
        handle.task = Some(tokio::spawn(session.run()));
    }

    /// Close the connection with normal closure and stop reconnecting.
    ///
    /// Idempotent. Cancels the heartbeat and any pending reconnect delay.
    pub fn disconnect(&self) {
        let mut handle = self.inner.handle.lock();
        let commands = handle.commands.take();
        let was = handle.state;

        handle.generation += 1;
        handle.state = ConnectionState::Idle;
        handle.reconnect_pending = false;
        if handle.transport_state != TransportState::Closed {
            handle.transport_state = TransportState::Closing;
        }
        // The session finishes the close on its own; detach it.
        handle.task = None;
        drop(handle);

        match commands {
            Some(tx) => {
                info!(state = %was, "Disconnecting realtime client");
                if tx.send(Command::Disconnect).is_err() {
                    self.inner.handle.lock().transport_state = TransportState::Closed;
                }
            }
            None => {
                self.inner.handle.lock().transport_state = TransportState::Closed;
            }
        }
    }

    /// Transmit a message if connected.
    ///
    /// Returns whether the message was queued. When not connected the message
    /// is dropped and logged.
    pub fn send(&self, message: ClientMessage) -> bool {
        let handle = self.inner.handle.lock();
        if handle.state != ConnectionState::Connected {
            debug!(
                event = message.event_name(),
                state = %handle.state,
                "Not connected, dropping outbound message"
            );
            return false;
        }
        handle
            .commands
            .as_ref()
            .is_some_and(|tx| tx.send(Command::Send(message)).is_ok())
    }

    /// Subscribe to one event kind.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        self.on_callback(kind, Arc::new(callback))
    }

    /// Subscribe a shared callback. The same `Arc` may be registered more
    /// than once; each registration is delivered separately.
    pub fn on_callback(&self, kind: EventKind, callback: Callback) -> SubscriptionId {
        self.inner.registry.subscribe(kind, callback)
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn off(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.inner.registry.unsubscribe(kind, id)
    }

    /// Number of live subscriptions for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.registry.len(kind)
    }

    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        let handle = self.inner.handle.lock();
        ConnectionStatus {
            is_connected: handle.state == ConnectionState::Connected,
            transport_state: handle.transport_state,
            reconnect_attempts: handle.reconnect_attempts,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// True while a scheduled reconnect is waiting or in progress.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.inner.handle.lock().reconnect_pending
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.handle.lock().last_error.clone()
    }

    /// Connectivity indicator for display.
    #[must_use]
    pub fn health(&self) -> ChannelHealth {
        let pending = self.reconnect_pending();
        ChannelHealth::from_status(
            &self.connection_status(),
            pending,
            self.inner.config.max_reconnect_attempts,
        )
    }

    #[must_use]
    pub fn config(&self) -> &RealtimeConfig {
        &self.inner.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::port::outbound::credential::StaticCredential;
    use crate::port::outbound::transport::{CLOSE_ABNORMAL, CLOSE_NORMAL};
    use crate::testkit;
    use crate::testkit::transport::{ChannelTransportHandle, TransportRecorder};

    fn client_with(token: Option<&str>) -> (RealtimeClient, TransportRecorder) {
        let (factory, recorder) = testkit::transport::recording_factory();
        let credentials: Arc<dyn CredentialSource> = match token {
            Some(t) => Arc::new(StaticCredential::new(t)),
            None => Arc::new(StaticCredential::missing()),
        };
        (
            RealtimeClient::new(testkit::config::realtime(), factory, credentials),
            recorder,
        )
    }

    fn collect(client: &RealtimeClient, kind: EventKind) -> Arc<Mutex<Vec<DashboardEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.on(kind, move |event| sink.lock().push(event.clone()));
        seen
    }

    async fn connected_client() -> (RealtimeClient, TransportRecorder, ChannelTransportHandle) {
        let (client, recorder) = client_with(Some("tok"));
        client.connect();
        let server = recorder.wait_for(0).await;
        server.authenticate().await;
        testkit::wait_until(|| client.is_connected()).await;
        (client, recorder, server)
    }

    #[tokio::test]
    async fn initial_state_is_idle() {
        let (client, _) = client_with(Some("tok"));
        let status = client.connection_status();

        assert_eq!(client.state(), ConnectionState::Idle);
        assert!(!status.is_connected);
        assert_eq!(status.transport_state, TransportState::Closed);
        assert_eq!(status.reconnect_attempts, 0);
    }

    #[tokio::test]
    async fn connect_without_token_emits_error_and_opens_nothing() {
        let (client, recorder) = client_with(None);
        let errors = collect(&client, EventKind::Error);

        client.connect();

        assert_eq!(
            *errors.lock(),
            vec![DashboardEvent::error(MISSING_CREDENTIAL)]
        );
        assert_eq!(recorder.created(), 0);
        assert_eq!(client.state(), ConnectionState::Idle);
        assert_eq!(client.last_error().as_deref(), Some(MISSING_CREDENTIAL));
    }

    #[tokio::test]
    async fn authenticate_sent_once_on_open() {
        let (client, recorder) = client_with(Some("tok-1"));
        client.connect();
        let server = recorder.wait_for(0).await;

        testkit::wait_until(|| client.state() == ConnectionState::AwaitingAuth).await;
        let sent = server.sent_events();
        assert_eq!(sent, vec!["authenticate".to_string()]);
        assert_eq!(server.sent()[0]["data"]["token"], "tok-1");

        server.authenticate().await;
        testkit::wait_until(|| client.is_connected()).await;
        assert_eq!(server.sent_events(), vec!["authenticate".to_string()]);
        client.disconnect();
    }

    #[tokio::test]
    async fn connect_is_noop_while_active() {
        let (client, recorder, _server) = connected_client().await;

        client.connect();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(recorder.created(), 1);
        client.disconnect();
    }

    #[tokio::test]
    async fn send_while_not_connected_is_dropped() {
        let (client, recorder) = client_with(Some("tok"));
        assert!(!client.send(ClientMessage::RequestUpdate));
        assert_eq!(recorder.created(), 0);
    }

    #[tokio::test]
    async fn send_while_awaiting_auth_is_dropped() {
        let (client, recorder) = client_with(Some("tok"));
        client.connect();
        let server = recorder.wait_for(0).await;
        testkit::wait_until(|| client.state() == ConnectionState::AwaitingAuth).await;

        assert!(!client.send(ClientMessage::RequestUpdate));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(server.sent_events(), vec!["authenticate".to_string()]);
        client.disconnect();
    }

    #[tokio::test]
    async fn send_while_connected_transmits() {
        let (client, _recorder, server) = connected_client().await;

        assert!(client.send(ClientMessage::RequestUpdate));
        testkit::wait_until(|| server.sent_events().len() == 2).await;
        assert_eq!(server.sent_events()[1], "request_update");
        client.disconnect();
    }

    #[tokio::test]
    async fn disconnect_closes_normally_without_reconnect() {
        let (client, recorder, server) = connected_client().await;
        let disconnected = collect(&client, EventKind::Disconnected);

        client.disconnect();
        testkit::wait_until(|| server.close_code().is_some()).await;

        assert_eq!(server.close_code(), Some(CLOSE_NORMAL));
        assert_eq!(client.state(), ConnectionState::Idle);
        assert!(!client.reconnect_pending());
        testkit::wait_until(|| !disconnected.lock().is_empty()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(recorder.created(), 1);
        assert_eq!(
            client.connection_status().transport_state,
            TransportState::Closed
        );
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (client, _recorder) = client_with(Some("tok"));
        client.disconnect();
        client.disconnect();
        assert_eq!(client.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn server_error_during_auth_closes_without_reconnect() {
        let (client, recorder) = client_with(Some("bad"));
        let errors = collect(&client, EventKind::Error);
        client.connect();
        let server = recorder.wait_for(0).await;

        server.push(r#"{"event":"error","data":{"message":"invalid token"}}"#).await;
        testkit::wait_until(|| server.close_code().is_some()).await;

        assert_eq!(server.close_code(), Some(CLOSE_NORMAL));
        assert_eq!(
            *errors.lock(),
            vec![DashboardEvent::error("invalid token")]
        );
        testkit::wait_until(|| client.state() == ConnectionState::Idle).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(recorder.created(), 1);
    }

    #[tokio::test]
    async fn server_error_while_connected_only_surfaces() {
        let (client, _recorder, server) = connected_client().await;
        let errors = collect(&client, EventKind::Error);

        server.push(r#"{"event":"error","message":"quota exceeded"}"#).await;
        testkit::wait_until(|| !errors.lock().is_empty()).await;

        assert!(client.is_connected());
        assert_eq!(server.close_code(), None);
        client.disconnect();
    }

    #[tokio::test]
    async fn malformed_frame_is_dropped() {
        let (client, _recorder, server) = connected_client().await;
        let updates = collect(&client, EventKind::StatsUpdate);

        server.push("{{not json").await;
        server.push(r#"{"event":"stats_update","data":{"userCount":1}}"#).await;
        testkit::wait_until(|| updates.lock().len() == 1).await;

        assert!(client.is_connected());
        client.disconnect();
    }

    #[tokio::test]
    async fn abnormal_close_schedules_reconnect() {
        let (client, recorder, server) = connected_client().await;

        server.close(CLOSE_ABNORMAL).await;
        testkit::wait_until(|| recorder.created() == 2).await;

        assert_eq!(client.connection_status().reconnect_attempts, 1);
        client.disconnect();
    }

    #[tokio::test]
    async fn normal_close_from_server_does_not_reconnect() {
        let (client, recorder, server) = connected_client().await;

        server.close(CLOSE_NORMAL).await;
        testkit::wait_until(|| client.state() == ConnectionState::Idle).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(recorder.created(), 1);
        assert!(!client.reconnect_pending());
    }

    #[tokio::test]
    async fn successful_reconnect_resets_attempts() {
        let (client, recorder, server) = connected_client().await;

        server.close(CLOSE_ABNORMAL).await;
        let second = recorder.wait_for(1).await;
        assert_eq!(client.connection_status().reconnect_attempts, 1);

        second.authenticate().await;
        testkit::wait_until(|| client.is_connected()).await;
        assert_eq!(client.connection_status().reconnect_attempts, 0);
        client.disconnect();
    }

    #[tokio::test]
    async fn health_reflects_connection() {
        let (client, _recorder, server) = connected_client().await;
        assert_eq!(client.health(), ChannelHealth::Connected);

        client.disconnect();
        testkit::wait_until(|| server.close_code().is_some()).await;
        assert_eq!(client.health(), ChannelHealth::Disconnected);
    }
}
