//! Dashboard data coordinator.
//!
//! Combines the HTTP snapshot (the fallback of record) with snapshots pushed
//! over the realtime channel into one [`ViewState`]. The HTTP fetch and the
//! socket connection run concurrently; whichever lands first is what
//! [`DashboardCoordinator::current_view`] reflects.
//!
//! A failed fetch is only terminal while nothing has been pushed. Once a push
//! snapshot is held, fetch failures are logged and the pushed data keeps
//! being served.

mod view;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use view::{DashboardView, ViewSource, ViewState};

use crate::adapter::outbound::websocket::ClientMessage;
use crate::application::realtime::{DashboardEvent, EventKind, RealtimeClient, SubscriptionId};
use crate::domain::{NotificationLog, NotificationRecord, StatsSnapshot};
use crate::error::Result;
use crate::port::outbound::snapshot::SnapshotFetcher;

/// Event kinds that only change the connectivity indicator.
const CONNECTIVITY_EVENTS: [EventKind; 4] = [
    EventKind::Connected,
    EventKind::Disconnected,
    EventKind::Authenticated,
    EventKind::Error,
];

#[derive(Debug, Default)]
struct CoordinatorState {
    http: Option<StatsSnapshot>,
    push: Option<StatsSnapshot>,
    notifications: NotificationLog,
    fetch_error: Option<String>,
    /// Sequence number of the newest fetch whose result was applied.
    applied_fetch: u64,
    updated_at: Option<DateTime<Utc>>,
}

struct Shared {
    state: RwLock<CoordinatorState>,
    revision: watch::Sender<u64>,
    fetch_seq: AtomicU64,
}

impl Shared {
    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn apply_push(&self, snapshot: StatsSnapshot) {
        {
            let mut state = self.state.write();
            state.push = Some(snapshot);
            state.updated_at = Some(Utc::now());
        }
        self.bump();
    }

    fn apply_notification(&self, record: NotificationRecord) {
        self.state.write().notifications.push(record);
        self.bump();
    }

    fn apply_fetch(&self, seq: u64, result: Result<StatsSnapshot>) {
        {
            let mut state = self.state.write();
            if seq < state.applied_fetch {
                debug!(seq, applied = state.applied_fetch, "Discarding stale fetch result");
                return;
            }
            state.applied_fetch = seq;

            match result {
                Ok(snapshot) => {
                    debug!(counters = snapshot.counters().len(), "HTTP snapshot applied");
                    state.http = Some(snapshot);
                    state.fetch_error = None;
                    state.updated_at = Some(Utc::now());
                }
                Err(err) if state.push.is_some() => {
                    warn!(error = %err, "Snapshot fetch failed, serving pushed data");
                }
                Err(err) => {
                    warn!(error = %err, "Snapshot fetch failed");
                    state.fetch_error = Some(err.to_string());
                }
            }
        }
        self.bump();
    }
}

/// Presents a single up-to-date dashboard view.
///
/// Construct after the [`RealtimeClient`]; the coordinator subscribes to it
/// immediately. Dropping the coordinator performs [`shutdown`](Self::shutdown).
pub struct DashboardCoordinator {
    client: RealtimeClient,
    fetcher: Arc<dyn SnapshotFetcher>,
    shared: Arc<Shared>,
    subscriptions: Mutex<Vec<(EventKind, SubscriptionId)>>,
    fetches: Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl DashboardCoordinator {
    #[must_use]
    pub fn new(client: RealtimeClient, fetcher: Arc<dyn SnapshotFetcher>) -> Self {
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            state: RwLock::new(CoordinatorState::default()),
            revision,
            fetch_seq: AtomicU64::new(0),
        });

        let mut subscriptions = Vec::new();
        for kind in [EventKind::StatsSnapshot, EventKind::StatsUpdate] {
            let shared = Arc::clone(&shared);
            let id = client.on(kind, move |event| {
                if let Some(snapshot) = event.snapshot() {
                    shared.apply_push(snapshot.clone());
                }
            });
            subscriptions.push((kind, id));
        }

        let notify = Arc::clone(&shared);
        let id = client.on(EventKind::Notification, move |event| {
            if let DashboardEvent::Notification(record) = event {
                notify.apply_notification(record.clone());
            }
        });
        subscriptions.push((EventKind::Notification, id));

        for kind in CONNECTIVITY_EVENTS {
            let shared = Arc::clone(&shared);
            let id = client.on(kind, move |_| shared.bump());
            subscriptions.push((kind, id));
        }

        Self {
            client,
            fetcher,
            shared,
            subscriptions: Mutex::new(subscriptions),
            fetches: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start the HTTP fetch and connect the push channel. Returns immediately.
    pub fn initialize(&self) {
        info!(source = self.fetcher.source_name(), "Initializing dashboard");
        self.spawn_fetch();
        self.client.connect();
    }

    /// Re-fetch over HTTP and, when connected, ask the server for a push.
    pub fn refresh(&self) {
        self.spawn_fetch();
        if self.client.is_connected() {
            self.client.send(ClientMessage::RequestUpdate);
        }
    }

    /// Re-fetch over HTTP and reconnect the push channel if it is down.
    pub fn retry(&self) {
        self.spawn_fetch();
        if !self.client.is_connected() {
            info!(health = %self.client.health(), "Retrying push channel");
            self.client.connect();
        }
    }

    /// Unsubscribe every listener and disconnect. Idempotent.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        for (kind, id) in self.subscriptions.lock().drain(..) {
            self.client.off(kind, id);
        }
        for fetch in self.fetches.lock().drain(..) {
            fetch.abort();
        }
        self.client.disconnect();
        info!("Dashboard coordinator shut down");
    }

    /// The view as of now.
    #[must_use]
    pub fn current_view(&self) -> ViewState {
        let health = self.client.health();
        let state = self.shared.state.read();

        if state.push.is_none() {
            if let Some(message) = &state.fetch_error {
                return ViewState::Failed {
                    message: message.clone(),
                };
            }
        }

        match view::compose(state.http.as_ref(), state.push.as_ref()) {
            None => ViewState::Loading,
            Some((snapshot, source)) => ViewState::Ready(DashboardView {
                snapshot,
                source,
                notifications: state.notifications.records(),
                health,
                updated_at: state.updated_at,
            }),
        }
    }

    /// Recent notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.shared.state.read().notifications.records()
    }

    /// Revision counter that changes whenever the view may have changed.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    #[must_use]
    pub const fn client(&self) -> &RealtimeClient {
        &self.client
    }

    fn spawn_fetch(&self) {
        if self.shut_down.load(Ordering::SeqCst) {
            debug!("Coordinator shut down, not fetching");
            return;
        }
        let seq = self.shared.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            let result = fetcher.fetch_snapshot().await;
            shared.apply_fetch(seq, result);
        });

        let mut fetches = self.fetches.lock();
        fetches.retain(|fetch| !fetch.is_finished());
        fetches.push(task);
    }
}

impl Drop for DashboardCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
