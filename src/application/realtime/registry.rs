//! Subscriber registry for realtime events.
//!
//! Callbacks are kept per [`EventKind`] in registration order, which is also
//! delivery order. Registering the same callback twice creates two
//! independent subscriptions: it fires twice per event and each one is
//! removed separately.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::event::{DashboardEvent, EventKind};

/// Subscriber callback.
pub type Callback = Arc<dyn Fn(&DashboardEvent) + Send + Sync>;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Mapping from event kind to ordered callbacks.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    entries: RwLock<HashMap<EventKind, Vec<(SubscriptionId, Callback)>>>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback for `kind`.
    pub fn subscribe(&self, kind: EventKind, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .entry(kind)
            .or_default()
            .push((id, callback));
        id
    }

    /// Remove one subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let Some(list) = entries.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        before != list.len()
    }

    /// Callbacks for `kind`, in delivery order.
    #[must_use]
    pub fn callbacks(&self, kind: EventKind) -> Vec<Callback> {
        self.entries
            .read()
            .get(&kind)
            .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    /// Invoke every callback registered for the event's kind.
    ///
    /// The lock is released before any callback runs, so callbacks may
    /// subscribe or unsubscribe freely.
    pub fn dispatch(&self, event: &DashboardEvent) -> usize {
        let callbacks = self.callbacks(event.kind());
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    #[must_use]
    pub fn len(&self, kind: EventKind) -> usize {
        self.entries.read().get(&kind).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move |_| log.lock().push(name))
    }

    #[test]
    fn delivers_in_subscription_order() {
        let registry = SubscriptionRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.subscribe(EventKind::Connected, recorder(&log, "first"));
        registry.subscribe(EventKind::Connected, recorder(&log, "second"));
        registry.subscribe(EventKind::Connected, recorder(&log, "third"));

        let delivered = registry.dispatch(&DashboardEvent::Connected);

        assert_eq!(delivered, 3);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn only_matching_kind_is_invoked() {
        let registry = SubscriptionRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.subscribe(EventKind::Authenticated, recorder(&log, "auth"));

        registry.dispatch(&DashboardEvent::Connected);

        assert!(log.lock().is_empty());
    }

    #[test]
    fn duplicate_subscription_fires_twice() {
        let registry = SubscriptionRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let callback = recorder(&log, "dup");
        let first = registry.subscribe(EventKind::Connected, Arc::clone(&callback));
        let second = registry.subscribe(EventKind::Connected, callback);

        registry.dispatch(&DashboardEvent::Connected);
        assert_eq!(log.lock().len(), 2);
        assert_ne!(first, second);

        assert!(registry.unsubscribe(EventKind::Connected, first));
        registry.dispatch(&DashboardEvent::Connected);
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn unsubscribe_unknown_returns_false() {
        let registry = SubscriptionRegistry::new();
        let id = registry.subscribe(EventKind::Error, Arc::new(|_| {}));

        assert!(!registry.unsubscribe(EventKind::Connected, id));
        assert!(registry.unsubscribe(EventKind::Error, id));
        assert!(!registry.unsubscribe(EventKind::Error, id));
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(0));

        let cb: Callback = {
            let registry = Arc::clone(&registry);
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            Arc::new(move |_| {
                *calls.lock() += 1;
                if let Some(id) = slot.lock().take() {
                    registry.unsubscribe(EventKind::Connected, id);
                }
            })
        };
        *slot.lock() = Some(registry.subscribe(EventKind::Connected, cb));

        registry.dispatch(&DashboardEvent::Connected);
        registry.dispatch(&DashboardEvent::Connected);

        assert_eq!(*calls.lock(), 1);
        assert_eq!(registry.len(EventKind::Connected), 0);
    }
}
