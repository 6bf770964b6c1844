//! Out-of-band notifications pushed by the dashboard endpoint.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Number of notifications retained by a [`NotificationLog`] by default.
pub const NOTIFICATION_CAPACITY: usize = 10;

/// Kind used when a notification payload carries no `type` field.
const DEFAULT_KIND: &str = "info";

/// A received notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub kind: String,
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Wrap a notification payload received now.
    ///
    /// The kind is taken from the payload's `type` field when it is a string.
    #[must_use]
    pub fn received(payload: Value) -> Self {
        Self::received_at(payload, Utc::now())
    }

    #[must_use]
    pub fn received_at(payload: Value, received_at: DateTime<Utc>) -> Self {
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_KIND)
            .to_string();
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            received_at,
        }
    }
}

/// Bounded, append-only log of the most recent notifications.
///
/// Once full, each push evicts the oldest record.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    records: VecDeque<NotificationRecord>,
    capacity: usize,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(NOTIFICATION_CAPACITY)
    }

    /// Create a log retaining at most `capacity` records (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when over capacity.
    pub fn push(&mut self, record: NotificationRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records ordered oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.iter().cloned().collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&NotificationRecord> {
        self.records.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}
