//! Builders for domain values and wire messages.

use serde_json::{json, Value};

use crate::domain::{SeriesPoint, StatsSnapshot};

/// A snapshot with the given counters.
pub fn snapshot(counters: &[(&str, f64)]) -> StatsSnapshot {
    StatsSnapshot::from_counters(counters.iter().map(|(k, v)| (*k, *v)))
}

/// A snapshot with counters and one series.
pub fn snapshot_with_series(counters: &[(&str, f64)], name: &str, points: &[(&str, f64)]) -> StatsSnapshot {
    snapshot(counters).with_series(
        name,
        points
            .iter()
            .map(|(label, value)| SeriesPoint::new(*label, *value))
            .collect(),
    )
}

/// `stats_update` frame carrying `snapshot`.
pub fn stats_update(snapshot: &StatsSnapshot) -> Value {
    json!({"event": "stats_update", "data": snapshot})
}

/// `initial_stats` frame carrying `snapshot`.
pub fn initial_stats(snapshot: &StatsSnapshot) -> Value {
    json!({"event": "initial_stats", "data": snapshot})
}

/// `notification` frame.
pub fn notification(kind: &str, message: &str) -> Value {
    json!({"event": "notification", "data": {"type": kind, "message": message}})
}
