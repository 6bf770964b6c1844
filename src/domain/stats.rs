//! Dashboard statistics snapshot.
//!
//! A [`StatsSnapshot`] is a complete set of named counters plus the
//! historical series used for sparklines. Snapshots are replaced wholesale;
//! combining an HTTP snapshot with a pushed one goes through
//! [`StatsSnapshot::overlay`], which builds a new value.
//!
//! Wire form is a flat JSON object. Numeric top-level fields are counters and
//! the optional `series` object maps counter names to `[{label, value}]`:
//!
//! ```json
//! {"userCount": 42, "openTickets": 7, "series": {"userCount": [{"label": "Mon", "value": 40}]}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the series object inside a snapshot payload.
const SERIES_KEY: &str = "series";

/// One point of a counter's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Immutable aggregate of dashboard counters and their history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct StatsSnapshot {
    counters: BTreeMap<String, f64>,
    series: BTreeMap<String, Vec<SeriesPoint>>,
}

impl StatsSnapshot {
    /// Create a snapshot from counters and series.
    #[must_use]
    pub fn new(
        counters: BTreeMap<String, f64>,
        series: BTreeMap<String, Vec<SeriesPoint>>,
    ) -> Self {
        Self { counters, series }
    }

    /// Build a snapshot holding only counters.
    pub fn from_counters<I, K>(counters: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            counters: counters.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            series: BTreeMap::new(),
        }
    }

    /// Return a copy of this snapshot with one series attached.
    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        self.series.insert(name.into(), points);
        self
    }

    /// Decode a snapshot from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `value` is not an object or
    /// its `series` entry is malformed.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(format!("expected object, got {}", json_type(&other))),
        }
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> Option<f64> {
        self.counters.get(name).copied()
    }

    #[must_use]
    pub fn series(&self, name: &str) -> Option<&[SeriesPoint]> {
        self.series.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub const fn counters(&self) -> &BTreeMap<String, f64> {
        &self.counters
    }

    #[must_use]
    pub const fn all_series(&self) -> &BTreeMap<String, Vec<SeriesPoint>> {
        &self.series
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.series.is_empty()
    }

    /// Combine two snapshots, letting every field present in `newer` win.
    ///
    /// Fields that only exist in `self` are carried over unchanged. Neither
    /// input is modified.
    #[must_use]
    pub fn overlay(&self, newer: &StatsSnapshot) -> StatsSnapshot {
        let mut counters = self.counters.clone();
        counters.extend(newer.counters.iter().map(|(k, v)| (k.clone(), *v)));

        let mut series = self.series.clone();
        series.extend(newer.series.iter().map(|(k, v)| (k.clone(), v.clone())));

        StatsSnapshot { counters, series }
    }
}

impl TryFrom<Map<String, Value>> for StatsSnapshot {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut counters = BTreeMap::new();
        let mut series = BTreeMap::new();

        for (key, value) in map {
            if key == SERIES_KEY {
                series = serde_json::from_value(value)
                    .map_err(|e| format!("invalid `{SERIES_KEY}`: {e}"))?;
                continue;
            }
            // Non-numeric fields (labels, timestamps) are not counters.
            if let Some(n) = value.as_f64() {
                counters.insert(key, n);
            }
        }

        Ok(Self { counters, series })
    }
}

impl From<StatsSnapshot> for Map<String, Value> {
    fn from(snapshot: StatsSnapshot) -> Self {
        let mut map: Map<String, Value> = snapshot
            .counters
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();

        if !snapshot.series.is_empty() {
            let series = serde_json::to_value(snapshot.series).unwrap_or(Value::Null);
            map.insert(SERIES_KEY.to_string(), series);
        }
        map
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numeric_fields_as_counters() {
        let snapshot: StatsSnapshot =
            serde_json::from_value(json!({"userCount": 42, "assetCount": 7.5})).unwrap();

        assert_eq!(snapshot.counter("userCount"), Some(42.0));
        assert_eq!(snapshot.counter("assetCount"), Some(7.5));
        assert!(snapshot.all_series().is_empty());
    }

    #[test]
    fn ignores_non_numeric_fields() {
        let snapshot: StatsSnapshot =
            serde_json::from_value(json!({"userCount": 3, "generatedAt": "2026-10-18"})).unwrap();

        assert_eq!(snapshot.counters().len(), 1);
        assert_eq!(snapshot.counter("generatedAt"), None);
    }

    #[test]
    fn decodes_series() {
        let snapshot: StatsSnapshot = serde_json::from_value(json!({
            "userCount": 42,
            "series": {"userCount": [{"label": "Mon", "value": 40}, {"label": "Tue", "value": 42}]}
        }))
        .unwrap();

        let points = snapshot.series("userCount").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], SeriesPoint::new("Tue", 42.0));
    }

    #[test]
    fn rejects_malformed_series() {
        let result = StatsSnapshot::from_value(json!({"series": [1, 2, 3]}));
        assert!(result.unwrap_err().contains("series"));
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = StatsSnapshot::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err, "expected object, got array");
    }

    #[test]
    fn serializes_back_to_flat_object() {
        let snapshot = StatsSnapshot::from_counters([("userCount", 42.0)])
            .with_series("userCount", vec![SeriesPoint::new("Mon", 40.0)]);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["userCount"], json!(42.0));
        assert_eq!(value["series"]["userCount"][0]["label"], json!("Mon"));
    }

    #[test]
    fn overlay_prefers_newer_fields() {
        let http = StatsSnapshot::from_counters([("userCount", 10.0), ("assetCount", 5.0)]);
        let push = StatsSnapshot::from_counters([("userCount", 42.0)]);

        let merged = http.overlay(&push);

        assert_eq!(merged.counter("userCount"), Some(42.0));
        assert_eq!(merged.counter("assetCount"), Some(5.0));
        // inputs untouched
        assert_eq!(http.counter("userCount"), Some(10.0));
    }

    #[test]
    fn overlay_replaces_whole_series() {
        let http = StatsSnapshot::default().with_series(
            "tickets",
            vec![SeriesPoint::new("Mon", 1.0), SeriesPoint::new("Tue", 2.0)],
        );
        let push = StatsSnapshot::default().with_series("tickets", vec![SeriesPoint::new("Wed", 3.0)]);

        let merged = http.overlay(&push);

        assert_eq!(merged.series("tickets").unwrap(), &[SeriesPoint::new("Wed", 3.0)]);
    }
}
