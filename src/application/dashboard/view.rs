//! What the dashboard shows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ChannelHealth, NotificationRecord, StatsSnapshot};

/// Where the displayed snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSource {
    /// HTTP snapshot only; nothing pushed yet.
    Http,
    /// Pushed snapshot only; the HTTP fetch has not succeeded.
    Push,
    /// HTTP snapshot overridden by the latest pushed one.
    Merged,
}

impl fmt::Display for ViewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Push => write!(f, "push"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A ready-to-render dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub snapshot: StatsSnapshot,
    pub source: ViewSource,
    /// Most recent notifications, oldest first.
    pub notifications: Vec<NotificationRecord>,
    pub health: ChannelHealth,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The coordinator's answer to "what should be on screen".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// No snapshot from either source yet.
    Loading,
    Ready(DashboardView),
    /// The HTTP fetch failed and nothing has been pushed.
    Failed { message: String },
}

impl ViewState {
    #[must_use]
    pub const fn view(&self) -> Option<&DashboardView> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Pick the snapshot to display.
///
/// The HTTP snapshot is the base; a pushed snapshot overrides every field it
/// carries.
pub(crate) fn compose(
    http: Option<&StatsSnapshot>,
    push: Option<&StatsSnapshot>,
) -> Option<(StatsSnapshot, ViewSource)> {
    match (http, push) {
        (Some(http), Some(push)) => Some((http.overlay(push), ViewSource::Merged)),
        (Some(http), None) => Some((http.clone(), ViewSource::Http)),
        (None, Some(push)) => Some((push.clone(), ViewSource::Push)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::snapshot;

    #[test]
    fn nothing_to_compose_without_snapshots() {
        assert!(compose(None, None).is_none());
    }

    #[test]
    fn http_only_is_returned_unmodified() {
        let http = snapshot(&[("userCount", 10.0)]);
        let (shown, source) = compose(Some(&http), None).unwrap();

        assert_eq!(shown, http);
        assert_eq!(source, ViewSource::Http);
    }

    #[test]
    fn push_fields_override_http() {
        let http = snapshot(&[("userCount", 10.0), ("assetCount", 4.0)]);
        let push = snapshot(&[("userCount", 12.0), ("openTickets", 1.0)]);

        let (shown, source) = compose(Some(&http), Some(&push)).unwrap();

        assert_eq!(source, ViewSource::Merged);
        assert_eq!(shown.counter("userCount"), Some(12.0));
        assert_eq!(shown.counter("assetCount"), Some(4.0));
        assert_eq!(shown.counter("openTickets"), Some(1.0));
        assert_eq!(http.counter("userCount"), Some(10.0));
    }

    #[test]
    fn ready_state_serializes_with_tag() {
        let state = ViewState::Failed {
            message: "HTTP 503".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "HTTP 503");
    }
}
