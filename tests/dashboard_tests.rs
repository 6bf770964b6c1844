//! Dashboard coordinator tests: HTTP snapshot, pushed snapshots, fallback.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use resourcehub_dashboard::application::dashboard::{DashboardCoordinator, ViewSource, ViewState};
use resourcehub_dashboard::application::realtime::{EventKind, RealtimeClient};
use resourcehub_dashboard::domain::ChannelHealth;
use resourcehub_dashboard::port::outbound::credential::StaticCredential;
use resourcehub_dashboard::port::outbound::transport::CLOSE_ABNORMAL;
use resourcehub_dashboard::testkit;
use resourcehub_dashboard::testkit::domain::{
    initial_stats, notification, snapshot, snapshot_with_series, stats_update,
};
use resourcehub_dashboard::testkit::fetcher::{FetchStep, ScriptedFetcher};
use resourcehub_dashboard::testkit::transport::TransportRecorder;

fn coordinator(fetcher: ScriptedFetcher) -> (DashboardCoordinator, TransportRecorder) {
    let (factory, recorder) = testkit::transport::recording_factory();
    let client = RealtimeClient::new(
        testkit::config::realtime(),
        factory,
        Arc::new(StaticCredential::new("admin-token")),
    );
    (DashboardCoordinator::new(client, Arc::new(fetcher)), recorder)
}

fn ready(state: ViewState) -> resourcehub_dashboard::application::dashboard::DashboardView {
    match state {
        ViewState::Ready(view) => view,
        other => panic!("expected ready view, got {other:?}"),
    }
}

#[tokio::test]
async fn http_then_push_merges_fields() {
    let http = snapshot_with_series(
        &[("userCount", 100.0), ("assetCount", 12.0)],
        "userCount",
        &[("Mon", 95.0), ("Tue", 100.0)],
    );
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(http.clone()));

    dashboard.initialize();
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;
    assert_eq!(ready(dashboard.current_view()).snapshot, http);

    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    server
        .push_json(initial_stats(&snapshot(&[("userCount", 101.0), ("openTickets", 4.0)])))
        .await;
    testkit::wait_until(|| {
        dashboard.current_view().view().map(|v| v.source) == Some(ViewSource::Merged)
    })
    .await;

    let view = ready(dashboard.current_view());
    assert_eq!(view.snapshot.counter("userCount"), Some(101.0));
    assert_eq!(view.snapshot.counter("assetCount"), Some(12.0));
    assert_eq!(view.snapshot.counter("openTickets"), Some(4.0));
    assert_eq!(view.snapshot.series("userCount").map(<[_]>::len), Some(2));
    assert_eq!(view.health, ChannelHealth::Connected);
}

#[tokio::test]
async fn latest_push_wins() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(snapshot(&[("userCount", 1.0)])));

    dashboard.initialize();
    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    server.push_json(initial_stats(&snapshot(&[("userCount", 2.0)]))).await;
    server.push_json(stats_update(&snapshot(&[("userCount", 3.0)]))).await;
    testkit::wait_until(|| {
        dashboard
            .current_view()
            .view()
            .and_then(|v| v.snapshot.counter("userCount"))
            == Some(3.0)
    })
    .await;
}

#[tokio::test]
async fn malformed_push_leaves_view_unchanged() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(snapshot(&[("userCount", 5.0)])));

    dashboard.initialize();
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;
    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    testkit::wait_until(|| dashboard.client().is_connected()).await;
    let before = ready(dashboard.current_view()).snapshot;

    server.push("not json at all").await;
    server.push(r#"{"event":"stats_update","data":[1,2]}"#).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    let view = ready(dashboard.current_view());
    assert_eq!(view.snapshot, before);
    assert_eq!(view.source, ViewSource::Http);
    assert!(dashboard.client().is_connected());
}

#[tokio::test]
async fn http_failure_then_push_recovers() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::failing(502));

    dashboard.initialize();
    testkit::wait_until(|| matches!(dashboard.current_view(), ViewState::Failed { .. })).await;

    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    server.push_json(stats_update(&snapshot(&[("userCount", 9.0)]))).await;
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;

    let view = ready(dashboard.current_view());
    assert_eq!(view.source, ViewSource::Push);

    // Further fetch failures are not surfaced while pushed data is held.
    dashboard.refresh();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(dashboard.current_view().is_ready());
}

#[tokio::test]
async fn retry_after_fetch_failure_recovers_http() {
    let fetcher = ScriptedFetcher::new(vec![
        FetchStep::Status(503),
        FetchStep::Ok(snapshot(&[("userCount", 4.0)])),
    ]);
    let calls = fetcher.calls();
    let (dashboard, _recorder) = coordinator(fetcher);

    dashboard.initialize();
    testkit::wait_until(|| matches!(dashboard.current_view(), ViewState::Failed { .. })).await;

    dashboard.retry();
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(ready(dashboard.current_view()).source, ViewSource::Http);
}

#[tokio::test]
async fn view_reports_reconnecting_health() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(snapshot(&[("userCount", 1.0)])));

    dashboard.initialize();
    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    testkit::wait_until(|| dashboard.client().is_connected()).await;
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;

    server.close(CLOSE_ABNORMAL).await;
    testkit::wait_until(|| {
        matches!(
            dashboard.current_view().view().map(|v| v.health),
            Some(ChannelHealth::Reconnecting { .. })
        )
    })
    .await;
    dashboard.shutdown();
}

#[tokio::test]
async fn notifications_appear_in_view() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(snapshot(&[("userCount", 1.0)])));

    dashboard.initialize();
    testkit::wait_until(|| dashboard.current_view().is_ready()).await;
    let server = recorder.wait_for(0).await;
    server.authenticate().await;
    server.push_json(notification("warning", "disk at 91%")).await;
    testkit::wait_until(|| !ready(dashboard.current_view()).notifications.is_empty()).await;

    let view = ready(dashboard.current_view());
    assert_eq!(view.notifications[0].kind, "warning");
    assert_eq!(view.notifications[0].payload["message"], "disk at 91%");
}

#[tokio::test]
async fn shutdown_releases_client() {
    let (dashboard, recorder) = coordinator(ScriptedFetcher::ok(snapshot(&[("userCount", 1.0)])));
    let client = dashboard.client().clone();

    dashboard.initialize();
    recorder.wait_for(0).await;
    dashboard.shutdown();

    for kind in EventKind::ALL {
        assert_eq!(client.subscriber_count(kind), 0);
    }
    assert!(!client.is_connected());
}
