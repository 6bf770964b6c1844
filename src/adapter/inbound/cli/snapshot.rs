//! Handler for the `snapshot` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ConfigPathArg;
use crate::adapter::inbound::cli::output;
use crate::domain::StatsSnapshot;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::snapshot::SnapshotFetcher;

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Counter")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "Series")]
    name: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Latest")]
    latest: String,
}

/// Fetch the stats snapshot once and print it.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    let credentials = bootstrap::build_credentials(&config);
    let client = bootstrap::build_snapshot_client(&config, credentials);
    let snapshot = client.fetch_snapshot().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "snapshot",
            "source": client.source_name(),
            "url": client.url(),
            "snapshot": snapshot,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Source", client.url());
    print_snapshot(&snapshot);
    Ok(())
}

/// Render counters and series as tables.
pub fn print_snapshot(snapshot: &StatsSnapshot) {
    if snapshot.is_empty() {
        output::warning("Snapshot is empty");
        return;
    }

    output::section("Counters");
    let rows: Vec<CounterRow> = snapshot
        .counters()
        .iter()
        .map(|(name, value)| CounterRow {
            name: name.clone(),
            value: format_value(*value),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    if snapshot.all_series().is_empty() {
        return;
    }
    output::section("Series");
    let rows: Vec<SeriesRow> = snapshot
        .all_series()
        .iter()
        .map(|(name, points)| SeriesRow {
            name: name.clone(),
            points: points.len(),
            latest: points
                .last()
                .map(|p| format!("{} ({})", format_value(p.value), p.label))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
}

/// Whole numbers without a fraction, everything else with two decimals.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_value_drops_zero_fraction() {
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(-3.0), "-3");
        assert_eq!(format_value(7.5), "7.50");
    }
}
