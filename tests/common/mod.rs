//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use ebus_blocks::config::ScenarioConfig;
use ebus_blocks::schedule::Trip;
use ebus_blocks::sim::fleet::FleetRunner;

/// Consumption of a 10 mi trip under the winter regression.
pub const WINTER_10_MI_PCT: f64 = 7.6684;

/// Baseline runner (winter, regression, 90 % full, 30 % floor, 5 min layovers).
pub fn baseline_runner() -> FleetRunner {
    FleetRunner::from_scenario(&ScenarioConfig::baseline())
}

/// One trip departing from and returning to `stop`.
pub fn trip(block: &str, id: &str, start: f64, end: f64, miles: f64, stop: &str) -> Trip {
    Trip {
        trip_id: id.into(),
        block_id: block.into(),
        route_id: "R1".into(),
        start_minutes: start,
        end_minutes: end,
        distance_miles: miles,
        duration_minutes: end - start,
        origin_stop_id: stop.into(),
        destination_stop_id: stop.into(),
    }
}

/// `n` trips of `miles` / `minutes`, each `layover` minutes after the previous,
/// starting at 06:00. Trip ids are `{block}-01`, `{block}-02`, ...
pub fn block_trips(block: &str, n: usize, miles: f64, minutes: f64, layover: f64) -> Vec<Trip> {
    (0..n)
        .map(|i| {
            let start = 360.0 + (minutes + layover) * i as f64;
            trip(block, &format!("{block}-{:02}", i + 1), start, start + minutes, miles, "4405")
        })
        .collect()
}

/// Path to a file under `data/sample/`.
pub fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("sample")
        .join(name)
}
