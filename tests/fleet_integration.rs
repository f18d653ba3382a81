//! End-to-end fleet runs over the sample data set.

mod common;

use ebus_blocks::config::ScenarioConfig;
use ebus_blocks::io::import::{load_lookup, load_schedule, load_sites, load_travel_times};
use ebus_blocks::schedule::Schedule;
use ebus_blocks::sim::demand::ChargerDemandLedger;
use ebus_blocks::sim::fleet::FleetRunner;
use ebus_blocks::sim::report::FleetReport;
use ebus_blocks::siting::{ChargeAccess, ChargeLookup, SiteRegistry};

use common::sample_path;

fn sample() -> (Schedule, ChargeLookup, SiteRegistry) {
    let schedule = load_schedule(&sample_path("schedule.csv")).unwrap();
    let lookup = load_lookup(&sample_path("lookup.csv")).unwrap();
    let registry = load_sites(&sample_path("sites.csv")).unwrap();
    (schedule, lookup, registry)
}

fn run(scenario: &ScenarioConfig) -> (FleetReport, ChargerDemandLedger) {
    let (schedule, lookup, registry) = sample();
    let mut ledger = ChargerDemandLedger::new(registry.site_ids());
    let report = FleetRunner::from_scenario(scenario)
        .run(&schedule, &lookup, &mut ledger)
        .unwrap();
    (report, ledger)
}

#[test]
fn sample_schedule_loads_in_block_order() {
    let (schedule, lookup, registry) = sample();
    let ids: Vec<&str> = schedule.blocks().map(|b| b.id).collect();
    assert_eq!(ids, vec!["B100", "B200", "B300", "B400"]);
    assert_eq!(schedule.trip_count(), 26);
    // derived from 06:30:00 to 06:55:00
    assert_eq!(schedule.trip("B300-01").map(|t| t.duration_minutes), Some(25.0));
    // 25:20:00
    assert_eq!(schedule.trip("B400-03").map(|t| t.end_minutes), Some(1520.0));
    assert_eq!(lookup.len(), 8);
    assert_eq!(registry.charger_sites().count(), 2);
}

#[test]
fn baseline_flags_the_two_long_blocks() {
    let (report, _) = run(&ScenarioConfig::baseline());
    assert_eq!(report.blocks_simulated(), 4);
    assert_eq!(report.feasible_count(), 2);
    let failures: Vec<(&str, &str)> = report
        .failures
        .iter()
        .map(|f| (f.block_id.as_str(), f.trip_id.as_str()))
        .collect();
    assert_eq!(failures, vec![("B200", "B200-08"), ("B300", "B300-08")]);
}

#[test]
fn layover_charging_covers_both_failed_blocks() {
    let (report, ledger) = run(&ScenarioConfig::baseline());
    assert_eq!(report.charge_needs.len(), 2);
    for need in &report.charge_needs {
        assert_eq!(need.residual_pct, 0.0, "block {}", need.block_id);
        assert_eq!(need.charge_trip_ids.len(), 4);
    }
    assert_eq!(ledger.peak_demand("4405").unwrap(), 1);
    assert_eq!(ledger.block_count("4405").unwrap(), 1);
    assert_eq!(ledger.peak_demand("16063").unwrap(), 1);
    assert_eq!(ledger.peak_demand("8308").unwrap(), 0);

    let site_4405 = report.site_demand.iter().find(|s| s.site == "4405").unwrap();
    assert_eq!(site_4405.charge_events, 4);
    assert!(site_4405.total_charge_pct > 0.0);
}

#[test]
fn summer_relieves_the_shorter_block() {
    let (report, _) = run(&ScenarioConfig::summer());
    assert_eq!(report.infeasible_count(), 1);
    assert_eq!(report.failures[0].trip_id, "B200-10");
}

#[test]
fn worst_case_fails_earlier() {
    let (report, _) = run(&ScenarioConfig::winter_worst_case());
    let failures: Vec<&str> = report.failures.iter().map(|f| f.trip_id.as_str()).collect();
    // 9.2 % and 10.12 % per trip
    assert_eq!(failures, vec!["B200-07", "B300-06"]);
}

#[test]
fn refined_pass_relays_non_charger_layovers() {
    let (schedule, lookup, registry) = sample();
    let travel = load_travel_times(&sample_path("travel_times.csv")).unwrap();
    let runner = FleetRunner::from_scenario(&ScenarioConfig::baseline());
    let mut ledger = ChargerDemandLedger::new(registry.site_ids());
    let first = runner.run(&schedule, &lookup, &mut ledger).unwrap();

    let refined = runner.refine(&schedule, &first, &registry, &travel).unwrap();
    assert_eq!(refined.layover_sites.len(), 2);
    assert_eq!(refined.lookup.get("B200-05"), Some(&ChargeAccess::new("4405", 0.0)));
    // 8308 has no charger; 16063 is 6 minutes away, 4405 is 12
    assert_eq!(refined.lookup.get("B300-07"), Some(&ChargeAccess::new("16063", 6.0)));
    assert_eq!(refined.report.infeasible_count(), 2);
    assert_eq!(refined.report.max_residual_pct(), 0.0);
}

#[test]
fn last_layover_before_failure() {
    let (schedule, _, _) = sample();
    let (report, _) = run(&ScenarioConfig::baseline());
    let last = report.last_layover_trips(&schedule, 5.0);
    let pairs: Vec<(&str, &str)> = last
        .iter()
        .map(|l| (l.failed_trip_id.as_str(), l.trip.trip_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("B200-08", "B200-07"), ("B300-08", "B300-07")]);
}
