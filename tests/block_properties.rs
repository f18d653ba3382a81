//! Behavioural properties of the block simulator and its models.

mod common;

use ebus_blocks::config::{EnergyConfig, ScenarioConfig};
use ebus_blocks::models::{
    ChargerClass, ChargingModel, EnergyCoefficients, EnergyModel, EvalMode, Season, VehicleClass,
};
use ebus_blocks::schedule::{Block, Schedule};
use ebus_blocks::sim::demand::ChargerDemandLedger;
use ebus_blocks::sim::fleet::FleetRunner;
use ebus_blocks::sim::types::{BlockFailure, BlockStatus, VehicleState};
use ebus_blocks::siting::{ChargeAccess, ChargeLookup};

use common::{WINTER_10_MI_PCT, baseline_runner, block_trips, trip};

#[test]
fn consumption_is_never_negative() {
    let mut config = EnergyConfig::default();
    // a parameterization whose linear form is negative everywhere
    config.summer_worst_case = EnergyCoefficients::new(-1.5, -0.2, -3.0);
    let model = EnergyModel::new(&config);

    for season in [Season::Summer, Season::Winter] {
        for mode in [EvalMode::Regression, EvalMode::WorstCase] {
            for class in [VehicleClass::Standard, VehicleClass::Oversized] {
                for miles in [0.0, 0.5, 3.0, 10.0, 42.0] {
                    for minutes in [0.0, 5.0, 20.0, 90.0] {
                        let pct = model.energy_consumed(miles, minutes, season, class, mode);
                        assert!(pct >= 0.0, "{season}/{mode}/{class} {miles}mi {minutes}min gave {pct}");
                    }
                }
            }
        }
    }
}

#[test]
fn zero_length_trip_consumes_constant_term() {
    let model = EnergyModel::new(&EnergyConfig::default());
    let pct = model.energy_consumed(
        0.0,
        0.0,
        Season::Winter,
        VehicleClass::Standard,
        EvalMode::Regression,
    );
    assert!((pct - 1.7664).abs() < 1e-12);
}

#[test]
fn charging_stays_between_prior_and_full() {
    let model = ChargingModel::new(&ScenarioConfig::baseline().charging);
    for start in [5.0, 29.9, 60.0, 88.0, 90.0] {
        for dwell in [0.0, 5.5, 12.0, 180.0] {
            for class in [ChargerClass::Fast, ChargerClass::Slow] {
                let mut state = VehicleState::new("B", start);
                model.apply_charge(&mut state, dwell, class, 90.0, true);
                assert!(state.battery_pct >= start);
                assert!(state.battery_pct <= 90.0);
            }
        }
    }
}

#[test]
fn zero_consumption_block_never_fails() {
    let mut scenario = ScenarioConfig::baseline();
    scenario.energy.winter_regression = EnergyCoefficients::new(0.0, 0.0, 0.0);
    let runner = FleetRunner::from_scenario(&scenario);
    let lookup = ChargeLookup::default();
    let trips = block_trips("ZERO", 40, 25.0, 45.0, 0.0);
    let block = Block::from_trips("ZERO", trips.iter().collect());

    let run = runner.simulator(&lookup).run_feasibility(&block);
    assert_eq!(run.status, BlockStatus::Completed);
    assert!(run.trajectory.iter().all(|&pct| pct == 90.0));
}

#[test]
fn three_ten_mile_trips_complete() {
    let runner = baseline_runner();
    let lookup = ChargeLookup::default();
    let trips = block_trips("B3", 3, 10.0, 20.0, 0.0);
    let block = Block::from_trips("B3", trips.iter().collect());

    let run = runner.simulator(&lookup).run_feasibility(&block);
    assert!(run.is_feasible());
    let expected = 90.0 - 3.0 * WINTER_10_MI_PCT;
    assert!((run.final_battery_pct - expected).abs() < 1e-9);
}

#[test]
fn failure_reports_first_trip_below_floor_and_its_block() {
    let runner = baseline_runner();
    let lookup = ChargeLookup::default();
    let trips = block_trips("B10", 10, 10.0, 20.0, 0.0);
    let block = Block::from_trips("B10", trips.iter().collect());

    let run = runner.simulator(&lookup).run_feasibility(&block);
    // 90 - 7 * 7.6684 = 36.32 holds, 90 - 8 * 7.6684 = 28.65 breaches
    assert_eq!(
        run.failure(),
        Some(BlockFailure {
            trip_id: "B10-08".into(),
            block_id: "B10".into(),
        })
    );
    assert_eq!(run.records.last().map(|r| r.trip_id.as_str()), Some("B10-08"));
}

#[test]
fn layover_equal_to_minimum_is_not_an_opportunity() {
    let runner = baseline_runner();
    let mut lookup = ChargeLookup::default();
    lookup.insert("B-02", ChargeAccess::new("4405", 0.0));
    lookup.insert("C-02", ChargeAccess::new("4405", 0.0));
    let simulator = runner.simulator(&lookup);

    let exact = [
        trip("B", "B-01", 360.0, 380.0, 10.0, "4405"),
        trip("B", "B-02", 385.0, 405.0, 10.0, "4405"),
    ];
    let run = simulator.run_feasibility(&Block::from_trips("B", exact.iter().collect()));
    assert_eq!(run.records[1].gap_minutes, 5.0);
    assert_eq!(run.records[1].charge_pct, 0.0);

    let longer = [
        trip("C", "C-01", 360.0, 380.0, 10.0, "4405"),
        trip("C", "C-02", 386.0, 406.0, 10.0, "4405"),
    ];
    let run = simulator.run_feasibility(&Block::from_trips("C", longer.iter().collect()));
    assert_eq!(run.records[1].gap_minutes, 6.0);
    assert!(run.records[1].charge_pct > 0.0);
    assert_eq!(run.records[1].charge_site.as_deref(), Some("4405"));
}

#[test]
fn feasibility_pass_is_idempotent() {
    let runner = baseline_runner();
    let mut lookup = ChargeLookup::default();
    lookup.insert("I-04", ChargeAccess::new("4405", 1.0));
    let trips = block_trips("I", 12, 9.0, 25.0, 12.0);
    let block = Block::from_trips("I", trips.iter().collect());
    let simulator = runner.simulator(&lookup);

    let first = simulator.run_feasibility(&block);
    let second = simulator.run_feasibility(&block);
    assert_eq!(first, second);
    assert_eq!(first.trajectory, second.trajectory);
}

#[test]
fn charge_seeking_on_feasible_block_needs_nothing() {
    let runner = baseline_runner();
    let lookup = ChargeLookup::default();
    let trips = block_trips("OK", 4, 10.0, 20.0, 10.0);
    let schedule = Schedule::new(trips).unwrap();
    let block = schedule.block("OK").unwrap();
    let simulator = runner.simulator(&lookup);

    assert!(simulator.run_feasibility(&block).is_feasible());
    let mut ledger = ChargerDemandLedger::default();
    let need = simulator.run_charge_seeking(&block, &mut ledger).unwrap();
    assert_eq!(need.residual_pct, 0.0);
    assert!(need.first_shortfall_trip.is_none());
}

#[test]
fn overlapping_and_disjoint_charging_intervals() {
    let mut overlapping = ChargerDemandLedger::new(["S"]);
    overlapping.record_charging("S", 100.0, 10.0, "A").unwrap();
    overlapping.record_charging("S", 105.0, 10.0, "B").unwrap();
    assert_eq!(overlapping.peak_demand("S").unwrap(), 2);

    let mut disjoint = ChargerDemandLedger::new(["S"]);
    disjoint.record_charging("S", 100.0, 10.0, "A").unwrap();
    disjoint.record_charging("S", 110.0, 10.0, "B").unwrap();
    assert_eq!(disjoint.peak_demand("S").unwrap(), 1);
}

#[test]
fn oversized_buses_fail_earlier() {
    let mut scenario = ScenarioConfig::baseline();
    scenario.simulation.vehicle_class = VehicleClass::Oversized;
    let oversized = FleetRunner::from_scenario(&scenario);
    let standard = baseline_runner();
    let lookup = ChargeLookup::default();
    let trips = block_trips("X", 10, 10.0, 20.0, 0.0);
    let block = Block::from_trips("X", trips.iter().collect());

    let big = oversized.simulator(&lookup).run_feasibility(&block);
    let small = standard.simulator(&lookup).run_feasibility(&block);
    // 7.6684 * 1.58 = 12.116 per trip: 90 - 5 * 12.116 = 29.42
    assert_eq!(big.status, BlockStatus::Failed("X-05".into()));
    assert_eq!(small.status, BlockStatus::Failed("X-08".into()));
}
