//! Core simulation types: immutable run configuration, vehicle state, and per-trip records.

use std::fmt;

use crate::config::ScenarioConfig;
use crate::models::types::{ChargerClass, EvalMode, Season, VehicleClass};
use crate::sim::layover::LookupFallback;

/// Run parameters threaded through every component call.
///
/// Built once from a validated [`ScenarioConfig`] and never mutated during
/// a run.
///
/// # Examples
///
/// ```
/// use ebus_blocks::config::ScenarioConfig;
/// use ebus_blocks::sim::types::SimConfig;
///
/// let cfg = SimConfig::from_scenario(&ScenarioConfig::baseline());
/// assert_eq!(cfg.full_charge_pct, 90.0);
/// assert_eq!(cfg.min_charge_threshold_pct, 30.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Battery percentage at block start; the charging ceiling.
    pub full_charge_pct: f64,
    /// Failure floor (strictly below fails).
    pub min_charge_threshold_pct: f64,
    /// Minimum layover, exclusive, for a charging opportunity (minutes).
    pub min_charge_minutes: f64,
    /// Sentinel "previous end" before a block's first trip (minutes).
    pub initial_prev_end_minutes: f64,
    pub season: Season,
    pub eval_mode: EvalMode,
    pub vehicle_class: VehicleClass,
    pub charger_class: ChargerClass,
    pub lookup_fallback: LookupFallback,
}

impl SimConfig {
    /// Extracts the run parameters from a scenario.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let s = &scenario.simulation;
        Self {
            full_charge_pct: s.full_charge_pct,
            min_charge_threshold_pct: s.min_charge_threshold_pct,
            min_charge_minutes: s.min_charge_minutes,
            initial_prev_end_minutes: s.initial_prev_end_minutes,
            season: s.season,
            eval_mode: s.eval_mode,
            vehicle_class: s.vehicle_class,
            charger_class: scenario.charging.charger_class,
            lookup_fallback: s.lookup_fallback,
        }
    }
}

/// Battery state of one vehicle for the duration of one block run.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Current battery percentage.
    pub battery_pct: f64,
    /// Block this vehicle is operating.
    pub block_id: String,
    /// Battery percentage after each completed trip, starting with the initial charge.
    pub trajectory: Vec<f64>,
}

impl VehicleState {
    pub fn new(block_id: impl Into<String>, battery_pct: f64) -> Self {
        Self {
            battery_pct,
            block_id: block_id.into(),
            trajectory: vec![battery_pct],
        }
    }
}

/// Where a block's state machine ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    Running,
    /// Stopped at this trip id because the battery fell below the floor.
    Failed(String),
    Completed,
}

/// First infeasible trip of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
    pub trip_id: String,
    pub block_id: String,
}

/// Record of one simulated trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub trip_id: String,
    /// Scheduled start in minutes past service-day midnight.
    pub start_minutes: f64,
    /// Scheduled end in minutes past service-day midnight.
    pub end_minutes: f64,
    /// Layover since the previous trip's end (minutes).
    pub gap_minutes: f64,
    /// Site of the layover charge, when one was identified.
    pub charge_site: Option<String>,
    /// Percentage added (or, for an uncommitted pass, that could have been added).
    pub charge_pct: f64,
    /// Whether `charge_pct` was applied to the battery.
    pub charge_committed: bool,
    /// Percentage consumed by the trip.
    pub consumed_pct: f64,
    /// Battery after the trip.
    pub battery_after_pct: f64,
}

impl fmt::Display for TripRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trip={:<12} start={:>7.1}m end={:>7.1}m gap={:>6.1}m | charge={:>5.2}%{} \
             used={:>5.2}% | battery={:>6.2}%",
            self.trip_id,
            self.start_minutes,
            self.end_minutes,
            self.gap_minutes,
            self.charge_pct,
            if self.charge_committed { "" } else { "?" },
            self.consumed_pct,
            self.battery_after_pct,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_state_starts_trajectory_with_initial_charge() {
        let state = VehicleState::new("B7", 90.0);
        assert_eq!(state.trajectory, vec![90.0]);
        assert_eq!(state.block_id, "B7");
    }

    #[test]
    fn sim_config_picks_up_charger_class() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.charging.charger_class = ChargerClass::Slow;
        let cfg = SimConfig::from_scenario(&scenario);
        assert_eq!(cfg.charger_class, ChargerClass::Slow);
        assert_eq!(cfg.initial_prev_end_minutes, 1620.0);
    }

    #[test]
    fn trip_record_display_does_not_panic() {
        let r = TripRecord {
            trip_id: "T1".into(),
            start_minutes: 360.0,
            end_minutes: 400.0,
            gap_minutes: 12.0,
            charge_site: Some("4405".into()),
            charge_pct: 3.2,
            charge_committed: false,
            consumed_pct: 7.7,
            battery_after_pct: 82.3,
        };
        let s = format!("{r}");
        assert!(s.contains("T1"));
    }
}
