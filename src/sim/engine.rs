//! Block simulator: walks one block's trips and tracks its battery.

use std::collections::BTreeMap;

use crate::error::SimError;
use crate::models::{ChargingModel, EnergyModel};
use crate::schedule::{Block, Trip};

use super::demand::ChargerDemandLedger;
use super::layover::{ChargeOpportunity, LayoverChargeEvaluator};
use super::types::{BlockFailure, BlockStatus, SimConfig, TripRecord, VehicleState};

/// Outcome of the feasibility pass over one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRun {
    pub block_id: String,
    /// `Completed`, or `Failed` at the first trip that breached the floor.
    pub status: BlockStatus,
    /// One record per trip processed, including the failing trip.
    pub records: Vec<TripRecord>,
    /// Battery after each completed trip, starting with the initial charge.
    pub trajectory: Vec<f64>,
    /// Battery after the last completed trip.
    pub final_battery_pct: f64,
}

impl BlockRun {
    pub fn is_feasible(&self) -> bool {
        self.status == BlockStatus::Completed
    }

    /// The failing trip and block, if the block is infeasible.
    pub fn failure(&self) -> Option<BlockFailure> {
        match &self.status {
            BlockStatus::Failed(trip_id) => Some(BlockFailure {
                trip_id: trip_id.clone(),
                block_id: self.block_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Outcome of the charge-seeking pass over one block.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeNeed {
    pub block_id: String,
    /// Charge still needed to finish above the floor: `max(0, floor - final battery)`.
    pub residual_pct: f64,
    /// Charge added at each site.
    pub site_charge_pct: BTreeMap<String, f64>,
    /// Trips preceded by a realized charging event, in block order.
    pub charge_trip_ids: Vec<String>,
    /// Charge added through the permissive fallback, with no known site.
    pub unattributed_pct: f64,
    /// First trip that still ends below the floor despite layover charging.
    pub first_shortfall_trip: Option<String>,
    pub records: Vec<TripRecord>,
    pub final_battery_pct: f64,
}

/// Per-block battery state machine.
///
/// Each trip: measure the layover since the previous trip, charge if the
/// layover is an opportunity, then subtract the trip's consumption. The
/// feasibility pass only probes charging and stops at the first trip that
/// leaves the battery below `min_charge_threshold_pct`. The charge-seeking
/// pass commits every charge, books it in the demand ledger, and runs the
/// whole block.
pub struct BlockSimulator<'a> {
    config: &'a SimConfig,
    energy: &'a EnergyModel,
    charging: &'a ChargingModel,
    evaluator: LayoverChargeEvaluator<'a>,
}

impl<'a> BlockSimulator<'a> {
    /// Creates a simulator over shared, immutable models.
    ///
    /// # Arguments
    ///
    /// * `config` - Run parameters
    /// * `energy` - Trip consumption model
    /// * `charging` - Layover charging model
    /// * `evaluator` - Layover opportunity check, already bound to a lookup
    pub fn new(
        config: &'a SimConfig,
        energy: &'a EnergyModel,
        charging: &'a ChargingModel,
        evaluator: LayoverChargeEvaluator<'a>,
    ) -> Self {
        Self {
            config,
            energy,
            charging,
            evaluator,
        }
    }

    pub fn config(&self) -> &SimConfig {
        self.config
    }

    /// Runs the feasibility pass with speculative (uncommitted) charging.
    ///
    /// Deterministic: identical blocks and configuration give identical runs.
    pub fn run_feasibility(&self, block: &Block<'_>) -> BlockRun {
        let mut state = VehicleState::new(block.id, self.config.full_charge_pct);
        let mut status = BlockStatus::Running;
        let mut records = Vec::with_capacity(block.trips.len());
        let mut prev_end = self.config.initial_prev_end_minutes;

        for trip in &block.trips {
            let gap = trip.start_minutes - prev_end;
            let opportunity = self.opportunity(gap, trip);
            let charge_pct = opportunity.as_ref().map_or(0.0, |o| {
                self.charging.apply_charge(
                    &mut state,
                    o.usable_minutes,
                    self.config.charger_class,
                    self.config.full_charge_pct,
                    false,
                )
            });
            prev_end = trip.end_minutes;

            let consumed = self.consumed(trip);
            let battery_after = state.battery_pct - consumed;
            records.push(TripRecord {
                trip_id: trip.trip_id.clone(),
                start_minutes: trip.start_minutes,
                end_minutes: trip.end_minutes,
                gap_minutes: gap,
                charge_site: opportunity.and_then(|o| o.site),
                charge_pct,
                charge_committed: false,
                consumed_pct: consumed,
                battery_after_pct: battery_after,
            });

            if battery_after < self.config.min_charge_threshold_pct {
                log::debug!(
                    "block {} fails at trip {} ({battery_after:.2}%)",
                    block.id,
                    trip.trip_id
                );
                status = BlockStatus::Failed(trip.trip_id.clone());
                break;
            }
            state.battery_pct = battery_after;
            state.trajectory.push(battery_after);
        }

        if status == BlockStatus::Running {
            status = BlockStatus::Completed;
        }

        BlockRun {
            block_id: state.block_id,
            status,
            records,
            trajectory: state.trajectory,
            final_battery_pct: state.battery_pct,
        }
    }

    /// Runs the charge-seeking pass, committing charge and recording demand.
    ///
    /// Every realized charging event occupies its site from the previous
    /// trip's end plus the one-way travel time, for the usable dwell, and is
    /// booked in `ledger` before the trip's consumption is subtracted.
    /// Charge granted by the permissive fallback has no site and is only
    /// tallied in [`ChargeNeed::unattributed_pct`].
    ///
    /// # Errors
    ///
    /// [`SimError::UnregisteredSite`] if the lookup names a site the ledger
    /// does not know.
    pub fn run_charge_seeking(
        &self,
        block: &Block<'_>,
        ledger: &mut ChargerDemandLedger,
    ) -> Result<ChargeNeed, SimError> {
        let mut state = VehicleState::new(block.id, self.config.full_charge_pct);
        let mut records = Vec::with_capacity(block.trips.len());
        let mut site_charge_pct: BTreeMap<String, f64> = BTreeMap::new();
        let mut charge_trip_ids = Vec::new();
        let mut unattributed_pct = 0.0;
        let mut first_shortfall_trip = None;
        let mut prev_end = self.config.initial_prev_end_minutes;

        for trip in &block.trips {
            let gap = trip.start_minutes - prev_end;
            let mut charge_pct = 0.0;
            let mut charge_site = None;

            if let Some(opportunity) = self.opportunity(gap, trip) {
                charge_pct = self.charging.apply_charge(
                    &mut state,
                    opportunity.usable_minutes,
                    self.config.charger_class,
                    self.config.full_charge_pct,
                    true,
                );
                match &opportunity.site {
                    Some(site) => {
                        ledger.record_charging(
                            site,
                            prev_end + opportunity.travel_minutes,
                            opportunity.usable_minutes,
                            block.id,
                        )?;
                        *site_charge_pct.entry(site.clone()).or_insert(0.0) += charge_pct;
                    }
                    None => {
                        log::warn!(
                            "block {} charged {charge_pct:.2}% before trip {} at an unknown site",
                            block.id,
                            trip.trip_id
                        );
                        unattributed_pct += charge_pct;
                    }
                }
                charge_trip_ids.push(trip.trip_id.clone());
                charge_site = opportunity.site;
            }
            prev_end = trip.end_minutes;

            let consumed = self.consumed(trip);
            state.battery_pct -= consumed;
            state.trajectory.push(state.battery_pct);
            if state.battery_pct < self.config.min_charge_threshold_pct
                && first_shortfall_trip.is_none()
            {
                first_shortfall_trip = Some(trip.trip_id.clone());
            }

            records.push(TripRecord {
                trip_id: trip.trip_id.clone(),
                start_minutes: trip.start_minutes,
                end_minutes: trip.end_minutes,
                gap_minutes: gap,
                charge_site,
                charge_pct,
                charge_committed: true,
                consumed_pct: consumed,
                battery_after_pct: state.battery_pct,
            });
        }

        let residual_pct = (self.config.min_charge_threshold_pct - state.battery_pct).max(0.0);
        log::debug!(
            "block {} needs {residual_pct:.2}% after {} layover charges",
            block.id,
            charge_trip_ids.len()
        );

        Ok(ChargeNeed {
            block_id: state.block_id,
            residual_pct,
            site_charge_pct,
            charge_trip_ids,
            unattributed_pct,
            first_shortfall_trip,
            records,
            final_battery_pct: state.battery_pct,
        })
    }

    fn opportunity(&self, gap_minutes: f64, trip: &Trip) -> Option<ChargeOpportunity> {
        if gap_minutes > self.config.min_charge_minutes {
            self.evaluator.evaluate(gap_minutes, &trip.trip_id)
        } else {
            None
        }
    }

    fn consumed(&self, trip: &Trip) -> f64 {
        self.energy.energy_consumed(
            trip.distance_miles,
            trip.duration_minutes,
            self.config.season,
            self.config.vehicle_class,
            self.config.eval_mode,
        )
    }
}
