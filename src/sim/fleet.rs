//! Fleet runner: every block through the simulator, failed blocks re-run
//! for charger demand, and the refined second pass.

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::models::{ChargingModel, EnergyModel};
use crate::schedule::Schedule;
use crate::siting::{ChargeLookup, LayoverSites, SiteRegistry, TravelTimeMatrix};

use super::demand::ChargerDemandLedger;
use super::engine::BlockSimulator;
use super::layover::LayoverChargeEvaluator;
use super::report::FleetReport;
use super::types::SimConfig;

/// Result of the second simulation pass.
#[derive(Debug, Clone)]
pub struct RefinedRun {
    /// Layover stops of the first pass's charging trips.
    pub layover_sites: LayoverSites,
    /// Trip → charger table derived from `layover_sites`.
    pub lookup: ChargeLookup,
    pub ledger: ChargerDemandLedger,
    pub report: FleetReport,
}

/// Owns the immutable run configuration and models for a fleet.
#[derive(Debug, Clone)]
pub struct FleetRunner {
    config: SimConfig,
    energy: EnergyModel,
    charging: ChargingModel,
    max_relay_minutes: f64,
}

impl FleetRunner {
    /// Builds the runner from a validated scenario.
    ///
    /// # Panics
    ///
    /// Panics if the scenario's charge rates are not positive; run
    /// [`ScenarioConfig::validate`] first.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        Self {
            config: SimConfig::from_scenario(scenario),
            energy: EnergyModel::new(&scenario.energy),
            charging: ChargingModel::new(&scenario.charging),
            max_relay_minutes: scenario.siting.max_relay_minutes,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// A block simulator bound to `lookup`.
    pub fn simulator<'a>(&'a self, lookup: &'a ChargeLookup) -> BlockSimulator<'a> {
        let evaluator = LayoverChargeEvaluator::new(
            lookup,
            self.config.lookup_fallback,
            self.config.min_charge_minutes,
        );
        BlockSimulator::new(&self.config, &self.energy, &self.charging, evaluator)
    }

    /// Runs every block, then re-runs the failed ones in charge-seeking mode.
    ///
    /// # Arguments
    ///
    /// * `schedule` - Indexed trips, simulated block by block in schedule order
    /// * `lookup` - Trip → charger table for layover evaluation
    /// * `ledger` - Demand accumulator; must know every site `lookup` names
    ///
    /// # Errors
    ///
    /// [`SimError::UnregisteredSite`] if a charging event hits a site the
    /// ledger does not know.
    pub fn run(
        &self,
        schedule: &Schedule,
        lookup: &ChargeLookup,
        ledger: &mut ChargerDemandLedger,
    ) -> Result<FleetReport, SimError> {
        let simulator = self.simulator(lookup);
        let mut runs = Vec::with_capacity(schedule.block_count());
        let mut charge_needs = Vec::new();

        for block in schedule.blocks() {
            let run = simulator.run_feasibility(&block);
            if !run.is_feasible() {
                charge_needs.push(simulator.run_charge_seeking(&block, ledger)?);
            }
            runs.push(run);
        }

        let report = FleetReport::from_runs(runs, charge_needs, ledger)?;
        log::info!(
            "simulated {} blocks: {} feasible, {} infeasible",
            report.blocks_simulated(),
            report.feasible_count(),
            report.infeasible_count()
        );
        Ok(report)
    }

    /// Feeds the first pass's charging trips back as a refined lookup and
    /// re-runs the fleet against a fresh ledger.
    ///
    /// Layover stops missing from `registry` are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Propagates errors from lookup resolution and the second run.
    pub fn refine(
        &self,
        schedule: &Schedule,
        first_pass: &FleetReport,
        registry: &SiteRegistry,
        travel: &TravelTimeMatrix,
    ) -> Result<RefinedRun, SimError> {
        let mut layover_sites = first_pass.refined_layover_sites(schedule);
        let dropped = layover_sites.retain_registered(registry);
        if !dropped.is_empty() {
            log::warn!(
                "{} layover stops are not candidate sites and were dropped: {}",
                dropped.len(),
                dropped.join(", ")
            );
        }

        let lookup =
            ChargeLookup::resolve(&layover_sites, registry, travel, self.max_relay_minutes)?;
        let mut ledger = ChargerDemandLedger::new(registry.site_ids());
        let report = self.run(schedule, &lookup, &mut ledger)?;

        Ok(RefinedRun {
            layover_sites,
            lookup,
            ledger,
            report,
        })
    }
}
