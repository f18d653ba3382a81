//! Fleet-level results derived from per-block runs.

use std::fmt;

use crate::error::SimError;
use crate::schedule::{Schedule, Trip};
use crate::siting::LayoverSites;

use super::demand::ChargerDemandLedger;
use super::engine::{BlockRun, ChargeNeed};
use super::types::BlockFailure;

/// Charger requirement at one candidate site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDemand {
    pub site: String,
    /// Peak simultaneous vehicles, i.e. chargers to install.
    pub peak_chargers: u32,
    /// Distinct blocks that charged here.
    pub blocks_served: usize,
    pub charge_events: usize,
    /// Battery percentage delivered here, summed over blocks.
    pub total_charge_pct: f64,
}

/// Trip ending at the last layover stop before a block's failure.
#[derive(Debug, Clone, PartialEq)]
pub struct LastLayover<'s> {
    pub block_id: String,
    pub failed_trip_id: String,
    pub trip: &'s Trip,
}

/// Everything a fleet run produces.
///
/// Computed post-hoc from the block runs and the demand ledger, so the
/// per-site figures always match what was recorded.
#[derive(Debug, Clone)]
pub struct FleetReport {
    /// Feasibility run of every block, in schedule order.
    pub runs: Vec<BlockRun>,
    /// First infeasible trip of each failed block.
    pub failures: Vec<BlockFailure>,
    /// Charge-seeking result of each failed block.
    pub charge_needs: Vec<ChargeNeed>,
    /// One entry per registered ledger site, in registration order.
    pub site_demand: Vec<SiteDemand>,
}

impl FleetReport {
    /// Assembles the report.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError::UnregisteredSite`] from the ledger; only
    /// possible if the ledger is mutated while being read.
    pub fn from_runs(
        runs: Vec<BlockRun>,
        charge_needs: Vec<ChargeNeed>,
        ledger: &ChargerDemandLedger,
    ) -> Result<Self, SimError> {
        let failures = runs.iter().filter_map(BlockRun::failure).collect();

        let mut site_demand = Vec::new();
        for site in ledger.sites() {
            let total_charge_pct = charge_needs
                .iter()
                .filter_map(|n| n.site_charge_pct.get(site))
                .sum();
            site_demand.push(SiteDemand {
                site: site.to_string(),
                peak_chargers: ledger.peak_demand(site)?,
                blocks_served: ledger.block_count(site)?,
                charge_events: ledger.event_count(site)?,
                total_charge_pct,
            });
        }

        Ok(Self {
            runs,
            failures,
            charge_needs,
            site_demand,
        })
    }

    pub fn blocks_simulated(&self) -> usize {
        self.runs.len()
    }

    pub fn feasible_count(&self) -> usize {
        self.runs.iter().filter(|r| r.is_feasible()).count()
    }

    pub fn infeasible_count(&self) -> usize {
        self.failures.len()
    }

    /// Trips preceded by a realized charging event, across all failed blocks.
    pub fn charge_trip_ids(&self) -> impl Iterator<Item = &str> {
        self.charge_needs
            .iter()
            .flat_map(|n| n.charge_trip_ids.iter().map(String::as_str))
    }

    pub fn mean_residual_pct(&self) -> f64 {
        if self.charge_needs.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.charge_needs.iter().map(|n| n.residual_pct).sum();
        sum / self.charge_needs.len() as f64
    }

    pub fn max_residual_pct(&self) -> f64 {
        self.charge_needs
            .iter()
            .map(|n| n.residual_pct)
            .fold(0.0, f64::max)
    }

    pub fn unattributed_pct(&self) -> f64 {
        self.charge_needs.iter().map(|n| n.unattributed_pct).sum()
    }

    /// Total chargers across all sites.
    pub fn total_chargers(&self) -> u32 {
        self.site_demand.iter().map(|s| s.peak_chargers).sum()
    }

    /// Charging trips grouped by the stop where the vehicle laid over.
    ///
    /// Trip ids missing from `schedule` are skipped.
    pub fn refined_layover_sites(&self, schedule: &Schedule) -> LayoverSites {
        LayoverSites::from_origins(self.charge_trip_ids().filter_map(|id| schedule.trip(id)))
    }

    /// Last layover trip before each failure, for mapping where a charger would help.
    pub fn last_layover_trips<'s>(
        &self,
        schedule: &'s Schedule,
        layover_flag_minutes: f64,
    ) -> Vec<LastLayover<'s>> {
        self.failures
            .iter()
            .filter_map(|f| {
                let block = schedule.block(&f.block_id)?;
                let trip = block.last_layover_before(&f.trip_id, layover_flag_minutes)?;
                Some(LastLayover {
                    block_id: f.block_id.clone(),
                    failed_trip_id: f.trip_id.clone(),
                    trip,
                })
            })
            .collect()
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks = self.blocks_simulated();
        let infeasible_share = if blocks > 0 {
            100.0 * self.infeasible_count() as f64 / blocks as f64
        } else {
            0.0
        };

        writeln!(f, "--- Fleet Report ---")?;
        writeln!(f, "Blocks simulated:      {blocks}")?;
        writeln!(f, "Feasible blocks:       {}", self.feasible_count())?;
        writeln!(
            f,
            "Infeasible blocks:     {} ({infeasible_share:.1}%)",
            self.infeasible_count()
        )?;
        writeln!(f, "Mean residual charge:  {:.2}%", self.mean_residual_pct())?;
        writeln!(f, "Max residual charge:   {:.2}%", self.max_residual_pct())?;
        writeln!(f, "Layover charge events: {}", self.charge_trip_ids().count())?;
        writeln!(f, "Unattributed charge:   {:.2}%", self.unattributed_pct())?;
        writeln!(f, "Chargers required:     {}", self.total_chargers())?;

        writeln!(f, "--- Site Demand ---")?;
        writeln!(f, "{:<12} {:>8} {:>8} {:>10}", "site", "chargers", "blocks", "charge")?;
        for s in self.site_demand.iter().filter(|s| s.charge_events > 0) {
            writeln!(
                f,
                "{:<12} {:>8} {:>8} {:>9.2}%",
                s.site, s.peak_chargers, s.blocks_served, s.total_charge_pct
            )?;
        }
        Ok(())
    }
}
