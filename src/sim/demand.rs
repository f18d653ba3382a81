//! Per-site charger occupancy accumulated across charge-seeking runs.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::error::SimError;

/// Ledger resolution.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// One change point of a site's occupancy curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyStep {
    /// Minute of day at which the level takes effect.
    pub minute_of_day: f64,
    /// Vehicles charging from this minute until the next step.
    pub vehicles: u32,
}

#[derive(Debug, Clone, Default)]
struct SiteTimeline {
    /// Second of day → net change in charging vehicles.
    deltas: BTreeMap<i64, i64>,
    blocks: BTreeSet<String>,
    events: usize,
}

impl SiteTimeline {
    fn add_interval(&mut self, start_s: i64, end_s: i64) {
        for (at, delta) in [(start_s, 1), (end_s, -1)] {
            let slot = self.deltas.entry(at).or_insert(0);
            *slot += delta;
            if *slot == 0 {
                self.deltas.remove(&at);
            }
        }
    }

    /// Running occupancy at each change point, in time order.
    fn levels(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.deltas.iter().scan(0_i64, |level, (&at, &delta)| {
            *level += delta;
            Some((at, *level))
        })
    }

    fn peak(&self) -> u32 {
        self.levels()
            .map(|(_, level)| level)
            .max()
            .map_or(0, |peak| peak.max(0) as u32)
    }
}

/// Sweep-line accumulator of simultaneous charging per candidate site.
///
/// Intervals are folded onto a single 24-hour day at one-second resolution,
/// so service after midnight (`25:10`) lands at `01:10` and an interval
/// crossing midnight is split in two. Only interval endpoints are stored.
///
/// Recording never removes occupancy: every site's peak is non-decreasing
/// as more blocks are processed.
///
/// # Examples
///
/// ```
/// use ebus_blocks::sim::demand::ChargerDemandLedger;
///
/// let mut ledger = ChargerDemandLedger::new(["4405"]);
/// ledger.record_charging("4405", 100.0, 10.0, "B1").unwrap();
/// ledger.record_charging("4405", 105.0, 10.0, "B2").unwrap();
/// assert_eq!(ledger.peak_demand("4405").unwrap(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChargerDemandLedger {
    sites: IndexMap<String, SiteTimeline>,
}

impl ChargerDemandLedger {
    /// Creates a ledger with every candidate site pre-registered.
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::default();
        for site in sites {
            ledger.register_site(site);
        }
        ledger
    }

    /// Registers a site; re-registering keeps its recorded demand.
    pub fn register_site(&mut self, site: impl Into<String>) {
        self.sites.entry(site.into()).or_default();
    }

    pub fn is_registered(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }

    /// Registered sites in registration order.
    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Marks `site` occupied by one more vehicle over `[start, start + duration)`.
    ///
    /// # Arguments
    ///
    /// * `site` - Registered charger site
    /// * `start_minute` - Service-day minute the vehicle plugs in (may exceed 1440)
    /// * `duration_minutes` - Time on the charger
    /// * `block_id` - Block the vehicle is operating
    ///
    /// # Errors
    ///
    /// [`SimError::UnregisteredSite`] if `site` was never registered.
    pub fn record_charging(
        &mut self,
        site: &str,
        start_minute: f64,
        duration_minutes: f64,
        block_id: &str,
    ) -> Result<(), SimError> {
        let timeline = self
            .sites
            .get_mut(site)
            .ok_or_else(|| SimError::UnregisteredSite(site.to_string()))?;

        timeline.events += 1;
        if timeline.blocks.insert(block_id.to_string()) {
            log::debug!("block {block_id} first charges at site {site}");
        }

        // shorter than half a second leaves occupancy untouched
        let duration_s = (duration_minutes * 60.0).round() as i64;
        if duration_s <= 0 {
            return Ok(());
        }

        if duration_s >= SECONDS_PER_DAY {
            timeline.add_interval(0, SECONDS_PER_DAY);
        } else {
            let start_s = ((start_minute * 60.0).round() as i64).rem_euclid(SECONDS_PER_DAY);
            let end_s = start_s + duration_s;
            if end_s <= SECONDS_PER_DAY {
                timeline.add_interval(start_s, end_s);
            } else {
                timeline.add_interval(start_s, SECONDS_PER_DAY);
                timeline.add_interval(0, end_s - SECONDS_PER_DAY);
            }
        }
        Ok(())
    }

    /// Maximum simultaneous occupancy ever recorded: chargers required at `site`.
    pub fn peak_demand(&self, site: &str) -> Result<u32, SimError> {
        Ok(self.timeline_for(site)?.peak())
    }

    /// Distinct blocks that have charged at `site`.
    pub fn block_count(&self, site: &str) -> Result<usize, SimError> {
        Ok(self.timeline_for(site)?.blocks.len())
    }

    /// Charging events recorded at `site`.
    pub fn event_count(&self, site: &str) -> Result<usize, SimError> {
        Ok(self.timeline_for(site)?.events)
    }

    /// Vehicles charging at `site` at the given minute of day.
    pub fn occupancy_at(&self, site: &str, minute_of_day: f64) -> Result<u32, SimError> {
        let at = ((minute_of_day * 60.0).round() as i64).rem_euclid(SECONDS_PER_DAY);
        let level = self
            .timeline_for(site)?
            .levels()
            .take_while(|&(t, _)| t <= at)
            .last()
            .map_or(0, |(_, level)| level);
        Ok(level.max(0) as u32)
    }

    /// Step points of the occupancy curve at `site`; empty if nothing was recorded.
    pub fn timeline(&self, site: &str) -> Result<Vec<OccupancyStep>, SimError> {
        Ok(self
            .timeline_for(site)?
            .levels()
            .map(|(at, level)| OccupancyStep {
                minute_of_day: at as f64 / 60.0,
                vehicles: level.max(0) as u32,
            })
            .collect())
    }

    fn timeline_for(&self, site: &str) -> Result<&SiteTimeline, SimError> {
        self.sites
            .get(site)
            .ok_or_else(|| SimError::UnregisteredSite(site.to_string()))
    }
}
