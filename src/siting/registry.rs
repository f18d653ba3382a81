use indexmap::IndexMap;

use crate::error::SimError;
use crate::siting::travel::TravelTimeMatrix;

/// Candidate charger location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargerSite {
    pub site_id: String,
    /// `false` when buses laying over here must relay to another site to charge.
    pub has_charger: bool,
}

/// Every candidate site, in registration order.
///
/// All sites must be registered before simulation begins; lookups of an
/// unknown site are configuration errors.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: IndexMap<String, ChargerSite>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a site, replacing any earlier entry with the same id.
    pub fn register(&mut self, site_id: impl Into<String>, has_charger: bool) {
        let site_id = site_id.into();
        self.sites.insert(
            site_id.clone(),
            ChargerSite {
                site_id,
                has_charger,
            },
        );
    }

    pub fn get(&self, site_id: &str) -> Option<&ChargerSite> {
        self.sites.get(site_id)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    /// Looks up a site, failing if it was never registered.
    pub fn require(&self, site_id: &str) -> Result<&ChargerSite, SimError> {
        self.get(site_id)
            .ok_or_else(|| SimError::UnregisteredSite(site_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargerSite> {
        self.sites.values()
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Sites that host a charger.
    pub fn charger_sites(&self) -> impl Iterator<Item = &ChargerSite> {
        self.sites.values().filter(|s| s.has_charger)
    }

    /// Nearest charger reachable from `site_id` strictly within `max_relay_minutes`.
    ///
    /// Ties keep the earliest registered charger. Returns `None` when no
    /// charger is in range or the matrix has no entry for any charger.
    pub fn nearest_charger(
        &self,
        site_id: &str,
        travel: &TravelTimeMatrix,
        max_relay_minutes: f64,
    ) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for charger in self.charger_sites() {
            let Some(minutes) = travel.minutes(site_id, &charger.site_id) else {
                log::debug!(
                    "no travel time from {site_id} to charger {}, skipped",
                    charger.site_id
                );
                continue;
            };
            let limit = best.map_or(max_relay_minutes, |(_, m)| m);
            if minutes < limit {
                best = Some((charger.site_id.as_str(), minutes));
            }
        }
        best
    }
}
