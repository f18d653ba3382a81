//! Trip-to-charger mapping and its derivation from layover sites.

use std::collections::BTreeMap;

use crate::error::SimError;
use crate::schedule::Trip;
use crate::siting::registry::SiteRegistry;
use crate::siting::travel::TravelTimeMatrix;

/// Charger serving the layover ahead of a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeAccess {
    pub site: String,
    /// One-way travel time from the layover to the charger (minutes).
    pub travel_minutes: f64,
}

impl ChargeAccess {
    pub fn new(site: impl Into<String>, travel_minutes: f64) -> Self {
        Self {
            site: site.into(),
            travel_minutes,
        }
    }
}

/// Trip id → charger access, ordered by trip id.
#[derive(Debug, Clone, Default)]
pub struct ChargeLookup {
    entries: BTreeMap<String, ChargeAccess>,
}

impl ChargeLookup {
    pub fn insert(&mut self, trip_id: impl Into<String>, access: ChargeAccess) {
        self.entries.insert(trip_id.into(), access);
    }

    pub fn get(&self, trip_id: &str) -> Option<&ChargeAccess> {
        self.entries.get(trip_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChargeAccess)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct charger sites referenced by any entry, sorted.
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.entries.values().map(|a| a.site.as_str()).collect();
        sites.sort_unstable();
        sites.dedup();
        sites
    }

    /// Resolves every layover site to a charger and expands it per trip.
    ///
    /// A site with its own charger maps to itself at zero travel. Otherwise
    /// the nearest charger strictly within `max_relay_minutes` is used; with
    /// none in range the trip keeps its own site at `max_relay_minutes`, which
    /// in practice leaves too little dwell to charge.
    ///
    /// # Errors
    ///
    /// [`SimError::UnregisteredSite`] if a layover site is not in `registry`.
    pub fn resolve(
        layovers: &LayoverSites,
        registry: &SiteRegistry,
        travel: &TravelTimeMatrix,
        max_relay_minutes: f64,
    ) -> Result<Self, SimError> {
        let mut lookup = Self::default();
        for (site_id, trips) in layovers.iter() {
            let site = registry.require(site_id)?;
            let access = if site.has_charger {
                ChargeAccess::new(site_id, 0.0)
            } else {
                match registry.nearest_charger(site_id, travel, max_relay_minutes) {
                    Some((charger, minutes)) => ChargeAccess::new(charger, minutes),
                    None => {
                        log::warn!(
                            "no charger within {max_relay_minutes} min of site {site_id}, \
                             {} trips keep their own site",
                            trips.len()
                        );
                        ChargeAccess::new(site_id, max_relay_minutes)
                    }
                }
            };
            for trip_id in trips {
                lookup.insert(trip_id.clone(), access.clone());
            }
        }
        log::info!(
            "resolved {} layover sites to {} trip lookups",
            layovers.len(),
            lookup.len()
        );
        Ok(lookup)
    }
}

/// Layover site → ids of the trips that charge there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoverSites {
    sites: BTreeMap<String, Vec<String>>,
}

impl LayoverSites {
    /// Groups trips by the stop they depart from, which is where the
    /// vehicle laid over before them.
    pub fn from_origins<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Self {
        let mut sites = Self::default();
        for trip in trips {
            sites.add(trip.origin_stop_id.clone(), trip.trip_id.clone());
        }
        sites
    }

    pub fn add(&mut self, site_id: impl Into<String>, trip_id: impl Into<String>) {
        let trips = self.sites.entry(site_id.into()).or_default();
        let trip_id = trip_id.into();
        if !trips.contains(&trip_id) {
            trips.push(trip_id);
        }
    }

    pub fn trips(&self, site_id: &str) -> Option<&[String]> {
        self.sites.get(site_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sites.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Drops sites absent from `registry`, returning the ids removed.
    pub fn retain_registered(&mut self, registry: &SiteRegistry) -> Vec<String> {
        let dropped: Vec<String> = self
            .sites
            .keys()
            .filter(|s| !registry.contains(s))
            .cloned()
            .collect();
        for site in &dropped {
            self.sites.remove(site);
        }
        dropped
    }
}
