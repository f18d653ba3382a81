//! Decides whether a layover is a genuine charging opportunity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::siting::ChargeLookup;

/// What to do when a trip has no entry in the charger lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFallback {
    /// No known charger: no opportunity.
    #[default]
    Strict,
    /// Treat the whole gap as usable dwell at an unknown site.
    Permissive,
}

impl FromStr for LookupFallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(LookupFallback::Strict),
            "permissive" => Ok(LookupFallback::Permissive),
            _ => Err(ConfigError {
                field: "lookup_fallback".to_string(),
                message: format!("unrecognized value \"{s}\", expected one of: strict, permissive"),
            }),
        }
    }
}

impl fmt::Display for LookupFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFallback::Strict => write!(f, "strict"),
            LookupFallback::Permissive => write!(f, "permissive"),
        }
    }
}

/// A layover usable for charging ahead of a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeOpportunity {
    /// Charger site; `None` when granted by the permissive fallback.
    pub site: Option<String>,
    /// One-way travel time to the site (minutes).
    pub travel_minutes: f64,
    /// Gap minus the round trip to the charger (minutes).
    pub usable_minutes: f64,
}

/// Checks a layover against the trip-to-charger lookup.
///
/// A vehicle can only charge if it reaches the charger and returns before
/// its next trip, so the usable dwell is the gap less twice the one-way
/// travel time, and must strictly exceed `min_charge_minutes`.
#[derive(Debug, Clone)]
pub struct LayoverChargeEvaluator<'a> {
    lookup: &'a ChargeLookup,
    fallback: LookupFallback,
    min_charge_minutes: f64,
}

impl<'a> LayoverChargeEvaluator<'a> {
    pub fn new(lookup: &'a ChargeLookup, fallback: LookupFallback, min_charge_minutes: f64) -> Self {
        Self {
            lookup,
            fallback,
            min_charge_minutes,
        }
    }

    pub fn fallback(&self) -> LookupFallback {
        self.fallback
    }

    /// Evaluates the layover preceding `trip_id`.
    ///
    /// # Arguments
    ///
    /// * `gap_minutes` - Trip start minus previous trip end
    /// * `trip_id` - Trip the layover precedes
    ///
    /// # Returns
    ///
    /// `Some` only when the usable dwell is strictly greater than the
    /// minimum charge time.
    pub fn evaluate(&self, gap_minutes: f64, trip_id: &str) -> Option<ChargeOpportunity> {
        let opportunity = match self.lookup.get(trip_id) {
            Some(access) => ChargeOpportunity {
                site: Some(access.site.clone()),
                travel_minutes: access.travel_minutes,
                usable_minutes: gap_minutes - 2.0 * access.travel_minutes,
            },
            None => match self.fallback {
                LookupFallback::Strict => {
                    log::debug!("no charger lookup for trip {trip_id}, strict fallback");
                    return None;
                }
                LookupFallback::Permissive => {
                    log::debug!("no charger lookup for trip {trip_id}, using whole gap");
                    ChargeOpportunity {
                        site: None,
                        travel_minutes: 0.0,
                        usable_minutes: gap_minutes,
                    }
                }
            },
        };
        (opportunity.usable_minutes > self.min_charge_minutes).then_some(opportunity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::siting::ChargeAccess;

    fn lookup() -> ChargeLookup {
        let mut lookup = ChargeLookup::default();
        lookup.insert("T_AT_CHARGER", ChargeAccess::new("4405", 0.0));
        lookup.insert("T_RELAY", ChargeAccess::new("16063", 4.0));
        lookup
    }

    #[test]
    fn gap_equal_to_threshold_is_not_an_opportunity() {
        let l = lookup();
        let eval = LayoverChargeEvaluator::new(&l, LookupFallback::Strict, 5.0);
        assert!(eval.evaluate(5.0, "T_AT_CHARGER").is_none());
        let opp = eval.evaluate(6.0, "T_AT_CHARGER");
        assert_eq!(opp.as_ref().and_then(|o| o.site.as_deref()), Some("4405"));
        assert_eq!(opp.map(|o| o.usable_minutes), Some(6.0));
    }

    #[test]
    fn travel_time_is_subtracted_both_ways() {
        let l = lookup();
        let eval = LayoverChargeEvaluator::new(&l, LookupFallback::Strict, 5.0);
        // 13 - 2 * 4 = 5, not strictly greater
        assert!(eval.evaluate(13.0, "T_RELAY").is_none());
        let opp = eval.evaluate(20.0, "T_RELAY");
        assert_eq!(opp.as_ref().map(|o| o.usable_minutes), Some(12.0));
        assert_eq!(opp.map(|o| o.travel_minutes), Some(4.0));
    }

    #[test]
    fn strict_fallback_ignores_unknown_trips() {
        let l = lookup();
        let eval = LayoverChargeEvaluator::new(&l, LookupFallback::Strict, 5.0);
        assert!(eval.evaluate(120.0, "UNKNOWN").is_none());
    }

    #[test]
    fn permissive_fallback_uses_whole_gap() {
        let l = lookup();
        let eval = LayoverChargeEvaluator::new(&l, LookupFallback::Permissive, 5.0);
        let opp = eval.evaluate(30.0, "UNKNOWN");
        assert_eq!(
            opp,
            Some(ChargeOpportunity {
                site: None,
                travel_minutes: 0.0,
                usable_minutes: 30.0,
            })
        );
        assert!(eval.evaluate(5.0, "UNKNOWN").is_none());
    }

    #[test]
    fn fallback_parses_and_rejects() {
        assert_eq!(
            "Permissive".parse::<LookupFallback>().ok(),
            Some(LookupFallback::Permissive)
        );
        assert!("optimistic".parse::<LookupFallback>().is_err());
    }
}
