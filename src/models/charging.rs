use crate::config::ChargingConfig;
use crate::models::types::ChargerClass;
use crate::sim::types::VehicleState;

/// Converts layover dwell time into battery percentage regained.
///
/// Rates are expressed as seconds of charging per battery percent, so a fast
/// (450 kW) charger with 35 s/% restores roughly 1.7 % per minute.
#[derive(Debug, Clone)]
pub struct ChargingModel {
    /// Seconds per percent on a fast charger.
    pub fast_seconds_per_pct: f64,
    /// Seconds per percent on a slow charger.
    pub slow_seconds_per_pct: f64,
}

impl ChargingModel {
    /// Creates a charging model from configured rates.
    ///
    /// # Panics
    ///
    /// Panics if either rate is not strictly positive.
    pub fn new(config: &ChargingConfig) -> Self {
        assert!(config.fast_seconds_per_pct > 0.0);
        assert!(config.slow_seconds_per_pct > 0.0);
        Self {
            fast_seconds_per_pct: config.fast_seconds_per_pct,
            slow_seconds_per_pct: config.slow_seconds_per_pct,
        }
    }

    /// Seconds needed to add one percent on the given charger class.
    pub fn seconds_per_pct(&self, class: ChargerClass) -> f64 {
        match class {
            ChargerClass::Fast => self.fast_seconds_per_pct,
            ChargerClass::Slow => self.slow_seconds_per_pct,
        }
    }

    /// Unclamped percentage regained over `dwell_minutes` of charging.
    pub fn charge_gained(&self, dwell_minutes: f64, class: ChargerClass) -> f64 {
        dwell_minutes.max(0.0) * 60.0 / self.seconds_per_pct(class)
    }

    /// Applies a charging session to a vehicle, capped at `full_charge_pct`.
    ///
    /// # Arguments
    ///
    /// * `state` - Vehicle being charged
    /// * `dwell_minutes` - Usable time plugged in
    /// * `class` - Charger class
    /// * `full_charge_pct` - Ceiling the battery may never exceed
    /// * `commit` - When `false` the state is left untouched and only the
    ///   hypothetical amount is returned
    ///
    /// # Returns
    ///
    /// The percentage actually added (or that would be added), always `>= 0`.
    pub fn apply_charge(
        &self,
        state: &mut VehicleState,
        dwell_minutes: f64,
        class: ChargerClass,
        full_charge_pct: f64,
        commit: bool,
    ) -> f64 {
        let headroom = (full_charge_pct - state.battery_pct).max(0.0);
        let added = self.charge_gained(dwell_minutes, class).min(headroom);
        if commit {
            state.battery_pct += added;
        }
        added
    }
}
