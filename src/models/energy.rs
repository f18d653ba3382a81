use serde::{Deserialize, Serialize};

use crate::config::EnergyConfig;
use crate::models::types::{EvalMode, Season, VehicleClass};

/// Coefficients of the linear consumption form
/// `distance_beta * miles + time_beta * minutes + constant`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyCoefficients {
    /// Battery percentage per mile.
    pub distance_beta: f64,
    /// Battery percentage per minute of running time.
    pub time_beta: f64,
    /// Fixed percentage per trip.
    pub constant: f64,
}

impl EnergyCoefficients {
    pub const fn new(distance_beta: f64, time_beta: f64, constant: f64) -> Self {
        Self {
            distance_beta,
            time_beta,
            constant,
        }
    }

    /// Raw linear form; may be negative for some parameterizations.
    pub fn linear(&self, distance_miles: f64, duration_minutes: f64) -> f64 {
        self.distance_beta * distance_miles + self.time_beta * duration_minutes + self.constant
    }
}

/// Maps a trip's distance and duration to the battery percentage it consumes.
///
/// Coefficients are supplied per season and evaluation mode; this model does
/// not fit them. The model is pure, so a single instance is shared by every
/// block run.
///
/// # Examples
///
/// ```
/// use ebus_blocks::config::EnergyConfig;
/// use ebus_blocks::models::{EnergyModel, EvalMode, Season, VehicleClass};
///
/// let model = EnergyModel::new(&EnergyConfig::default());
/// let pct = model.energy_consumed(10.0, 20.0, Season::Winter, VehicleClass::Standard, EvalMode::Regression);
/// assert!((pct - 7.6684).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct EnergyModel {
    summer_regression: EnergyCoefficients,
    winter_regression: EnergyCoefficients,
    summer_worst_case: EnergyCoefficients,
    winter_worst_case: EnergyCoefficients,
    oversized_multiplier: f64,
}

impl EnergyModel {
    pub fn new(config: &EnergyConfig) -> Self {
        Self {
            summer_regression: config.summer_regression,
            winter_regression: config.winter_regression,
            summer_worst_case: config.summer_worst_case,
            winter_worst_case: config.winter_worst_case,
            oversized_multiplier: config.oversized_multiplier,
        }
    }

    /// Returns the coefficient set for a season and evaluation mode.
    pub fn coefficients(&self, season: Season, mode: EvalMode) -> &EnergyCoefficients {
        match (season, mode) {
            (Season::Summer, EvalMode::Regression) => &self.summer_regression,
            (Season::Winter, EvalMode::Regression) => &self.winter_regression,
            (Season::Summer, EvalMode::WorstCase) => &self.summer_worst_case,
            (Season::Winter, EvalMode::WorstCase) => &self.winter_worst_case,
        }
    }

    /// Battery percentage consumed by one trip.
    ///
    /// # Arguments
    ///
    /// * `distance_miles` - Revenue distance of the trip
    /// * `duration_minutes` - Scheduled running time of the trip
    /// * `season` - Season selecting the coefficient set
    /// * `vehicle_class` - Oversized vehicles are scaled by the configured multiplier
    /// * `mode` - Regression or worst-case coefficients
    ///
    /// # Returns
    ///
    /// The absolute value of the linear form (never negative), scaled for
    /// oversized vehicles.
    pub fn energy_consumed(
        &self,
        distance_miles: f64,
        duration_minutes: f64,
        season: Season,
        vehicle_class: VehicleClass,
        mode: EvalMode,
    ) -> f64 {
        let base = self
            .coefficients(season, mode)
            .linear(distance_miles, duration_minutes)
            .abs();
        match vehicle_class {
            VehicleClass::Standard => base,
            VehicleClass::Oversized => base * self.oversized_multiplier,
        }
    }
}
