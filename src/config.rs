//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::models::energy::EnergyCoefficients;
use crate::models::types::{ChargerClass, EvalMode, Season, VehicleClass};
use crate::sim::layover::LookupFallback;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery thresholds and run criteria.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Charger class and charge rates.
    #[serde(default)]
    pub charging: ChargingConfig,
    /// Energy-consumption coefficients.
    #[serde(default)]
    pub energy: EnergyConfig,
    /// Charger-site relay and reporting parameters.
    #[serde(default)]
    pub siting: SitingConfig,
}

/// Battery thresholds and run criteria.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Battery percentage at the start of every block; never exceeded.
    pub full_charge_pct: f64,
    /// A trip leaving the battery strictly below this fails the block.
    pub min_charge_threshold_pct: f64,
    /// Layovers must be strictly longer than this to charge (minutes).
    pub min_charge_minutes: f64,
    /// "Previous trip end" before the first trip of a block (minutes past midnight).
    pub initial_prev_end_minutes: f64,
    /// Season selecting energy coefficients.
    pub season: Season,
    /// Regression or worst-case consumption.
    pub eval_mode: EvalMode,
    /// Vehicle class operating every block.
    pub vehicle_class: VehicleClass,
    /// Behaviour when a trip has no entry in the charger lookup.
    pub lookup_fallback: LookupFallback,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            full_charge_pct: 90.0,
            min_charge_threshold_pct: 30.0,
            min_charge_minutes: 5.0,
            initial_prev_end_minutes: 27.0 * 60.0,
            season: Season::Winter,
            eval_mode: EvalMode::Regression,
            vehicle_class: VehicleClass::Standard,
            lookup_fallback: LookupFallback::Strict,
        }
    }
}

/// Charger class and charge rates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChargingConfig {
    /// Charger class installed at candidate sites.
    pub charger_class: ChargerClass,
    /// Seconds per battery percent on a fast charger.
    pub fast_seconds_per_pct: f64,
    /// Seconds per battery percent on a slow charger.
    pub slow_seconds_per_pct: f64,
}

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            charger_class: ChargerClass::Fast,
            fast_seconds_per_pct: 35.0,
            slow_seconds_per_pct: 130.0,
        }
    }
}

/// Energy-consumption coefficients per season and evaluation mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyConfig {
    /// Scale applied to oversized (articulated) vehicles.
    pub oversized_multiplier: f64,
    pub summer_regression: EnergyCoefficients,
    pub winter_regression: EnergyCoefficients,
    pub summer_worst_case: EnergyCoefficients,
    pub winter_worst_case: EnergyCoefficients,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            oversized_multiplier: 1.58,
            summer_regression: EnergyCoefficients::new(-0.42933544, 0.0, -1.91616128),
            winter_regression: EnergyCoefficients::new(-0.5902, 0.0, -1.7664),
            summer_worst_case: EnergyCoefficients::new(0.8156, 0.0, 0.0),
            winter_worst_case: EnergyCoefficients::new(0.92, 0.0, 0.0),
        }
    }
}

/// Charger-site relay and reporting parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitingConfig {
    /// Relay search radius; also the travel time assigned when no charger is in range.
    pub max_relay_minutes: f64,
    /// A gap longer than this marks the preceding trip's end stop as a layover.
    pub layover_flag_minutes: f64,
}

impl Default for SitingConfig {
    fn default() -> Self {
        Self {
            max_relay_minutes: 60.0,
            layover_flag_minutes: 5.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(thiserror::Error, Debug, Clone)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.full_charge_pct"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: winter, regression, standard buses, fast chargers.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            charging: ChargingConfig::default(),
            energy: EnergyConfig::default(),
            siting: SitingConfig::default(),
        }
    }

    /// Returns the summer preset using the summer regression.
    pub fn summer() -> Self {
        Self {
            simulation: SimulationConfig {
                season: Season::Summer,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the winter worst-case preset.
    pub fn winter_worst_case() -> Self {
        Self {
            simulation: SimulationConfig {
                eval_mode: EvalMode::WorstCase,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the summer worst-case preset.
    pub fn summer_worst_case() -> Self {
        Self {
            simulation: SimulationConfig {
                season: Season::Summer,
                eval_mode: EvalMode::WorstCase,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "baseline",
        "summer",
        "winter_worst_case",
        "summer_worst_case",
    ];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "summer" => Ok(Self::summer()),
            "winter_worst_case" => Ok(Self::winter_worst_case()),
            "summer_worst_case" => Ok(Self::summer_worst_case()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid, contains unknown
    /// fields, or names an unrecognized season, mode, or class.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !(s.full_charge_pct > 0.0 && s.full_charge_pct <= 100.0) {
            errors.push(ConfigError {
                field: "simulation.full_charge_pct".into(),
                message: "must be in (0, 100]".into(),
            });
        }
        if !(s.min_charge_threshold_pct >= 0.0) {
            errors.push(ConfigError {
                field: "simulation.min_charge_threshold_pct".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(s.min_charge_threshold_pct < s.full_charge_pct) {
            errors.push(ConfigError {
                field: "simulation.min_charge_threshold_pct".into(),
                message: "must be < simulation.full_charge_pct".into(),
            });
        }
        if !(s.min_charge_minutes >= 0.0 && s.min_charge_minutes.is_finite()) {
            errors.push(ConfigError {
                field: "simulation.min_charge_minutes".into(),
                message: "must be >= 0".into(),
            });
        }
        if !s.initial_prev_end_minutes.is_finite() {
            errors.push(ConfigError {
                field: "simulation.initial_prev_end_minutes".into(),
                message: "must be finite".into(),
            });
        }

        let c = &self.charging;
        if !(c.fast_seconds_per_pct > 0.0 && c.fast_seconds_per_pct.is_finite()) {
            errors.push(ConfigError {
                field: "charging.fast_seconds_per_pct".into(),
                message: "must be > 0".into(),
            });
        }
        if !(c.slow_seconds_per_pct > 0.0 && c.slow_seconds_per_pct.is_finite()) {
            errors.push(ConfigError {
                field: "charging.slow_seconds_per_pct".into(),
                message: "must be > 0".into(),
            });
        }

        if !(self.energy.oversized_multiplier > 0.0 && self.energy.oversized_multiplier.is_finite()) {
            errors.push(ConfigError {
                field: "energy.oversized_multiplier".into(),
                message: "must be > 0".into(),
            });
        }

        let e = &self.energy;
        for (field, coeffs) in [
            ("energy.summer_regression", &e.summer_regression),
            ("energy.winter_regression", &e.winter_regression),
            ("energy.summer_worst_case", &e.summer_worst_case),
            ("energy.winter_worst_case", &e.winter_worst_case),
        ] {
            let finite = [coeffs.distance_beta, coeffs.time_beta, coeffs.constant]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "coefficients must be finite".into(),
                });
            }
        }

        let st = &self.siting;
        if !(st.max_relay_minutes > 0.0 && st.max_relay_minutes.is_finite()) {
            errors.push(ConfigError {
                field: "siting.max_relay_minutes".into(),
                message: "must be > 0".into(),
            });
        }
        if !(st.layover_flag_minutes >= 0.0 && st.layover_flag_minutes.is_finite()) {
            errors.push(ConfigError {
                field: "siting.layover_flag_minutes".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }
}
