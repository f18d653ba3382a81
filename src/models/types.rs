//! Enumerations shared by the energy and charging models.
//!
//! Every enum parses from the same spellings accepted in scenario TOML and
//! rejects anything else with a [`ConfigError`]; there is no silent default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Season selecting the energy-consumption coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
}

/// How per-trip consumption is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    /// Fitted regression on observed charge data.
    #[serde(alias = "reg")]
    Regression,
    /// Conservative distance-only bound.
    #[serde(alias = "wc")]
    WorstCase,
}

/// Vehicle class; oversized (articulated) buses draw more energy per trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Standard,
    Oversized,
}

/// Charger power class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerClass {
    /// 450 kW depot-style charger.
    #[serde(alias = "faster")]
    Fast,
    /// 150 kW charger.
    #[serde(alias = "slower")]
    Slow,
}

fn unrecognized(field: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError {
        field: field.to_string(),
        message: format!("unrecognized value \"{value}\", expected one of: {expected}"),
    }
}

impl FromStr for Season {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            _ => Err(unrecognized("season", s, "summer, winter")),
        }
    }
}

impl FromStr for EvalMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regression" | "reg" => Ok(EvalMode::Regression),
            "worst_case" | "wc" => Ok(EvalMode::WorstCase),
            _ => Err(unrecognized("eval_mode", s, "regression, worst_case")),
        }
    }
}

impl FromStr for VehicleClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(VehicleClass::Standard),
            "oversized" => Ok(VehicleClass::Oversized),
            _ => Err(unrecognized("vehicle_class", s, "standard, oversized")),
        }
    }
}

impl FromStr for ChargerClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" | "faster" => Ok(ChargerClass::Fast),
            "slow" | "slower" => Ok(ChargerClass::Slow),
            _ => Err(unrecognized("charger_class", s, "fast, slow")),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "summer"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalMode::Regression => write!(f, "regression"),
            EvalMode::WorstCase => write!(f, "worst_case"),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleClass::Standard => write!(f, "standard"),
            VehicleClass::Oversized => write!(f, "oversized"),
        }
    }
}

impl fmt::Display for ChargerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargerClass::Fast => write!(f, "fast"),
            ChargerClass::Slow => write!(f, "slow"),
        }
    }
}
