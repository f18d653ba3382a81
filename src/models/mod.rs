//! Pure battery models: energy drawn by a trip and charge regained at a layover.

/// Layover charging rates and clamped application.
pub mod charging;
/// Trip energy-consumption model.
pub mod energy;
pub mod types;

pub use charging::ChargingModel;
pub use energy::{EnergyCoefficients, EnergyModel};
pub use types::{ChargerClass, EvalMode, Season, VehicleClass};
