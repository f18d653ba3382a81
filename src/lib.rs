//! Electric-bus block energy-feasibility simulator and charger siting demand.

pub mod config;
pub mod error;
/// CSV import and export for schedules, siting tables, and results.
pub mod io;
pub mod models;
/// Trips, blocks, and service-day time handling.
pub mod schedule;
/// Block simulator, demand ledger, and fleet runner.
pub mod sim;
pub mod siting;
