/// Per-site charger occupancy ledger.
pub mod demand;
pub mod engine;
/// Fleet runner and second-pass refinement.
pub mod fleet;
/// Layover charging opportunity evaluation.
pub mod layover;
pub mod report;
pub mod types;
