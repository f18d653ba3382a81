//! Error taxonomy for the simulator.

use crate::config::ConfigError;

/// Errors surfaced by schedule loading, siting inputs, and the demand ledger.
///
/// Infeasible blocks are not errors: they are reported as
/// [`crate::sim::types::BlockStatus::Failed`]. Lookup misses are recovered by
/// the configured [`crate::sim::layover::LookupFallback`].
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("charger site `{0}` is not registered")]
    UnregisteredSite(String),
    #[error("invalid service time `{0}`, expected HH:MM:SS")]
    InvalidTime(String),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("failed reading CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
