//! Trips grouped into blocks, indexed once before simulation.

pub mod synthetic;
pub mod time;
pub mod trip;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::SimError;

pub use trip::{Trip, TripRow};

/// All trips of a service day, grouped by block.
///
/// Blocks keep the order in which they first appear in the input; trips
/// within a block are ordered by start time (stable, so equal start times
/// keep input order).
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    trips: Vec<Trip>,
    blocks: IndexMap<String, Vec<usize>>,
    by_trip_id: HashMap<String, usize>,
}

impl Schedule {
    /// Builds the block index.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidSchedule`] if a trip id occurs twice.
    pub fn new(trips: Vec<Trip>) -> Result<Self, SimError> {
        let mut blocks: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut by_trip_id = HashMap::with_capacity(trips.len());
        for (idx, trip) in trips.iter().enumerate() {
            if by_trip_id.insert(trip.trip_id.clone(), idx).is_some() {
                return Err(SimError::InvalidSchedule(format!(
                    "duplicate trip id {}",
                    trip.trip_id
                )));
            }
            blocks.entry(trip.block_id.clone()).or_default().push(idx);
        }
        for indices in blocks.values_mut() {
            indices.sort_by(|&a, &b| trips[a].start_minutes.total_cmp(&trips[b].start_minutes));
        }
        Ok(Self {
            trips,
            blocks,
            by_trip_id,
        })
    }

    /// Parses and indexes flattened CSV rows.
    pub fn from_rows(rows: impl IntoIterator<Item = TripRow>) -> Result<Self, SimError> {
        let trips = rows
            .into_iter()
            .map(TripRow::into_trip)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(trips)
    }

    pub fn block(&self, block_id: &str) -> Option<Block<'_>> {
        let (id, indices) = self.blocks.get_key_value(block_id)?;
        Some(self.make_block(id, indices))
    }

    /// Blocks in first-appearance order.
    pub fn blocks(&self) -> impl Iterator<Item = Block<'_>> {
        self.blocks
            .iter()
            .map(move |(id, indices)| self.make_block(id, indices))
    }

    pub fn trip(&self, trip_id: &str) -> Option<&Trip> {
        self.by_trip_id.get(trip_id).map(|&i| &self.trips[i])
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    fn make_block<'a>(&'a self, id: &'a str, indices: &[usize]) -> Block<'a> {
        Block {
            id,
            trips: indices.iter().map(|&i| &self.trips[i]).collect(),
        }
    }
}

/// A vehicle's day of trips, borrowed from the [`Schedule`].
#[derive(Debug, Clone)]
pub struct Block<'a> {
    pub id: &'a str,
    pub trips: Vec<&'a Trip>,
}

impl<'a> Block<'a> {
    /// Builds a block directly from trips already in start order.
    pub fn from_trips(id: &'a str, trips: Vec<&'a Trip>) -> Self {
        Self { id, trips }
    }

    pub fn position(&self, trip_id: &str) -> Option<usize> {
        self.trips.iter().position(|t| t.trip_id == trip_id)
    }

    /// Last trip before `trip_id` that ends at a layover stop.
    ///
    /// The previous trip is returned when the gap after it exceeds
    /// `layover_flag_minutes`; otherwise the trip before that one. `None` if
    /// `trip_id` is the first trip, is not in this block, or the fallback
    /// index does not exist.
    pub fn last_layover_before(&self, trip_id: &str, layover_flag_minutes: f64) -> Option<&'a Trip> {
        let idx = self.position(trip_id)?;
        let prev = idx.checked_sub(1)?;
        let gap = self.trips[idx].start_minutes - self.trips[prev].end_minutes;
        if gap > layover_flag_minutes {
            Some(self.trips[prev])
        } else {
            prev.checked_sub(1).map(|i| self.trips[i])
        }
    }
}
