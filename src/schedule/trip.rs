use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::schedule::time::{format_service_time, parse_service_time};

/// One scheduled revenue trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub trip_id: String,
    pub block_id: String,
    pub route_id: String,
    /// Minutes past service-day midnight; may exceed 1440.
    pub start_minutes: f64,
    /// Minutes past service-day midnight; may exceed 1440.
    pub end_minutes: f64,
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub origin_stop_id: String,
    pub destination_stop_id: String,
}

/// Flattened schedule row as it appears in CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    pub block_id: String,
    pub trip_id: String,
    pub route_id: String,
    pub start_time: String,
    pub end_time: String,
    pub distance_miles: f64,
    /// Empty when the duration should be derived from the clock times.
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    pub origin_stop_id: String,
    pub destination_stop_id: String,
}

impl TripRow {
    /// Parses clock times and fills in a missing duration.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidTime`] for malformed clock times and
    /// [`SimError::InvalidSchedule`] when the trip ends before it starts or
    /// carries a negative or non-finite distance or duration.
    pub fn into_trip(self) -> Result<Trip, SimError> {
        let start_minutes = parse_service_time(&self.start_time)?;
        let end_minutes = parse_service_time(&self.end_time)?;
        if end_minutes < start_minutes {
            return Err(SimError::InvalidSchedule(format!(
                "trip {} ends ({}) before it starts ({})",
                self.trip_id, self.end_time, self.start_time
            )));
        }
        let duration_minutes = self
            .duration_minutes
            .unwrap_or(end_minutes - start_minutes);
        let valid = |v: f64| v >= 0.0 && v.is_finite();
        if !valid(self.distance_miles) || !valid(duration_minutes) {
            return Err(SimError::InvalidSchedule(format!(
                "trip {} has a negative or non-finite distance or duration",
                self.trip_id
            )));
        }
        Ok(Trip {
            trip_id: self.trip_id,
            block_id: self.block_id,
            route_id: self.route_id,
            start_minutes,
            end_minutes,
            distance_miles: self.distance_miles,
            duration_minutes,
            origin_stop_id: self.origin_stop_id,
            destination_stop_id: self.destination_stop_id,
        })
    }
}

impl From<&Trip> for TripRow {
    fn from(trip: &Trip) -> Self {
        Self {
            block_id: trip.block_id.clone(),
            trip_id: trip.trip_id.clone(),
            route_id: trip.route_id.clone(),
            start_time: format_service_time(trip.start_minutes),
            end_time: format_service_time(trip.end_minutes),
            distance_miles: trip.distance_miles,
            duration_minutes: Some(trip.duration_minutes),
            origin_stop_id: trip.origin_stop_id.clone(),
            destination_stop_id: trip.destination_stop_id.clone(),
        }
    }
}
