//! CSV readers for schedules and siting tables.
//!
//! Each table has a `read_*` function over any reader and a `load_*`
//! convenience taking a path. Columns are matched by header name; extra
//! columns are ignored and whitespace around fields is trimmed.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::SimError;
use crate::schedule::{Schedule, TripRow};
use crate::siting::{ChargeAccess, ChargeLookup, SiteRegistry, TravelTimeMatrix};

#[derive(Debug, Deserialize)]
struct LookupRow {
    trip: String,
    location: String,
    time: f64,
}

#[derive(Debug, Deserialize)]
struct SiteRow {
    site_id: String,
    #[serde(deserialize_with = "deserialize_flag")]
    has_charger: bool,
}

#[derive(Debug, Deserialize)]
struct TravelRow {
    from_site: String,
    to_site: String,
    minutes: f64,
}

/// Accepts `1`/`0`, `true`/`false`, and `yes`/`no`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected 1/0 or true/false, found \"{other}\""
        ))),
    }
}

fn rows<T, R>(reader: R) -> Result<Vec<T>, SimError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let rows = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<T>()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

fn open(path: &Path) -> Result<io::BufReader<File>, SimError> {
    let file = File::open(path).map_err(|e| {
        log::error!("failed to open {}: {e}", path.display());
        SimError::Io(e)
    })?;
    Ok(io::BufReader::new(file))
}

/// Reads flattened trips
/// (`block_id,trip_id,route_id,start_time,end_time,distance_miles,duration_minutes,origin_stop_id,destination_stop_id`).
///
/// # Errors
///
/// CSV, time-format, and schedule-consistency errors.
pub fn read_schedule(reader: impl Read) -> Result<Schedule, SimError> {
    let schedule = Schedule::from_rows(rows::<TripRow, _>(reader)?)?;
    log::info!(
        "loaded {} trips in {} blocks",
        schedule.trip_count(),
        schedule.block_count()
    );
    Ok(schedule)
}

pub fn load_schedule(path: &Path) -> Result<Schedule, SimError> {
    read_schedule(open(path)?)
}

/// Reads the trip → charger table (`trip,location,time`).
pub fn read_lookup(reader: impl Read) -> Result<ChargeLookup, SimError> {
    let mut lookup = ChargeLookup::default();
    for row in rows::<LookupRow, _>(reader)? {
        lookup.insert(row.trip, ChargeAccess::new(row.location, row.time));
    }
    Ok(lookup)
}

pub fn load_lookup(path: &Path) -> Result<ChargeLookup, SimError> {
    read_lookup(open(path)?)
}

/// Reads candidate sites (`site_id,has_charger`).
pub fn read_sites(reader: impl Read) -> Result<SiteRegistry, SimError> {
    let mut registry = SiteRegistry::new();
    for row in rows::<SiteRow, _>(reader)? {
        registry.register(row.site_id, row.has_charger);
    }
    Ok(registry)
}

pub fn load_sites(path: &Path) -> Result<SiteRegistry, SimError> {
    read_sites(open(path)?)
}

/// Reads directed site-to-site travel times (`from_site,to_site,minutes`).
pub fn read_travel_times(reader: impl Read) -> Result<TravelTimeMatrix, SimError> {
    let mut matrix = TravelTimeMatrix::new();
    for row in rows::<TravelRow, _>(reader)? {
        matrix.insert(row.from_site, row.to_site, row.minutes);
    }
    Ok(matrix)
}

pub fn load_travel_times(path: &Path) -> Result<TravelTimeMatrix, SimError> {
    read_travel_times(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_with_optional_duration() {
        let csv = "\
block_id,trip_id,route_id,start_time,end_time,distance_miles,duration_minutes,origin_stop_id,destination_stop_id
B1,T2,R5,07:10:00,07:40:00,9.5,,8308,4405
B1,T1,R5,06:20:00,06:55:00,9.1,33,4405,8308
";
        let schedule = read_schedule(csv.as_bytes()).unwrap();
        let block = schedule.block("B1").unwrap();
        assert_eq!(block.trips[0].trip_id, "T1");
        assert_eq!(block.trips[0].duration_minutes, 33.0);
        assert_eq!(block.trips[1].duration_minutes, 30.0);
    }

    #[test]
    fn malformed_time_is_reported() {
        let csv = "\
block_id,trip_id,route_id,start_time,end_time,distance_miles,duration_minutes,origin_stop_id,destination_stop_id
B1,T1,R5,7h10,07:40:00,9.5,,8308,4405
";
        assert!(matches!(read_schedule(csv.as_bytes()), Err(SimError::InvalidTime(t)) if t == "7h10"));
    }

    #[test]
    fn nan_distance_is_rejected_on_import() {
        let csv = "\
block_id,trip_id,route_id,start_time,end_time,distance_miles,duration_minutes,origin_stop_id,destination_stop_id
B1,T1,R5,06:20:00,06:55:00,9.1,,4405,8308
B1,T2,R5,07:10:00,07:40:00,NaN,,8308,4405
";
        let err = read_schedule(csv.as_bytes());
        assert!(
            matches!(err, Err(SimError::InvalidSchedule(ref m)) if m.contains("T2")),
            "NaN distance should not load: {err:?}"
        );
    }

    #[test]
    fn lookup_ignores_extra_columns() {
        let csv = "trip,location,time,note\nT1,4405,0,at charger\nT2, 16063 ,7.5,relay\n";
        let lookup = read_lookup(csv.as_bytes()).unwrap();
        assert_eq!(lookup.get("T2"), Some(&ChargeAccess::new("16063", 7.5)));
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn site_flags_accept_several_spellings() {
        let csv = "site_id,has_charger\n4405,1\n8308,false\n16063,Yes\n";
        let registry = read_sites(csv.as_bytes()).unwrap();
        assert_eq!(registry.get("4405").map(|s| s.has_charger), Some(true));
        assert_eq!(registry.get("8308").map(|s| s.has_charger), Some(false));
        assert_eq!(registry.get("16063").map(|s| s.has_charger), Some(true));
        assert!(read_sites("site_id,has_charger\n4405,maybe\n".as_bytes()).is_err());
    }

    #[test]
    fn travel_times_are_directed() {
        let csv = "from_site,to_site,minutes\n8308,4405,12\n";
        let matrix = read_travel_times(csv.as_bytes()).unwrap();
        assert_eq!(matrix.minutes("8308", "4405"), Some(12.0));
        assert_eq!(matrix.minutes("4405", "8308"), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_schedule(Path::new("does/not/exist.csv"));
        assert!(matches!(err, Err(SimError::Io(_))));
    }
}
