//! CSV export of fleet results.
//!
//! Every table has a `write_*` function over any writer; [`export_outputs`]
//! writes the full set into a directory. Output is deterministic for
//! identical inputs.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::schedule::{Schedule, TripRow};
use crate::schedule::time::format_service_time;
use crate::sim::demand::ChargerDemandLedger;
use crate::sim::engine::ChargeNeed;
use crate::sim::fleet::RefinedRun;
use crate::sim::report::{FleetReport, LastLayover, SiteDemand};
use crate::sim::types::{BlockFailure, TripRecord};
use crate::siting::{ChargeLookup, LayoverSites};

/// Everything [`export_outputs`] writes.
#[derive(Debug, Clone, Copy)]
pub struct Outputs<'a> {
    pub schedule: &'a Schedule,
    pub report: &'a FleetReport,
    pub ledger: &'a ChargerDemandLedger,
    /// Second pass, when site and travel-time tables were available.
    pub refined: Option<&'a RefinedRun>,
    pub layover_flag_minutes: f64,
}

/// Writes every output table into `dir`, creating it if needed.
///
/// # Returns
///
/// The paths written, in write order.
///
/// # Errors
///
/// Returns an `io::Error` if the directory or any file cannot be written.
pub fn export_outputs(dir: &Path, outputs: &Outputs<'_>) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let report = outputs.report;
    let schedule = outputs.schedule;

    let mut written = vec![
        export_file(dir, "schedule.csv", |w| write_schedule(schedule, w))?,
        export_file(dir, "failed_blocks.csv", |w| {
            write_failed_blocks(&report.failures, w)
        })?,
        export_file(dir, "charge_needed.csv", |w| {
            write_charge_needed(&report.charge_needs, w)
        })?,
        export_file(dir, "site_demand.csv", |w| {
            write_site_demand(&report.site_demand, w)
        })?,
        export_file(dir, "site_occupancy.csv", |w| {
            write_site_occupancy(outputs.ledger, w)
        })?,
        export_file(dir, "trajectories.csv", |w| write_trajectories(report, w))?,
        export_file(dir, "last_layover_trips.csv", |w| {
            let trips = report.last_layover_trips(schedule, outputs.layover_flag_minutes);
            write_last_layover_trips(&trips, w)
        })?,
    ];

    match outputs.refined {
        Some(refined) => {
            written.push(export_file(dir, "layover_sites.csv", |w| {
                write_layover_sites(&refined.layover_sites, w)
            })?);
            written.push(export_file(dir, "charge_lookup_refined.csv", |w| {
                write_charge_lookup(&refined.lookup, w)
            })?);
        }
        None => {
            written.push(export_file(dir, "layover_sites.csv", |w| {
                write_layover_sites(&report.refined_layover_sites(schedule), w)
            })?);
        }
    }

    Ok(written)
}

fn export_file(
    dir: &Path,
    name: &str,
    write: impl FnOnce(io::BufWriter<File>) -> io::Result<()>,
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    write(io::BufWriter::new(file))?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

/// Writes the simulated trips in the schedule input layout.
pub fn write_schedule(schedule: &Schedule, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for block in schedule.blocks() {
        for trip in &block.trips {
            wtr.serialize(TripRow::from(*trip))?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `(trip_id, block_id)` for every infeasible block.
pub fn write_failed_blocks(failures: &[BlockFailure], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["trip_id", "block_id"])?;
    for f in failures {
        wtr.write_record([f.trip_id.as_str(), f.block_id.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the charge-seeking result of every infeasible block.
///
/// Charging trip ids are joined with `;`.
pub fn write_charge_needed(needs: &[ChargeNeed], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "block_id",
        "residual_pct",
        "unattributed_pct",
        "final_battery_pct",
        "first_shortfall_trip",
        "charge_trip_ids",
    ])?;
    for n in needs {
        wtr.write_record(&[
            n.block_id.clone(),
            format!("{:.4}", n.residual_pct),
            format!("{:.4}", n.unattributed_pct),
            format!("{:.4}", n.final_battery_pct),
            n.first_shortfall_trip.clone().unwrap_or_default(),
            n.charge_trip_ids.join(";"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per candidate site with its charger requirement.
pub fn write_site_demand(demand: &[SiteDemand], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "site_id",
        "peak_chargers",
        "blocks_served",
        "charge_events",
        "total_charge_pct",
    ])?;
    for s in demand {
        wtr.write_record(&[
            s.site.clone(),
            s.peak_chargers.to_string(),
            s.blocks_served.to_string(),
            s.charge_events.to_string(),
            format!("{:.4}", s.total_charge_pct),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes each site's occupancy step points.
pub fn write_site_occupancy(ledger: &ChargerDemandLedger, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["site_id", "minute_of_day", "time_of_day", "vehicles_charging"])?;
    for site in ledger.sites() {
        for step in ledger.timeline(site).map_err(io::Error::other)? {
            wtr.write_record(&[
                site.to_string(),
                format!("{:.2}", step.minute_of_day),
                format_service_time(step.minute_of_day),
                step.vehicles.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `(site_id, trip_id)` pairs of layover sites.
pub fn write_layover_sites(sites: &LayoverSites, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["site_id", "trip_id"])?;
    for (site, trips) in sites.iter() {
        for trip in trips {
            wtr.write_record([site, trip.as_str()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a trip → charger table in the lookup input layout (`trip,location,time`).
pub fn write_charge_lookup(lookup: &ChargeLookup, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["trip", "location", "time"])?;
    for (trip, access) in lookup.iter() {
        wtr.write_record(&[
            trip.to_string(),
            access.site.clone(),
            format!("{}", access.travel_minutes),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the last layover trip before each failure.
pub fn write_last_layover_trips(trips: &[LastLayover<'_>], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "block_id",
        "failed_trip_id",
        "trip_id",
        "route_id",
        "end_time",
        "end_stop_id",
    ])?;
    for l in trips {
        wtr.write_record(&[
            l.block_id.clone(),
            l.failed_trip_id.clone(),
            l.trip.trip_id.clone(),
            l.trip.route_id.clone(),
            format_service_time(l.trip.end_minutes),
            l.trip.destination_stop_id.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes per-trip battery records of both passes.
///
/// The `pass` column is `feasibility` for every block and `charge_seeking`
/// for the re-run of each infeasible block.
pub fn write_trajectories(report: &FleetReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "pass",
        "block_id",
        "trip_id",
        "start_time",
        "end_time",
        "gap_minutes",
        "charge_site",
        "charge_pct",
        "charge_committed",
        "consumed_pct",
        "battery_pct",
    ])?;
    let feasibility = report
        .runs
        .iter()
        .map(|r| ("feasibility", r.block_id.as_str(), &r.records));
    let seeking = report
        .charge_needs
        .iter()
        .map(|n| ("charge_seeking", n.block_id.as_str(), &n.records));
    for (pass, block_id, records) in feasibility.chain(seeking) {
        for r in records {
            write_trip_record(&mut wtr, pass, block_id, r)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn write_trip_record<W: Write>(
    wtr: &mut csv::Writer<W>,
    pass: &str,
    block_id: &str,
    r: &TripRecord,
) -> io::Result<()> {
    wtr.write_record(&[
        pass.to_string(),
        block_id.to_string(),
        r.trip_id.clone(),
        format_service_time(r.start_minutes),
        format_service_time(r.end_minutes),
        format!("{:.2}", r.gap_minutes),
        r.charge_site.clone().unwrap_or_default(),
        format!("{:.4}", r.charge_pct),
        r.charge_committed.to_string(),
        format!("{:.4}", r.consumed_pct),
        format!("{:.4}", r.battery_after_pct),
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::BlockStatus;
    use crate::sim::engine::BlockRun;
    use crate::siting::ChargeAccess;

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn record(trip: &str, battery: f64) -> TripRecord {
        TripRecord {
            trip_id: trip.into(),
            start_minutes: 360.0,
            end_minutes: 1500.5,
            gap_minutes: -1260.0,
            charge_site: None,
            charge_pct: 0.0,
            charge_committed: false,
            consumed_pct: 7.6684,
            battery_after_pct: battery,
        }
    }

    #[test]
    fn failed_blocks_header_and_rows() {
        let failures = vec![BlockFailure {
            trip_id: "T8".into(),
            block_id: "B1".into(),
        }];
        let mut buf = Vec::new();
        write_failed_blocks(&failures, &mut buf).ok();
        assert_eq!(lines(buf), vec!["trip_id,block_id", "T8,B1"]);
    }

    #[test]
    fn occupancy_lists_step_points_per_site() {
        let mut ledger = ChargerDemandLedger::new(["A", "B"]);
        ledger.record_charging("A", 100.0, 10.0, "B1").ok();
        ledger.record_charging("B", 1500.0, 5.0, "B2").ok();
        let mut buf = Vec::new();
        write_site_occupancy(&ledger, &mut buf).ok();
        assert_eq!(
            lines(buf),
            vec![
                "site_id,minute_of_day,time_of_day,vehicles_charging",
                "A,100.00,01:40:00,1",
                "A,110.00,01:50:00,0",
                "B,60.00,01:00:00,1",
                "B,65.00,01:05:00,0",
            ]
        );
    }

    #[test]
    fn charge_lookup_uses_input_layout() {
        let mut lookup = ChargeLookup::default();
        lookup.insert("T2", ChargeAccess::new("16063", 7.5));
        lookup.insert("T1", ChargeAccess::new("4405", 0.0));
        let mut buf = Vec::new();
        write_charge_lookup(&lookup, &mut buf).ok();
        assert_eq!(lines(buf), vec!["trip,location,time", "T1,4405,0", "T2,16063,7.5"]);
    }

    #[test]
    fn trajectories_cover_both_passes() {
        let report = FleetReport {
            runs: vec![BlockRun {
                block_id: "B1".into(),
                status: BlockStatus::Failed("T2".into()),
                records: vec![record("T1", 82.3), record("T2", 28.0)],
                trajectory: vec![90.0, 82.3],
                final_battery_pct: 82.3,
            }],
            failures: Vec::new(),
            charge_needs: Vec::new(),
            site_demand: Vec::new(),
        };
        let mut buf = Vec::new();
        write_trajectories(&report, &mut buf).ok();
        let out = lines(buf);
        assert_eq!(out.len(), 3);
        assert!(out[1].starts_with("feasibility,B1,T1,06:00:00,25:00:30,"));
    }

    #[test]
    fn deterministic_output() {
        let demand = vec![SiteDemand {
            site: "4405".into(),
            peak_chargers: 3,
            blocks_served: 7,
            charge_events: 12,
            total_charge_pct: 101.25,
        }];
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_site_demand(&demand, &mut buf1).ok();
        write_site_demand(&demand, &mut buf2).ok();
        assert_eq!(buf1, buf2);
        assert_eq!(lines(buf1)[1], "4405,3,7,12,101.2500");
    }
}
