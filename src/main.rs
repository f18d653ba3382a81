//! Block feasibility CLI: loads a scenario and inputs, runs the fleet, prints
//! the report, and optionally writes every output table.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use ebus_blocks::config::ScenarioConfig;
use ebus_blocks::error::SimError;
use ebus_blocks::io::export::{Outputs, export_outputs};
use ebus_blocks::io::import::{load_lookup, load_schedule, load_sites, load_travel_times};
use ebus_blocks::models::{ChargerClass, EvalMode, Season, VehicleClass};
use ebus_blocks::schedule::Schedule;
use ebus_blocks::schedule::synthetic::SyntheticFleet;
use ebus_blocks::sim::demand::ChargerDemandLedger;
use ebus_blocks::sim::fleet::FleetRunner;
use ebus_blocks::sim::layover::LookupFallback;
use ebus_blocks::siting::{ChargeLookup, LayoverSites, SiteRegistry, TravelTimeMatrix};

/// Electric-bus block energy feasibility and charger siting demand
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// scenario TOML file
    #[arg(long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// built-in preset (baseline, summer, winter_worst_case, summer_worst_case)
    #[arg(long)]
    preset: Option<String>,

    /// flattened trip schedule CSV
    #[arg(long, required_unless_present = "synthetic", conflicts_with = "synthetic")]
    schedule: Option<PathBuf>,

    /// generate this many synthetic blocks instead of reading a schedule
    #[arg(long)]
    synthetic: Option<usize>,

    /// seed for the synthetic fleet
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// trip to charger-site table (trip,location,time)
    #[arg(long)]
    lookup: Option<PathBuf>,

    /// candidate charger sites (site_id,has_charger)
    #[arg(long)]
    sites: Option<PathBuf>,

    /// site-to-site travel minutes (from_site,to_site,minutes); enables the refined second pass
    #[arg(long)]
    travel_times: Option<PathBuf>,

    #[arg(long)]
    season: Option<Season>,

    #[arg(long)]
    eval_mode: Option<EvalMode>,

    #[arg(long)]
    vehicle_class: Option<VehicleClass>,

    #[arg(long)]
    charger_class: Option<ChargerClass>,

    #[arg(long)]
    lookup_fallback: Option<LookupFallback>,

    /// directory for CSV outputs
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

/// Schedule and siting tables for one run.
struct Inputs {
    schedule: Schedule,
    lookup: ChargeLookup,
    registry: SiteRegistry,
    travel: Option<TravelTimeMatrix>,
}

fn load_scenario(cli: &Cli) -> Result<ScenarioConfig, SimError> {
    // --scenario takes priority, then --preset, then baseline
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    let sim = &mut scenario.simulation;
    if let Some(season) = cli.season {
        sim.season = season;
    }
    if let Some(mode) = cli.eval_mode {
        sim.eval_mode = mode;
    }
    if let Some(class) = cli.vehicle_class {
        sim.vehicle_class = class;
    }
    if let Some(fallback) = cli.lookup_fallback {
        sim.lookup_fallback = fallback;
    }
    if let Some(class) = cli.charger_class {
        scenario.charging.charger_class = class;
    }
    Ok(scenario)
}

fn load_inputs(cli: &Cli, scenario: &ScenarioConfig) -> Result<Inputs, SimError> {
    let max_relay = scenario.siting.max_relay_minutes;

    let (schedule, synthetic) = match (&cli.schedule, cli.synthetic) {
        (Some(path), _) => (load_schedule(path)?, None),
        (None, Some(blocks)) => {
            let mut fleet = SyntheticFleet::new(cli.seed);
            let schedule = Schedule::new(fleet.trips(blocks))?;
            log::info!(
                "generated {} synthetic trips in {} blocks (seed {})",
                schedule.trip_count(),
                schedule.block_count(),
                cli.seed
            );
            let travel = fleet.travel_times();
            (schedule, Some((SyntheticFleet::registry(), travel)))
        }
        (None, None) => {
            return Err(SimError::InvalidSchedule(
                "either --schedule or --synthetic is required".into(),
            ));
        }
    };

    let registry = match (&cli.sites, &synthetic) {
        (Some(path), _) => Some(load_sites(path)?),
        (None, Some((registry, _))) => Some(registry.clone()),
        (None, None) => None,
    };
    let travel = match (&cli.travel_times, &synthetic) {
        (Some(path), _) => Some(load_travel_times(path)?),
        (None, Some((_, travel))) => Some(travel.clone()),
        (None, None) => None,
    };

    let lookup = match (&cli.lookup, &registry, &travel) {
        (Some(path), _, _) => load_lookup(path)?,
        (None, Some(registry), Some(travel)) if synthetic.is_some() => {
            let mut layovers = LayoverSites::from_origins(schedule.trips());
            layovers.retain_registered(registry);
            ChargeLookup::resolve(&layovers, registry, travel, max_relay)?
        }
        _ => {
            log::warn!("no charger lookup given, no layover can charge under strict fallback");
            ChargeLookup::default()
        }
    };

    // Without a site table every site the lookup names is taken to host a charger.
    let registry = registry.unwrap_or_else(|| {
        let mut registry = SiteRegistry::new();
        for site in lookup.sites() {
            registry.register(site, true);
        }
        registry
    });

    Ok(Inputs {
        schedule,
        lookup,
        registry,
        travel,
    })
}

fn run(cli: &Cli, scenario: &ScenarioConfig) -> Result<(), SimError> {
    let inputs = load_inputs(cli, scenario)?;
    let runner = FleetRunner::from_scenario(scenario);

    let mut ledger = ChargerDemandLedger::new(inputs.registry.site_ids());
    let report = runner.run(&inputs.schedule, &inputs.lookup, &mut ledger)?;
    println!("{report}");

    let refined = match &inputs.travel {
        Some(travel) => {
            let refined = runner.refine(&inputs.schedule, &report, &inputs.registry, travel)?;
            println!("--- Refined Pass ---");
            println!("{}", refined.report);
            Some(refined)
        }
        None => None,
    };

    if let Some(ref dir) = cli.out_dir {
        let outputs = Outputs {
            schedule: &inputs.schedule,
            report: &report,
            ledger: &ledger,
            refined: refined.as_ref(),
            layover_flag_minutes: scenario.siting.layover_flag_minutes,
        };
        let written = export_outputs(dir, &outputs)?;
        eprintln!("{} output files written to {}", written.len(), dir.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let scenario = match load_scenario(&cli) {
        Ok(scenario) => scenario,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if let Err(e) = run(&cli, &scenario) {
        log::error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}
