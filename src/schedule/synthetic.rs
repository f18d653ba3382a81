//! Seeded synthetic fleet for demos and end-to-end tests.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::schedule::Trip;
use crate::siting::{SiteRegistry, TravelTimeMatrix};

/// Terminal stops used by the generator, with whether each hosts a charger.
pub const TERMINALS: &[(&str, bool)] = &[
    ("4405", true),
    ("16063", true),
    ("8308", false),
    ("22873", false),
    ("10450", false),
    ("5127", false),
];

/// Random day of blocks shuttling between [`TERMINALS`].
///
/// Each block starts between 05:00 and 07:00 and runs a random number of
/// trips; every trip departs from the previous trip's destination after a
/// random layover. Identical seeds produce identical fleets.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    /// Minimum trips per block.
    pub trips_min: usize,
    /// Maximum trips per block.
    pub trips_max: usize,
    /// Minimum trip duration in minutes.
    pub duration_min: f64,
    /// Maximum trip duration in minutes.
    pub duration_max: f64,
    /// Maximum layover between trips in minutes.
    pub layover_max: f64,
    rng: StdRng,
}

impl SyntheticFleet {
    /// Creates a generator with typical urban-route ranges.
    pub fn new(seed: u64) -> Self {
        Self::with_ranges(8, 16, 20.0, 55.0, 25.0, seed)
    }

    /// Creates a generator with explicit ranges.
    ///
    /// # Panics
    ///
    /// Panics if a range is empty or a duration is not positive.
    pub fn with_ranges(
        trips_min: usize,
        trips_max: usize,
        duration_min: f64,
        duration_max: f64,
        layover_max: f64,
        seed: u64,
    ) -> Self {
        assert!(trips_min > 0);
        assert!(trips_max >= trips_min);
        assert!(duration_min > 0.0);
        assert!(duration_max >= duration_min);
        assert!(layover_max >= 0.0);

        Self {
            trips_min,
            trips_max,
            duration_min,
            duration_max,
            layover_max,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates `blocks` blocks of trips, ids `S001`, `S002`, ...
    pub fn trips(&mut self, blocks: usize) -> Vec<Trip> {
        let mut trips = Vec::new();
        for b in 0..blocks {
            let block_id = format!("S{:03}", b + 1);
            let count = self.rng.random_range(self.trips_min..=self.trips_max);
            let mut clock = self.rng.random_range(300.0..=420.0_f64).round();
            let mut stop = self.rng.random_range(0..TERMINALS.len());

            for t in 0..count {
                let duration = self
                    .rng
                    .random_range(self.duration_min..=self.duration_max)
                    .round();
                // 12 to 21 mph
                let miles_per_minute = self.rng.random_range(0.2..=0.35_f64);
                let next_stop = (stop + self.rng.random_range(1..TERMINALS.len())) % TERMINALS.len();

                trips.push(Trip {
                    trip_id: format!("{block_id}-{:02}", t + 1),
                    block_id: block_id.clone(),
                    route_id: format!("R{}", 10 + (stop + next_stop) % 7),
                    start_minutes: clock,
                    end_minutes: clock + duration,
                    distance_miles: (duration * miles_per_minute * 100.0).round() / 100.0,
                    duration_minutes: duration,
                    origin_stop_id: TERMINALS[stop].0.to_string(),
                    destination_stop_id: TERMINALS[next_stop].0.to_string(),
                });

                let layover = self.rng.random_range(0.0..=self.layover_max).round();
                clock += duration + layover;
                stop = next_stop;
            }
        }
        trips
    }

    /// Registry of every terminal.
    pub fn registry() -> SiteRegistry {
        let mut registry = SiteRegistry::new();
        for &(site, has_charger) in TERMINALS {
            registry.register(site, has_charger);
        }
        registry
    }

    /// Symmetric random travel times between terminals, 4 to 30 minutes.
    pub fn travel_times(&mut self) -> TravelTimeMatrix {
        let mut matrix = TravelTimeMatrix::new();
        for (i, &(from, _)) in TERMINALS.iter().enumerate() {
            for &(to, _) in &TERMINALS[i + 1..] {
                let minutes = self.rng.random_range(4.0..=30.0_f64).round();
                matrix.insert(from, to, minutes);
                matrix.insert(to, from, minutes);
            }
        }
        matrix
    }
}
