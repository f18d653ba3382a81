//! Charger sites, inter-site travel times, and the trip-to-charger lookup.

pub mod lookup;
pub mod registry;
pub mod travel;

pub use lookup::{ChargeAccess, ChargeLookup, LayoverSites};
pub use registry::{ChargerSite, SiteRegistry};
pub use travel::TravelTimeMatrix;
