//! Road and traffic data providers
//!
//! The simulation never talks to a mapping service or traffic API directly.
//! It asks a [`RoadNetworkSource`] for the road geometry of an area and a
//! [`TrafficSource`] for hourly congestion at sensor points; which concrete
//! provider answers is decided by whoever wires the run together.
//!
//! - `memory`: fixed in-memory data (tests, embedding)
//! - `file`: JSON road records and semicolon CSV traffic tables on disk
//! - `synthetic`: a seeded, reproducible street grid with sensors

mod file;
mod memory;
mod synthetic;

pub use file::{CsvTrafficFile, JsonRoadFile};
pub use memory::{InMemoryRoads, InMemoryTraffic};
pub use synthetic::SyntheticCity;

use crate::error::SourceError;
use crate::roads::RoadNetwork;
use crate::traffic::TrafficPoint;

/// Provides road geometry for a named area
pub trait RoadNetworkSource: Send + Sync {
    /// Fetch every drivable road segment of `place`
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the data cannot be read or is malformed.
    fn fetch_roads(&self, place: &str) -> Result<RoadNetwork, SourceError>;
}

/// Provides typical hourly congestion at a set of sensor points
pub trait TrafficSource: Send + Sync {
    /// Fetch every sensor with its 24-hour congestion profile
    ///
    /// An empty list is a valid answer and puts attribution in neutral mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the data cannot be read or is malformed.
    fn fetch_hourly_congestion(&self) -> Result<Vec<TrafficPoint>, SourceError>;
}
