use super::{RoadNetworkSource, TrafficSource};
use crate::error::SourceError;
use crate::roads::RoadNetwork;
use crate::traffic::TrafficPoint;

/// The same road network for any place name
#[derive(Debug, Clone)]
pub struct InMemoryRoads(pub RoadNetwork);

impl RoadNetworkSource for InMemoryRoads {
    fn fetch_roads(&self, _place: &str) -> Result<RoadNetwork, SourceError> {
        Ok(self.0.clone())
    }
}

/// A fixed sensor list; `InMemoryTraffic::default()` has no sensors
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraffic(pub Vec<TrafficPoint>);

impl TrafficSource for InMemoryTraffic {
    fn fetch_hourly_congestion(&self) -> Result<Vec<TrafficPoint>, SourceError> {
        Ok(self.0.clone())
    }
}
