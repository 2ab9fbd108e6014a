//! Static inputs of one simulation run
//!
//! Fetches roads and sensors from the injected sources, then derives
//! everything that stays fixed while the concentration field evolves: the
//! coordinate mapper, emission base, road mask, street labels and hourly
//! congestion grids.

use super::driver::{SimulationDriver, SimulationRun};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SmogError};
use crate::grid::GridMapper;
use crate::roads::{RasterizedNetwork, RoadNetwork, RoadRasterizer};
use crate::source::{RoadNetworkSource, TrafficSource};
use crate::traffic::{CongestionAttributor, CongestionGrid, TrafficPoint};
use tracing::info;

/// Precomputed, immutable inputs for the driver
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SimulationConfig,
    pub network: RoadNetwork,
    pub mapper: GridMapper,
    pub rasterized: RasterizedNetwork,
    pub sensors: Vec<TrafficPoint>,
    pub congestion: CongestionGrid,
}

impl Scenario {
    /// Validate the configuration, fetch data and build all static grids
    ///
    /// # Errors
    ///
    /// Returns [`SmogError::Config`] for an invalid configuration and
    /// [`SmogError::Source`] if either source fails.
    pub fn prepare(
        config: SimulationConfig,
        roads: &dyn RoadNetworkSource,
        traffic: &dyn TrafficSource,
    ) -> Result<Self, SmogError> {
        config.validate()?;
        info!(
            "Preparing scenario for `{}` on a {}x{} grid",
            config.place_name, config.grid_size, config.grid_size
        );

        let network = roads.fetch_roads(&config.place_name)?;
        let mapper = GridMapper::new(network.bounds, config.grid_size);
        let rasterized = RoadRasterizer::new(&config, mapper).rasterize(&network.segments);

        let sensors = traffic.fetch_hourly_congestion()?;
        let congestion = CongestionAttributor::new(&mapper, &sensors).attribute(&rasterized.road_mask);

        Ok(Self {
            config,
            network,
            mapper,
            rasterized,
            sensors,
            congestion,
        })
    }

    /// A driver over this scenario's grids
    ///
    /// # Errors
    ///
    /// See [`SimulationDriver::new`].
    pub fn driver(&self) -> Result<SimulationDriver<'_>, ConfigError> {
        SimulationDriver::new(
            &self.config,
            &self.rasterized.emission_base,
            &self.rasterized.road_mask,
            &self.congestion,
        )
    }

    /// Run the full schedule
    ///
    /// # Errors
    ///
    /// See [`SimulationDriver::new`].
    pub fn run(&self) -> Result<SimulationRun, ConfigError> {
        Ok(self.driver()?.run())
    }
}
