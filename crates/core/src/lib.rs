//! Urban Smog Simulation Core Library
//!
//! Simulates the spread of traffic-driven particulate pollution (PM10) over a
//! city on a regular 2D grid. Roads are rasterized into a static emission
//! map, sensor congestion profiles are attributed to road cells, and a
//! concentration field is stepped through a warm-up day and a recorded day
//! with emission, diffusion, wind advection and decay.
//!
//! ## Pipeline
//!
//! - [`source`]: road network and traffic sensor providers (files, in-memory,
//!   seeded synthetic city)
//! - [`grid`]: geographic → cell mapping and grid containers
//! - [`roads`]: road classes, rasterization and street labels
//! - [`traffic`]: sensor tables, nearest-sensor index, congestion grids
//! - [`solver`]: the per-step dispersion kernels
//! - [`simulation`]: scenario preparation, the step driver and frame summaries
//! - [`collector`]: scheduled polling of live flow data into sensor profiles

pub mod collector;
pub mod config;
pub mod core_types;
pub mod error;
pub mod grid;
pub mod roads;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod traffic;

pub use config::{LabelRules, SimulationConfig};
pub use core_types::{geo, BoundingBox, GeoPoint};
pub use error::{CollectorError, ConfigError, InputError, SmogError, SourceError};
pub use grid::{CellMask, Grid, GridCell, GridMapper};
pub use roads::{LabelCandidate, LabelSet, RasterizedNetwork, RoadClass, RoadNetwork, RoadRasterizer};
pub use simulation::{FrameSummary, Scenario, SimulationDriver, SimulationRun};
pub use solver::{create_dispersion_solver, DispersionSolver, WindParams};
pub use traffic::{CongestionAttributor, CongestionGrid, TrafficPoint};
