//! Dispersion solver module
//!
//! The step engine that advances the pollutant concentration field. The core
//! abstraction is the `DispersionSolver` trait; the CPU backend runs each
//! stage as a Rayon-parallel kernel over row chunks.
//!
//! # Example
//!
//! ```rust
//! use smog_sim_core::grid::Grid;
//! use smog_sim_core::solver::{create_dispersion_solver, StepInputs, WindParams};
//! use smog_sim_core::SimulationConfig;
//!
//! let config = SimulationConfig { grid_size: 16, ..SimulationConfig::default() };
//! let emission_base = Grid::with_value(16, 16, 25.0);
//! let congestion = Grid::with_value(16, 16, 1.0);
//! let mut solver = create_dispersion_solver(&config, &emission_base);
//!
//! let mut concentration = Grid::square(16);
//! solver.step(
//!     &mut concentration,
//!     &StepInputs {
//!         background_level: 30.0,
//!         diffusion_rate: config.diffusion_rate,
//!         decay_rate: config.decay_rate,
//!         wind: WindParams::new(0.2, 1, 0),
//!         congestion: &congestion,
//!         traffic_volume: 0.5,
//!     },
//! );
//! assert!(concentration.max_value() > 0.0);
//! ```

mod cpu;
pub mod kernels;
#[allow(clippy::module_name_repetitions)]
mod r#trait;
mod wind;

// Re-exports
pub use cpu::{CpuDispersionSolver, DispersionParams};
pub use r#trait::{DispersionSolver, StepInputs};
pub use wind::WindParams;

use crate::config::SimulationConfig;
use crate::grid::Grid;
use tracing::info;

/// Create the dispersion solver for a precomputed emission base
///
/// Only the CPU backend exists; the returned trait object keeps callers
/// independent of that.
///
/// # Arguments
///
/// * `config` - Validated simulation configuration
/// * `emission_base` - Static road emission grid from the rasterizer
///
/// # Returns
///
/// A boxed `DispersionSolver`
#[must_use]
pub fn create_dispersion_solver(
    config: &SimulationConfig,
    emission_base: &Grid,
) -> Box<dyn DispersionSolver> {
    let solver = CpuDispersionSolver::new(emission_base, DispersionParams::from_config(config));
    info!(
        "Using {} dispersion backend ({}x{} grid, {} threads)",
        solver.backend_name(),
        emission_base.width,
        emission_base.height,
        rayon::current_num_threads()
    );
    Box::new(solver)
}
