//! CPU dispersion solver
//!
//! Runs the step stages from [`super::kernels`] over `Vec<f32>` fields with
//! Rayon row parallelism. The stencil stages ping-pong between the caller's
//! concentration grid and an internal scratch grid of the same size.

use super::kernels::{
    advect, decay_and_clamp_edges, diffuse, inject_emissions, permeability_mask, EmissionParams,
};
use super::r#trait::{DispersionSolver, StepInputs};
use crate::config::SimulationConfig;
use crate::core_types::{KilometersPerHour, Meters, Seconds};
use crate::grid::Grid;

/// Step constants taken from the configuration once
#[derive(Debug, Clone, Copy)]
pub struct DispersionParams {
    pub ratio_background: f32,
    pub ratio_traffic: f32,
    pub traffic_emission_scalar: f32,
    pub permeability_normalizer: f32,
    pub wind_reference: KilometersPerHour,
    pub wind_gate: f32,
    pub time_step: Seconds,
    pub cell_size: Meters,
}

impl DispersionParams {
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            ratio_background: config.ratio_background,
            ratio_traffic: config.ratio_traffic,
            traffic_emission_scalar: config.traffic_emission_scalar,
            permeability_normalizer: config.permeability_normalizer,
            wind_reference: config.wind_reference,
            wind_gate: config.wind_gate,
            time_step: config.time_step,
            cell_size: config.cell_size,
        }
    }
}

/// Rayon-parallel dispersion solver
pub struct CpuDispersionSolver {
    // Static: permeability derived from the emission base
    mask: Vec<f32>,
    // Back buffer for the stencil stages
    scratch: Grid,
    params: DispersionParams,
    width: usize,
    height: usize,
}

impl CpuDispersionSolver {
    /// # Arguments
    ///
    /// * `emission_base` - Static per-cell road emission weight
    /// * `params` - Step constants
    #[must_use]
    pub fn new(emission_base: &Grid, params: DispersionParams) -> Self {
        let (width, height) = (emission_base.width, emission_base.height);
        Self {
            mask: permeability_mask(emission_base.as_slice(), params.permeability_normalizer),
            scratch: Grid::new(width, height),
            params,
            width,
            height,
        }
    }

    /// Permeability in `[0, 1]` per cell
    #[must_use]
    pub fn mask(&self) -> &[f32] {
        &self.mask
    }

    fn swap_in_scratch(&mut self, concentration: &mut Grid) {
        std::mem::swap(&mut concentration.data, &mut self.scratch.data);
    }
}

impl DispersionSolver for CpuDispersionSolver {
    fn step(&mut self, concentration: &mut Grid, inputs: &StepInputs<'_>) {
        assert_eq!(
            (concentration.width, concentration.height),
            (self.width, self.height),
            "CpuDispersionSolver::step: concentration grid size mismatch"
        );
        assert_eq!(
            (inputs.congestion.width, inputs.congestion.height),
            (self.width, self.height),
            "CpuDispersionSolver::step: congestion grid size mismatch"
        );
        let (w, h) = (self.width, self.height);

        inject_emissions(
            concentration.as_mut_slice(),
            &self.mask,
            inputs.congestion.as_slice(),
            EmissionParams {
                background_level: inputs.background_level,
                ratio_background: self.params.ratio_background,
                traffic_volume: inputs.traffic_volume,
                traffic_emission_scalar: self.params.traffic_emission_scalar,
                ratio_traffic: self.params.ratio_traffic,
            },
        );

        if inputs.diffusion_rate > 0.0 {
            diffuse(
                concentration.as_slice(),
                self.scratch.as_mut_slice(),
                w,
                h,
                inputs.diffusion_rate,
            );
            self.swap_in_scratch(concentration);
        }

        if inputs.wind.is_active(self.params.wind_gate) {
            let factor = inputs.wind.blend_factor(
                self.params.wind_reference,
                self.params.time_step,
                self.params.cell_size,
            );
            advect(
                concentration.as_slice(),
                self.scratch.as_mut_slice(),
                w,
                h,
                (inputs.wind.dir_x, inputs.wind.dir_y),
                factor,
            );
            self.swap_in_scratch(concentration);
        }

        decay_and_clamp_edges(concentration.as_mut_slice(), w, h, inputs.decay_rate);
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn backend_name(&self) -> &'static str {
        "cpu-rayon"
    }
}
