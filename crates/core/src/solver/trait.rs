//! Dispersion solver trait definition
//!
//! The driver owns the concentration field and hands it to a solver once per
//! step together with that step's inputs. Solvers keep whatever static or
//! scratch state they need (permeability mask, ping-pong buffer) internally.

use super::wind::WindParams;
use crate::grid::Grid;

/// Inputs that change from step to step
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    /// Background pollutant level for the current hour
    pub background_level: f32,
    /// Laplacian weight for this step
    pub diffusion_rate: f32,
    /// Fraction of pollutant lost this step
    pub decay_rate: f32,
    /// Wind for the current forecast bucket
    pub wind: WindParams,
    /// Congestion multipliers for the current hour
    pub congestion: &'a Grid,
    /// Share of peak traffic on the road this hour
    pub traffic_volume: f32,
}

/// Backend-agnostic interface for advancing the concentration field
pub trait DispersionSolver: Send + Sync {
    /// Advance `concentration` by one time step
    ///
    /// # Arguments
    ///
    /// * `concentration` - Field to update in place
    /// * `inputs` - Background, rates, wind, congestion and traffic volume
    ///
    /// # Panics
    ///
    /// Implementations panic if `concentration` or `inputs.congestion` do not
    /// match [`Self::dimensions`].
    fn step(&mut self, concentration: &mut Grid, inputs: &StepInputs<'_>);

    /// Grid dimensions as `(width, height)` in cells
    fn dimensions(&self) -> (usize, usize);

    /// Short name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}
