//! Simulation driver
//!
//! Iterates the dispersion solver across the configured days. Every step picks
//! its inputs from hour-of-day lookups:
//!
//! ```text
//! minutes_per_step = 1440 / steps_per_day
//! hour             = floor(((t × minutes_per_step) mod 1440) / 60) mod 24
//! background       = days[day].background[hour]
//! congestion       = CongestionGrid[hour]
//! wind             = days[day].wind[min(hour / bucket_hours, last)]
//! traffic_volume   = traffic_volume[hour]
//! ```
//!
//! All days except the last are warm-up: their state carries over but nothing
//! is recorded. Every step of the last day is snapshotted.

use super::summary::FrameSummary;
use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::grid::{CellMask, Grid};
use crate::solver::{create_dispersion_solver, DispersionSolver, StepInputs};
use crate::traffic::CongestionGrid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const MINUTES_PER_DAY: f64 = 1440.0;

/// Where a global step index falls in simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    /// Index into the configured days
    pub day: usize,
    /// Step index within that day
    pub step_in_day: usize,
    pub hour: usize,
    pub minute: usize,
}

/// Concentration field plus the number of steps already applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub concentration: Grid,
    pub step: usize,
}

impl SimulationState {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            concentration: Grid::square(size),
            step: 0,
        }
    }
}

/// One snapshot of the recorded day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub concentration: Grid,
    pub summary: FrameSummary,
}

/// Everything a completed run produces
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// One frame per step of the recorded day
    pub frames: Vec<RecordedFrame>,
    /// Highest concentration over all recorded frames
    pub max_concentration: f32,
    pub final_state: SimulationState,
}

/// Runs the dispersion solver over warm-up and recorded days
pub struct SimulationDriver<'a> {
    config: &'a SimulationConfig,
    solver: Box<dyn DispersionSolver>,
    road_mask: &'a CellMask,
    congestion: &'a CongestionGrid,
    state: SimulationState,
}

impl<'a> SimulationDriver<'a> {
    /// Build a driver with the default solver backend
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation configuration; validated here
    /// * `emission_base` - Static road emission grid
    /// * `road_mask` - Road cells, used for the congestion summary
    /// * `congestion` - Hourly congestion multipliers
    ///
    /// # Errors
    ///
    /// Returns any [`SimulationConfig::validate`] error, or
    /// [`ConfigError::GridMismatch`] if a precomputed grid does not match
    /// `config.grid_size`.
    pub fn new(
        config: &'a SimulationConfig,
        emission_base: &Grid,
        road_mask: &'a CellMask,
        congestion: &'a CongestionGrid,
    ) -> Result<Self, ConfigError> {
        check_size(
            "emission_base",
            config.grid_size,
            (emission_base.width, emission_base.height),
        )?;
        let solver = create_dispersion_solver(config, emission_base);
        Self::with_solver(config, solver, road_mask, congestion)
    }

    /// Build a driver around an already-constructed solver
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`], checked against the solver's dimensions.
    pub fn with_solver(
        config: &'a SimulationConfig,
        solver: Box<dyn DispersionSolver>,
        road_mask: &'a CellMask,
        congestion: &'a CongestionGrid,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        check_size("solver", config.grid_size, solver.dimensions())?;
        check_size(
            "road_mask",
            config.grid_size,
            (road_mask.width(), road_mask.height()),
        )?;
        check_size(
            "congestion",
            config.grid_size,
            (congestion.size(), congestion.size()),
        )?;

        info!(
            "Simulation driver ready: {} days x {} steps ({:.1} min/step), recording `{}`",
            config.days.len(),
            config.steps_per_day,
            config.minutes_per_step(),
            config.days[config.recorded_day()].name
        );

        Ok(Self {
            config,
            solver,
            road_mask,
            congestion,
            state: SimulationState::new(config.grid_size),
        })
    }

    #[must_use]
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Steps across all days
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.config.total_steps()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.step >= self.total_steps()
    }

    /// Simulated time at global step `step`
    #[must_use]
    pub fn clock(&self, step: usize) -> StepClock {
        let minutes = step as f64 * self.config.minutes_per_step();
        let of_day = minutes % MINUTES_PER_DAY;
        StepClock {
            day: step / self.config.steps_per_day,
            step_in_day: step % self.config.steps_per_day,
            hour: (of_day / 60.0).floor() as usize % 24,
            minute: (of_day % 60.0).floor() as usize,
        }
    }

    /// Apply one step; `None` once every configured day has run
    pub fn step(&mut self) -> Option<StepClock> {
        if self.is_finished() {
            return None;
        }
        let clock = self.clock(self.state.step);
        let day = &self.config.days[clock.day];

        let inputs = StepInputs {
            background_level: day.background.at(clock.hour),
            diffusion_rate: self.config.diffusion_rate,
            decay_rate: self.config.decay_rate,
            wind: day.wind_at(clock.hour, self.config.forecast_bucket_hours),
            congestion: self.congestion.hour(clock.hour),
            traffic_volume: self.config.traffic_volume.at(clock.hour),
        };
        self.solver.step(&mut self.state.concentration, &inputs);
        self.state.step += 1;

        Some(clock)
    }

    /// Metadata for the frame just produced at `clock`
    #[must_use]
    pub fn summarize(&self, clock: StepClock) -> FrameSummary {
        let wind = self.config.days[clock.day]
            .wind_at(clock.hour, self.config.forecast_bucket_hours);
        FrameSummary {
            step: clock.step_in_day,
            hour: clock.hour,
            minute: clock.minute,
            wind_label: wind.compass_label().to_string(),
            wind_kmh: *wind.speed_kmh(self.config.wind_reference),
            mean_road_congestion_pct: self
                .congestion
                .mean_road_congestion_pct(clock.hour, self.road_mask),
            max_concentration: self.state.concentration.max_value(),
        }
    }

    /// Run every remaining step, recording the last day
    #[must_use]
    pub fn run(mut self) -> SimulationRun {
        let recorded_day = self.config.recorded_day();
        let mut frames = Vec::with_capacity(self.config.steps_per_day);
        let mut max_concentration = 0.0_f32;
        let mut last_hour = None;

        while let Some(clock) = self.step() {
            if last_hour != Some((clock.day, clock.hour)) {
                last_hour = Some((clock.day, clock.hour));
                debug!(
                    "{} {:02}:00, max concentration {:.2}",
                    self.config.days[clock.day].name,
                    clock.hour,
                    self.state.concentration.max_value()
                );
            }

            if clock.day == recorded_day {
                let summary = self.summarize(clock);
                max_concentration = max_concentration.max(summary.max_concentration);
                frames.push(RecordedFrame {
                    concentration: self.state.concentration.clone(),
                    summary,
                });
            } else if clock.step_in_day + 1 == self.config.steps_per_day {
                info!(
                    "Warm-up day `{}` complete, max concentration {:.2}",
                    self.config.days[clock.day].name,
                    self.state.concentration.max_value()
                );
            }
        }

        info!(
            "Recorded {} frames of `{}`, max concentration {:.2}",
            frames.len(),
            self.config.days[recorded_day].name,
            max_concentration
        );

        SimulationRun {
            frames,
            max_concentration,
            final_state: self.state,
        }
    }
}

fn check_size(
    name: &'static str,
    expected: usize,
    (found_width, found_height): (usize, usize),
) -> Result<(), ConfigError> {
    if found_width == expected && found_height == expected {
        Ok(())
    } else {
        Err(ConfigError::GridMismatch {
            name,
            expected,
            found_width,
            found_height,
        })
    }
}
