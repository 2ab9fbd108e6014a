//! Time stepping over simulated days
//!
//! - `profiles`: hour-of-day lookup tables and day plans
//! - `scenario`: fetches data and builds the static grids once
//! - `driver`: steps the dispersion solver and records the final day
//! - `summary`: per-frame metadata for renderers

mod driver;
pub mod profiles;
mod scenario;
mod summary;

pub use driver::{RecordedFrame, SimulationDriver, SimulationRun, SimulationState, StepClock};
pub use profiles::{DayPlan, HourlyProfile, HOURS_PER_DAY};
pub use scenario::Scenario;
pub use summary::FrameSummary;
