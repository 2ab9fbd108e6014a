//! Wind forecast parameters and their conversion to a per-step advection blend
//!
//! Forecast wind is a normalized speed (`0..1`, scaled by a reference speed in
//! km/h) and a unit grid direction. Advection moves pollutant by at most one
//! cell per step; `blend_factor` says how much of that one-cell shift to apply:
//!
//! ```text
//! shift_cells = (speed × V_ref [m/s]) × Δt / cell_size
//! factor      = min(shift_cells, 1)
//! ```
//!
//! Wind strong enough to cross several cells per step still moves pollutant by
//! only one cell; transport is understated in that regime.

use crate::core_types::{KilometersPerHour, Meters, Seconds};
use serde::{Deserialize, Serialize};

/// Wind for one forecast bucket
///
/// `dir_x` points east (increasing column), `dir_y` points south (increasing
/// row, since row 0 is the north edge).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindParams {
    /// Normalized speed, 0..1
    pub speed: f32,
    pub dir_x: i8,
    pub dir_y: i8,
}

impl WindParams {
    pub const CALM: WindParams = WindParams {
        speed: 0.0,
        dir_x: 0,
        dir_y: 0,
    };

    #[must_use]
    pub const fn new(speed: f32, dir_x: i8, dir_y: i8) -> Self {
        Self {
            speed,
            dir_x,
            dir_y,
        }
    }

    /// Describe why the record is malformed, if it is
    pub(crate) fn problem(&self) -> Option<String> {
        if !self.speed.is_finite() || !(0.0..=1.0).contains(&self.speed) {
            return Some(format!("speed must be within [0, 1], got {}", self.speed));
        }
        if !(-1..=1).contains(&self.dir_x) || !(-1..=1).contains(&self.dir_y) {
            return Some(format!(
                "direction must be in {{-1, 0, 1}}, got ({}, {})",
                self.dir_x, self.dir_y
            ));
        }
        None
    }

    /// Advection only runs above the gate speed
    #[inline]
    #[must_use]
    pub fn is_active(&self, gate: f32) -> bool {
        self.speed > gate
    }

    /// Real wind speed for a given full-scale reference
    #[must_use]
    pub fn speed_kmh(&self, reference: KilometersPerHour) -> KilometersPerHour {
        reference * self.speed
    }

    /// Fraction of a one-cell shift applied this step, capped at 1
    #[must_use]
    pub fn blend_factor(
        &self,
        reference: KilometersPerHour,
        time_step: Seconds,
        cell_size: Meters,
    ) -> f32 {
        let travelled = self.speed_kmh(reference).to_mps() * time_step;
        let shift_cells = travelled / cell_size;
        shift_cells.min(1.0)
    }

    /// Compass name of the direction the wind blows towards
    #[must_use]
    pub fn compass_label(&self) -> &'static str {
        match (self.dir_x, self.dir_y) {
            (0, -1) => "N",
            (1, -1) => "NE",
            (1, 0) => "E",
            (1, 1) => "SE",
            (0, 1) => "S",
            (-1, 1) => "SW",
            (-1, 0) => "W",
            (-1, -1) => "NW",
            _ => "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: KilometersPerHour = KilometersPerHour::new(50.0);

    #[test]
    fn test_blend_factor_caps_at_one() {
        // 0.5 × 50 km/h = 6.94 m/s → 2083 m per 300 s step → 20.8 cells
        let wind = WindParams::new(0.5, 1, 0);
        let f = wind.blend_factor(REF, Seconds::new(300.0), Meters::new(100.0));
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_blend_factor_sub_cell() {
        // 0.01 × 50 km/h = 0.1389 m/s → 4.17 m per 30 s step → 0.0417 of a 100 m cell
        let wind = WindParams::new(0.01, 0, 1);
        let f = wind.blend_factor(REF, Seconds::new(30.0), Meters::new(100.0));
        assert!((f - 0.041_666).abs() < 1e-4, "{f}");
    }

    #[test]
    fn test_gate() {
        assert!(!WindParams::new(0.01, 1, 0).is_active(0.01));
        assert!(WindParams::new(0.011, 1, 0).is_active(0.01));
        assert!(!WindParams::CALM.is_active(0.01));
    }

    #[test]
    fn test_problem_detection() {
        assert!(WindParams::new(0.3, -1, 1).problem().is_none());
        assert!(WindParams::new(1.5, 0, 0).problem().is_some());
        assert!(WindParams::new(f32::NAN, 0, 0).problem().is_some());
        assert!(WindParams::new(0.3, 2, 0).problem().is_some());
    }

    #[test]
    fn test_compass_labels() {
        assert_eq!(WindParams::new(0.2, 0, -1).compass_label(), "N");
        assert_eq!(WindParams::new(0.2, 1, 1).compass_label(), "SE");
        assert_eq!(WindParams::new(0.2, -1, 0).compass_label(), "W");
        assert_eq!(WindParams::CALM.compass_label(), "?");
    }
}
