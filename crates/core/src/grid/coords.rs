//! Geographic ↔ grid coordinate mapping
//!
//! Row 0 is the north edge of the map (image convention), so latitude is
//! inverted when mapping. Out-of-range coordinates clamp to the nearest edge
//! cell: roads routinely run along or past the bounding box.

use crate::core_types::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};

/// Integer cell position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
}

impl GridCell {
    #[inline]
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Maps coordinates inside a bounding box onto an `N × N` grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    bounds: BoundingBox,
    size: usize,
}

impl GridMapper {
    /// # Panics
    ///
    /// Panics if `size` is zero
    #[must_use]
    pub fn new(bounds: BoundingBox, size: usize) -> Self {
        assert!(size > 0, "GridMapper::new: grid size must be positive");
        Self { bounds, size }
    }

    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Largest valid index, as a float for the interpolation math
    #[inline]
    fn last_index(&self) -> f64 {
        (self.size - 1) as f64
    }

    /// Map a geographic coordinate to its cell, clamped to the grid
    #[must_use]
    pub fn to_cell(&self, point: &GeoPoint) -> GridCell {
        let fx = (point.x - self.bounds.min_x()) / self.bounds.width();
        let fy = 1.0 - (point.y - self.bounds.min_y()) / self.bounds.height();
        GridCell {
            col: self.clamp_index(fx * self.last_index()),
            row: self.clamp_index(fy * self.last_index()),
        }
    }

    /// Approximate geographic position of a cell (inverse of [`Self::to_cell`])
    #[must_use]
    pub fn to_geo(&self, cell: GridCell) -> GeoPoint {
        let span = self.last_index().max(1.0);
        let lon = self.bounds.min_x() + (cell.col as f64 / span) * self.bounds.width();
        let lat = self.bounds.max_y() - (cell.row as f64 / span) * self.bounds.height();
        GeoPoint::new(lon, lat)
    }

    fn clamp_index(&self, value: f64) -> usize {
        // NaN only appears for non-finite input coordinates; park those at 0
        let rounded = value.round();
        if rounded.is_nan() || rounded <= 0.0 {
            0
        } else {
            (rounded as usize).min(self.size - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo;

    fn unit_mapper(size: usize) -> GridMapper {
        GridMapper::new(BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap(), size)
    }

    #[test]
    fn test_corners_map_to_grid_corners() {
        let m = unit_mapper(10);
        // North-west corner is row 0, col 0
        assert_eq!(m.to_cell(&geo(0.0, 1.0)), GridCell::new(0, 0));
        // South-east corner is the last row and column
        assert_eq!(m.to_cell(&geo(1.0, 0.0)), GridCell::new(9, 9));
        assert_eq!(m.to_cell(&geo(0.0, 0.0)), GridCell::new(0, 9));
    }

    #[test]
    fn test_rounds_to_nearest_cell() {
        let m = unit_mapper(11);
        // 0.46 * 10 = 4.6 -> 5
        assert_eq!(m.to_cell(&geo(0.46, 1.0)).col, 5);
        // 0.44 * 10 = 4.4 -> 4
        assert_eq!(m.to_cell(&geo(0.44, 1.0)).col, 4);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let m = unit_mapper(10);
        let cells = [
            m.to_cell(&geo(-5.0, 7.0)),
            m.to_cell(&geo(5.0, -7.0)),
            m.to_cell(&geo(f64::NAN, 0.5)),
        ];
        for c in cells {
            assert!(c.col < 10 && c.row < 10);
        }
        assert_eq!(cells[0], GridCell::new(0, 0));
        assert_eq!(cells[1], GridCell::new(9, 9));
    }

    #[test]
    fn test_output_always_within_grid() {
        let m = GridMapper::new(BoundingBox::new(16.88, 16.96, 52.40, 52.43).unwrap(), 37);
        for i in -20..=120 {
            for j in -20..=120 {
                let p = geo(16.80 + f64::from(i) * 0.0015, 52.35 + f64::from(j) * 0.0009);
                let c = m.to_cell(&p);
                assert!(c.col < 37 && c.row < 37, "{p:?} -> {c:?}");
            }
        }
    }

    #[test]
    fn test_to_geo_inverts_to_cell() {
        let m = unit_mapper(21);
        for row in 0..21 {
            for col in 0..21 {
                let cell = GridCell::new(col, row);
                assert_eq!(m.to_cell(&m.to_geo(cell)), cell);
            }
        }
    }
}
