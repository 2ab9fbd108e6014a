//! Scalar field storage
//!
//! Every map-sized quantity in the model (emission base, concentration, one
//! hour of congestion) is a `Grid`: a flat `Vec<f32>` in row-major order.

use serde::{Deserialize, Serialize};

/// 2D scalar field in row-major order (`row * width + col`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Cell values in row-major order
    pub data: Vec<f32>,
    /// Grid width in cells (columns)
    pub width: usize,
    /// Grid height in cells (rows)
    pub height: usize,
}

impl Grid {
    /// Create a new field with given dimensions, initialized to zero
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_value(width, height, 0.0)
    }

    /// Create a square `size × size` field initialized to zero
    #[must_use]
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Create a new field with given dimensions, initialized to a value
    #[must_use]
    pub fn with_value(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Flat index of `(col, row)`
    #[inline]
    #[must_use]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> f32 {
        assert!(
            col < self.width && row < self.height,
            "Coordinates out of bounds"
        );
        self.data[self.index(col, row)]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        assert!(
            col < self.width && row < self.height,
            "Coordinates out of bounds"
        );
        let idx = self.index(col, row);
        self.data[idx] = value;
    }

    /// Raise a cell to at least `value` (keeps the larger of the two)
    pub fn raise_to(&mut self, col: usize, row: usize, value: f32) {
        let idx = self.index(col, row);
        if value > self.data[idx] {
            self.data[idx] = value;
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Sum over all cells (total "mass" of the field)
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| f64::from(v)).sum()
    }

    /// Largest cell value, `0.0` for an empty grid
    #[must_use]
    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(0.0_f32, f32::max)
    }

    /// Smallest cell value, `0.0` for an empty grid
    #[must_use]
    pub fn min_value(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Borrow one row
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.width..(row + 1) * self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 20);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 20);
        assert_eq!(grid.data.len(), 200);
        assert!(grid.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::square(10);
        grid.set(3, 4, 123.45);
        assert_eq!(grid.get(3, 4), 123.45);

        // Verify row-major indexing
        assert_eq!(grid.data[4 * 10 + 3], 123.45);
        assert_eq!(grid.row(4)[3], 123.45);
    }

    #[test]
    fn test_raise_to_keeps_maximum() {
        let mut grid = Grid::square(4);
        grid.raise_to(1, 1, 8.0);
        grid.raise_to(1, 1, 4.0);
        assert_eq!(grid.get(1, 1), 8.0);
        grid.raise_to(1, 1, 25.0);
        assert_eq!(grid.get(1, 1), 25.0);
    }

    #[test]
    fn test_sum_and_extrema() {
        let mut grid = Grid::with_value(3, 3, 1.0);
        grid.set(2, 2, 5.0);
        assert!((grid.sum() - 13.0).abs() < 1e-9);
        assert_eq!(grid.max_value(), 5.0);
        assert_eq!(grid.min_value(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_grid_bounds_check() {
        let grid = Grid::square(10);
        let _ = grid.get(10, 5);
    }
}
