//! Boolean cell mask
//!
//! The rasterizer marks every cell a road line passes through; congestion
//! attribution and the road-congestion summary only look at those cells.

use super::coords::GridCell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl CellMask {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![false; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn insert(&mut self, cell: GridCell) {
        let idx = cell.row * self.width + cell.col;
        self.cells[idx] = true;
    }

    #[must_use]
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.col < self.width && cell.row < self.height && self.cells[cell.row * self.width + cell.col]
    }

    /// Mark every cell that is marked in `other`
    ///
    /// # Panics
    ///
    /// Panics if the masks have different dimensions
    pub fn union_with(&mut self, other: &CellMask) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "CellMask::union_with: dimension mismatch"
        );
        for (mine, &theirs) in self.cells.iter_mut().zip(&other.cells) {
            *mine |= theirs;
        }
    }

    /// Row-major flags, one per cell
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Number of marked cells
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Marked cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = GridCell> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &marked)| marked)
            .map(move |(idx, _)| GridCell::new(idx % width, idx / width))
    }
}
