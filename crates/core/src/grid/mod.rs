//! Map grids and coordinate mapping
//!
//! - `field`: row-major scalar fields (`Grid`)
//! - `coords`: geographic coordinate → cell mapping
//! - `mask`: boolean per-cell flags (road cells)

pub mod coords;
pub mod field;
pub mod mask;

pub use coords::{GridCell, GridMapper};
pub use field::Grid;
pub use mask::CellMask;
