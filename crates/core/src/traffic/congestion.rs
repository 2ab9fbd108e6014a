//! Congestion attribution
//!
//! Every road cell takes the 24-hour profile of its nearest traffic sensor:
//!
//! ```text
//! Congestion[h][cell] = 1 + sensor.hourly[h] / 100     (road cells)
//! Congestion[h][cell] = 1                              (everything else)
//! ```
//!
//! The cell centre is back-projected to geographic coordinates with the same
//! mapper the rasterizer used, so attribution and rasterization agree on where
//! a cell is. Cells are independent, so the lookup runs in parallel and the
//! result does not depend on scheduling.

use super::index::SensorIndex;
use super::point::TrafficPoint;
use crate::grid::{CellMask, Grid, GridCell, GridMapper};
use crate::simulation::profiles::HOURS_PER_DAY;
use rayon::prelude::*;
use tracing::{info, warn};

/// Per-hour emission multipliers, one grid per hour of the day
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionGrid {
    hours: Vec<Grid>,
}

impl CongestionGrid {
    /// All multipliers 1.0
    #[must_use]
    pub fn neutral(size: usize) -> Self {
        Self {
            hours: vec![Grid::with_value(size, size, 1.0); HOURS_PER_DAY],
        }
    }

    /// Grid for `hour`, wrapping past midnight
    #[must_use]
    pub fn hour(&self, hour: usize) -> &Grid {
        &self.hours[hour % HOURS_PER_DAY]
    }

    /// Side length of each hourly grid
    #[must_use]
    pub fn size(&self) -> usize {
        self.hours[0].width
    }

    /// Average extra congestion over road cells at `hour`, in whole percent
    ///
    /// `(mean multiplier − 1) × 100`, truncated and floored at 0. Returns 0 if
    /// there are no road cells.
    #[must_use]
    pub fn mean_road_congestion_pct(&self, hour: usize, roads: &CellMask) -> u32 {
        let grid = self.hour(hour);
        let (sum, count) = roads
            .iter()
            .filter(|c| c.col < grid.width && c.row < grid.height)
            .fold((0.0_f64, 0_usize), |(sum, n), c| {
                (sum + f64::from(grid.get(c.col, c.row)), n + 1)
            });
        if count == 0 {
            return 0;
        }
        let pct = ((sum / count as f64 - 1.0) * 100.0).trunc();
        if pct > 0.0 {
            pct as u32
        } else {
            0
        }
    }
}

/// Assigns each road cell its nearest sensor's congestion profile
pub struct CongestionAttributor<'a> {
    mapper: &'a GridMapper,
    points: &'a [TrafficPoint],
    index: SensorIndex,
}

impl<'a> CongestionAttributor<'a> {
    #[must_use]
    pub fn new(mapper: &'a GridMapper, points: &'a [TrafficPoint]) -> Self {
        Self {
            mapper,
            points,
            index: SensorIndex::new(points),
        }
    }

    /// Build the 24 hourly multiplier grids for the cells in `roads`
    ///
    /// With no sensors every multiplier is 1.0; this is logged, not an error.
    #[must_use]
    pub fn attribute(&self, roads: &CellMask) -> CongestionGrid {
        let size = self.mapper.size();
        let mut grid = CongestionGrid::neutral(size);

        if self.index.is_empty() {
            warn!(
                "No traffic sensors available; congestion multiplier is 1.0 on all {} road cells",
                roads.count()
            );
            return grid;
        }

        let cells: Vec<GridCell> = roads.iter().collect();
        let assignments: Vec<(GridCell, usize)> = cells
            .par_iter()
            .filter_map(|&cell| {
                let at = self.mapper.to_geo(cell);
                self.index.nearest(&at).map(|sensor| (cell, sensor))
            })
            .collect();

        for (hour, layer) in grid.hours.iter_mut().enumerate() {
            for &(cell, sensor) in &assignments {
                layer.set(cell.col, cell.row, self.points[sensor].multiplier(hour));
            }
        }

        info!(
            "Attributed congestion from {} sensors to {} road cells",
            self.index.len(),
            assignments.len()
        );
        grid
    }
}
