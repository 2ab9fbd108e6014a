//! Road rasterizer
//!
//! Burns road polylines into the static emission-base grid.
//!
//! # Algorithm
//!
//! For each segment with a non-zero emission weight, every consecutive vertex
//! pair is mapped to grid cells and joined with an integer line walk:
//!
//! ```text
//! n     = max(|Δcol|, |Δrow|) + 1
//! cell  = round(start + i/(n-1) × (end - start)),  i = 0..n
//! E[c]  = max(E[c], emission)
//! ```
//!
//! Sampling one point per cell along the major axis means no cell is skipped at
//! any slope. Overlapping roads keep the heaviest weight rather than summing:
//! a cell is "on a road of at least this class", not "on N roads".
//!
//! Segments are processed in parallel; each worker burns into its own partial
//! grid and the partials are reduced with elementwise max and a name-keyed
//! label merge, so the result is identical to a sequential pass.

use super::labels::{LabelCandidate, LabelSet};
use super::segment::RoadSegment;
use crate::config::SimulationConfig;
use crate::grid::{CellMask, Grid, GridCell, GridMapper};
use rayon::prelude::*;
use tracing::{debug, info};

/// Static products of rasterizing a road network
#[derive(Debug, Clone)]
pub struct RasterizedNetwork {
    /// Per-cell emission weight of the heaviest road crossing the cell
    pub emission_base: Grid,
    /// Every cell a road line passes through
    pub road_mask: CellMask,
    /// Longest qualifying segment per street name
    pub labels: LabelSet,
    /// Segments that contributed emission
    pub burned_segments: usize,
    /// Segments dropped for an unrecognized or zero-weight class
    pub skipped_segments: usize,
}

impl RasterizedNetwork {
    fn empty(size: usize) -> Self {
        Self {
            emission_base: Grid::square(size),
            road_mask: CellMask::new(size, size),
            labels: LabelSet::new(),
            burned_segments: 0,
            skipped_segments: 0,
        }
    }

    fn combine(mut self, other: Self) -> Self {
        for (mine, &theirs) in self
            .emission_base
            .data
            .iter_mut()
            .zip(&other.emission_base.data)
        {
            *mine = mine.max(theirs);
        }
        self.road_mask.union_with(&other.road_mask);
        self.labels.merge(other.labels);
        self.burned_segments += other.burned_segments;
        self.skipped_segments += other.skipped_segments;
        self
    }
}

/// Cells visited walking from `from` to `to`, both ends included
pub fn line_cells(from: GridCell, to: GridCell) -> impl Iterator<Item = GridCell> {
    let (c0, r0) = (from.col as f64, from.row as f64);
    let (dc, dr) = (to.col as f64 - c0, to.row as f64 - r0);
    let steps = from.col.abs_diff(to.col).max(from.row.abs_diff(to.row));

    (0..=steps).map(move |i| {
        let t = if steps == 0 {
            0.0
        } else {
            i as f64 / steps as f64
        };
        GridCell::new(
            (c0 + t * dc).round() as usize,
            (r0 + t * dr).round() as usize,
        )
    })
}

/// Turns road segments into the emission-base grid, road mask and labels
pub struct RoadRasterizer<'a> {
    config: &'a SimulationConfig,
    mapper: GridMapper,
}

impl<'a> RoadRasterizer<'a> {
    #[must_use]
    pub fn new(config: &'a SimulationConfig, mapper: GridMapper) -> Self {
        Self { config, mapper }
    }

    #[must_use]
    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Rasterize every segment
    #[must_use]
    pub fn rasterize(&self, segments: &[RoadSegment]) -> RasterizedNetwork {
        let size = self.mapper.size();

        let network = segments
            .par_iter()
            .fold(
                || RasterizedNetwork::empty(size),
                |mut acc, segment| {
                    self.burn_segment(&mut acc, segment);
                    acc
                },
            )
            .reduce(|| RasterizedNetwork::empty(size), RasterizedNetwork::combine);

        info!(
            "Rasterized {} of {} road segments onto {}x{} grid: {} road cells, {} street labels",
            network.burned_segments,
            segments.len(),
            size,
            size,
            network.road_mask.count(),
            network.labels.len()
        );
        debug!(
            "Skipped {} segments with unrecognized or zero-weight class",
            network.skipped_segments
        );

        network
    }

    fn burn_segment(&self, acc: &mut RasterizedNetwork, segment: &RoadSegment) {
        let emission = segment.emission_value(&self.config.emission, self.config.lane_factor);
        if emission <= 0.0 {
            acc.skipped_segments += 1;
            return;
        }
        acc.burned_segments += 1;

        for pair in segment.geometry.windows(2) {
            let from = self.mapper.to_cell(&pair[0]);
            let to = self.mapper.to_cell(&pair[1]);
            for cell in line_cells(from, to) {
                acc.emission_base.raise_to(cell.col, cell.row, emission);
                acc.road_mask.insert(cell);
            }
        }

        self.offer_label(&mut acc.labels, segment, emission);
    }

    fn offer_label(&self, labels: &mut LabelSet, segment: &RoadSegment, emission: f32) {
        let rules = &self.config.labels;
        let Some(name) = segment.name.as_deref().map(str::trim) else {
            return;
        };
        if name.is_empty() || segment.length <= rules.min_length || emission <= rules.min_emission
        {
            return;
        }
        let Some(centroid) = segment.centroid() else {
            return;
        };

        labels.offer(
            name,
            LabelCandidate {
                cell: self.mapper.to_cell(&centroid),
                angle_deg: 0.0,
                length: segment.length,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{geo, BoundingBox, Meters};
    use crate::roads::RoadClass;

    fn setup(size: usize) -> (SimulationConfig, GridMapper) {
        let config = SimulationConfig {
            grid_size: size,
            ..SimulationConfig::default()
        };
        let bounds = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        (config, GridMapper::new(bounds, size))
    }

    #[test]
    fn test_line_cells_covers_every_step() {
        let cells: Vec<_> = line_cells(GridCell::new(0, 0), GridCell::new(6, 2)).collect();
        assert_eq!(cells.len(), 7);
        assert_eq!(cells.first(), Some(&GridCell::new(0, 0)));
        assert_eq!(cells.last(), Some(&GridCell::new(6, 2)));
        // One cell per column along the major axis
        for (i, c) in cells.iter().enumerate() {
            assert_eq!(c.col, i);
        }
        // Consecutive cells are 8-connected
        for w in cells.windows(2) {
            assert!(w[0].row.abs_diff(w[1].row) <= 1);
        }
    }

    #[test]
    fn test_line_cells_steep_and_reversed() {
        let cells: Vec<_> = line_cells(GridCell::new(3, 9), GridCell::new(1, 0)).collect();
        assert_eq!(cells.len(), 10);
        for (i, c) in cells.iter().enumerate() {
            assert_eq!(c.row, 9 - i);
        }
        let single: Vec<_> = line_cells(GridCell::new(4, 4), GridCell::new(4, 4)).collect();
        assert_eq!(single, vec![GridCell::new(4, 4)]);
    }

    #[test]
    fn test_burns_horizontal_road() {
        let (config, mapper) = setup(10);
        // Latitude 4/9 maps to row 5 on a 10-cell grid
        let lat = 1.0 - 5.0 / 9.0;
        let road = RoadSegment::new(
            vec![geo(0.0, lat), geo(1.0, lat)],
            RoadClass::Primary,
            Meters::new(1000.0),
        )
        .with_lanes(2.0);

        let net = RoadRasterizer::new(&config, mapper).rasterize(&[road]);
        for col in 0..10 {
            assert!((net.emission_base.get(col, 5) - 28.8).abs() < 1e-5);
            assert!(net.road_mask.contains(GridCell::new(col, 5)));
        }
        assert_eq!(net.road_mask.count(), 10);
        assert_eq!(net.emission_base.get(3, 4), 0.0);
    }

    #[test]
    fn test_rasterizing_twice_is_max_not_sum() {
        let (config, mapper) = setup(8);
        let road = RoadSegment::new(
            vec![geo(0.1, 0.2), geo(0.9, 0.7)],
            RoadClass::Tertiary,
            Meters::new(300.0),
        );
        let once = RoadRasterizer::new(&config, mapper).rasterize(std::slice::from_ref(&road));
        let twice = RoadRasterizer::new(&config, mapper).rasterize(&[road.clone(), road]);
        assert_eq!(once.emission_base, twice.emission_base);
        assert_eq!(twice.emission_base.max_value(), 8.0);
    }

    #[test]
    fn test_overlap_keeps_heaviest_class() {
        let (config, mapper) = setup(5);
        let minor = RoadSegment::new(
            vec![geo(0.0, 0.5), geo(1.0, 0.5)],
            RoadClass::Residential,
            Meters::new(100.0),
        );
        let major = RoadSegment::new(
            vec![geo(0.5, 0.0), geo(0.5, 1.0)],
            RoadClass::Motorway,
            Meters::new(100.0),
        );
        let net = RoadRasterizer::new(&config, mapper).rasterize(&[minor, major]);
        assert_eq!(net.emission_base.get(2, 2), 25.0);
        assert_eq!(net.emission_base.get(0, 2), 4.0);
    }

    #[test]
    fn test_unrecognized_class_skipped() {
        let (config, mapper) = setup(5);
        let mut path = RoadSegment::new(
            vec![geo(0.0, 0.5), geo(1.0, 0.5)],
            RoadClass::Primary,
            Meters::new(100.0),
        );
        path.class = None;
        let net = RoadRasterizer::new(&config, mapper).rasterize(&[path]);
        assert_eq!(net.skipped_segments, 1);
        assert_eq!(net.road_mask.count(), 0);
        assert_eq!(net.emission_base.max_value(), 0.0);
    }

    #[test]
    fn test_label_overwrite_is_order_independent() {
        let (config, mapper) = setup(20);
        let long = RoadSegment::new(
            vec![geo(0.1, 0.1), geo(0.3, 0.1)],
            RoadClass::Secondary,
            Meters::new(60.0),
        )
        .with_name("Dąbrowskiego");
        let short = RoadSegment::new(
            vec![geo(0.7, 0.9), geo(0.9, 0.9)],
            RoadClass::Secondary,
            Meters::new(40.0),
        )
        .with_name("Dąbrowskiego");

        let rasterizer = RoadRasterizer::new(&config, mapper);
        for order in [[long.clone(), short.clone()], [short, long]] {
            let net = rasterizer.rasterize(&order);
            let label = net.labels.get("Dąbrowskiego").unwrap();
            assert_eq!(label.length, Meters::new(60.0));
            assert_eq!(label.angle_deg, 0.0);
            // Centroid (0.2, 0.1) → col round(0.2*19)=4, row round(0.9*19)=17
            assert_eq!(label.cell, GridCell::new(4, 17));
        }
    }

    #[test]
    fn test_label_qualification_rules() {
        let (config, mapper) = setup(10);
        let geometry = vec![geo(0.0, 0.5), geo(1.0, 0.5)];
        let segments = [
            // Too short
            RoadSegment::new(geometry.clone(), RoadClass::Primary, Meters::new(50.0))
                .with_name("Short"),
            // Emission not above the minimum
            RoadSegment::new(geometry.clone(), RoadClass::Service, Meters::new(500.0))
                .with_name("Service"),
            // Blank name
            RoadSegment::new(geometry.clone(), RoadClass::Primary, Meters::new(500.0))
                .with_name("   "),
            RoadSegment::new(geometry, RoadClass::LivingStreet, Meters::new(51.0))
                .with_name("Kept"),
        ];
        let net = RoadRasterizer::new(&config, mapper).rasterize(&segments);
        assert_eq!(net.labels.len(), 1);
        assert!(net.labels.get("Kept").is_some());
    }
}
