//! Nearest-sensor lookup
//!
//! Sensors are bulk-loaded into an R-tree keyed by `[lon, lat]`. Distances are
//! plain Euclidean in degrees; over a city-sized area the distortion between
//! longitude and latitude degrees does not change which sensor is closest
//! enough to matter.

use super::point::TrafficPoint;
use crate::core_types::GeoPoint;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type SensorEntry = GeomWithData<[f64; 2], usize>;

/// Spatial index over sensor positions
pub struct SensorIndex {
    tree: RTree<SensorEntry>,
}

impl SensorIndex {
    #[must_use]
    pub fn new(points: &[TrafficPoint]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.location.x.is_finite() && p.location.y.is_finite())
            .map(|(i, p)| SensorEntry::new([p.location.x, p.location.y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Index (into the slice the index was built from) of the closest sensor
    #[must_use]
    pub fn nearest(&self, at: &GeoPoint) -> Option<usize> {
        self.tree.nearest_neighbor(&[at.x, at.y]).map(|e| e.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo;

    #[test]
    fn test_nearest_sensor() {
        let points = vec![
            TrafficPoint::new(geo(16.90, 52.40), [0.0; 24]),
            TrafficPoint::new(geo(16.95, 52.45), [0.0; 24]),
            TrafficPoint::new(geo(16.80, 52.41), [0.0; 24]),
        ];
        let index = SensorIndex::new(&points);
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(&geo(16.94, 52.44)), Some(1));
        assert_eq!(index.nearest(&geo(16.81, 52.40)), Some(2));
        assert_eq!(index.nearest(&geo(16.89, 52.40)), Some(0));
    }

    #[test]
    fn test_empty_index() {
        let index = SensorIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(&geo(0.0, 0.0)), None);
    }
}
