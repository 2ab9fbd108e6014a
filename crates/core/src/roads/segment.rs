//! Road segments and the network they form
//!
//! `RoadRecord` is the raw, provider-shaped input (OSM-style edge attributes,
//! where `highway`, `lanes` and `name` may each be a single value or a list).
//! `RoadSegment` is the normalized form the rasterizer consumes.

use super::class::{EmissionTable, RoadClass};
use crate::core_types::{BoundingBox, GeoPoint, Meters};
use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// A value that providers emit either bare or wrapped in a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// First value (the only one for `One`)
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(v) => Some(v),
            Self::Many(vs) => vs.first(),
        }
    }
}

/// Tag value that may arrive as a number or as text (`lanes: "2"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl TagValue {
    fn as_f32(&self) -> Option<f32> {
        let value = match self {
            Self::Number(n) => *n as f32,
            Self::Text(s) => s.trim().parse::<f32>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Raw road edge as delivered by a mapping provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadRecord {
    /// Polyline vertices as `[lon, lat]`
    pub geometry: Vec<[f64; 2]>,
    #[serde(default)]
    pub highway: Option<OneOrMany<String>>,
    #[serde(default)]
    pub lanes: Option<OneOrMany<TagValue>>,
    #[serde(default)]
    pub name: Option<OneOrMany<String>>,
    /// Segment length in meters
    pub length: f32,
}

/// Normalized road segment
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    /// Ordered polyline vertices
    pub geometry: Vec<GeoPoint>,
    /// `None` for tags the model does not recognize
    pub class: Option<RoadClass>,
    /// Lane count; absent means a single lane
    pub lanes: Option<f32>,
    pub name: Option<String>,
    pub length: Meters,
}

impl From<RoadRecord> for RoadSegment {
    fn from(record: RoadRecord) -> Self {
        let class = record
            .highway
            .as_ref()
            .and_then(OneOrMany::first)
            .and_then(|tag| RoadClass::from_tag(tag));
        let lanes = record
            .lanes
            .as_ref()
            .and_then(OneOrMany::first)
            .and_then(TagValue::as_f32);
        let name = record
            .name
            .as_ref()
            .and_then(OneOrMany::first)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Self {
            geometry: record
                .geometry
                .iter()
                .map(|&[lon, lat]| GeoPoint::new(lon, lat))
                .collect(),
            class,
            lanes,
            name,
            length: Meters::from(record.length.max(0.0)),
        }
    }
}

impl RoadSegment {
    /// Convenience constructor for a classed segment
    #[must_use]
    pub fn new(geometry: Vec<GeoPoint>, class: RoadClass, length: Meters) -> Self {
        Self {
            geometry,
            class: Some(class),
            lanes: None,
            name: None,
            length,
        }
    }

    #[must_use]
    pub fn with_lanes(mut self, lanes: f32) -> Self {
        self.lanes = Some(lanes);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Emission weight: `base × (1 + (max(1, lanes) − 1) × lane_factor)`
    ///
    /// Unrecognized classes weigh 0.
    #[must_use]
    pub fn emission_value(&self, table: &EmissionTable, lane_factor: f32) -> f32 {
        let Some(class) = self.class else {
            return 0.0;
        };
        let lanes = self.lanes.unwrap_or(1.0).max(1.0);
        table.weight(class) * (1.0 + (lanes - 1.0) * lane_factor)
    }

    /// Geometric centroid of the polyline (length-weighted segment midpoints)
    ///
    /// Falls back to the vertex mean for zero-length geometry; `None` when the
    /// segment has no vertices.
    #[must_use]
    pub fn centroid(&self) -> Option<GeoPoint> {
        let first = self.geometry.first()?;

        let mut weighted = nalgebra::Vector2::<f64>::zeros();
        let mut total = 0.0;
        for pair in self.geometry.windows(2) {
            let len = (pair[1] - pair[0]).norm();
            let mid = nalgebra::center(&pair[0], &pair[1]);
            weighted += mid.coords * len;
            total += len;
        }

        if total > 0.0 {
            return Some(GeoPoint::from(weighted / total));
        }

        let sum = self
            .geometry
            .iter()
            .fold(nalgebra::Vector2::<f64>::zeros(), |acc, p| acc + p.coords);
        let mean = sum / self.geometry.len() as f64;
        Some(if mean.iter().all(|v| v.is_finite()) {
            GeoPoint::from(mean)
        } else {
            *first
        })
    }
}

/// Road segments of one area together with its extent
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    pub segments: Vec<RoadSegment>,
    pub bounds: BoundingBox,
}

impl RoadNetwork {
    /// Bounds are derived from the union of all segment geometry
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyNetwork`] if no segment has vertices, or
    /// [`InputError::DegenerateBounds`] if the geometry has no area.
    pub fn from_segments(segments: Vec<RoadSegment>) -> Result<Self, InputError> {
        let bounds = BoundingBox::enclosing(segments.iter().flat_map(|s| s.geometry.iter()))?;
        Ok(Self { segments, bounds })
    }

    /// Use an explicit area instead of the geometry extent
    #[must_use]
    pub fn with_bounds(segments: Vec<RoadSegment>, bounds: BoundingBox) -> Self {
        Self { segments, bounds }
    }

    /// Normalize raw provider records
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_segments`].
    pub fn from_records(records: Vec<RoadRecord>) -> Result<Self, InputError> {
        Self::from_segments(records.into_iter().map(RoadSegment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::geo;

    #[test]
    fn test_emission_value_lane_multiplier() {
        let table = EmissionTable::default();
        let seg = RoadSegment::new(vec![], RoadClass::Primary, Meters::new(10.0));
        assert_eq!(seg.emission_value(&table, 0.6), 18.0);

        let two_lanes = seg.clone().with_lanes(2.0);
        assert!((two_lanes.emission_value(&table, 0.6) - 28.8).abs() < 1e-5);

        // Fewer than one lane counts as one
        let half = seg.with_lanes(0.5);
        assert_eq!(half.emission_value(&table, 0.6), 18.0);
    }

    #[test]
    fn test_unrecognized_class_weighs_zero() {
        let record = RoadRecord {
            geometry: vec![[0.0, 0.0], [1.0, 1.0]],
            highway: Some(OneOrMany::One("footway".into())),
            lanes: None,
            name: None,
            length: 100.0,
        };
        let seg = RoadSegment::from(record);
        assert_eq!(seg.class, None);
        assert_eq!(seg.emission_value(&EmissionTable::default(), 0.6), 0.0);
    }

    #[test]
    fn test_record_lists_use_first_value() {
        let json = r#"{
            "geometry": [[16.9, 52.4], [16.91, 52.41]],
            "highway": ["secondary", "tertiary"],
            "lanes": ["3", "2"],
            "name": ["Dąbrowskiego", "Inna"],
            "length": 120.5
        }"#;
        let record: RoadRecord = serde_json::from_str(json).unwrap();
        let seg = RoadSegment::from(record);
        assert_eq!(seg.class, Some(RoadClass::Secondary));
        assert_eq!(seg.lanes, Some(3.0));
        assert_eq!(seg.name.as_deref(), Some("Dąbrowskiego"));
        assert_eq!(seg.geometry.len(), 2);
    }

    #[test]
    fn test_record_scalar_values_and_missing_fields() {
        let json = r#"{"geometry": [[0, 0], [1, 0]], "highway": "primary", "lanes": 2, "length": 5}"#;
        let seg = RoadSegment::from(serde_json::from_str::<RoadRecord>(json).unwrap());
        assert_eq!(seg.class, Some(RoadClass::Primary));
        assert_eq!(seg.lanes, Some(2.0));
        assert_eq!(seg.name, None);

        let bad_lanes = r#"{"geometry": [], "highway": "primary", "lanes": "two", "length": 5}"#;
        let seg = RoadSegment::from(serde_json::from_str::<RoadRecord>(bad_lanes).unwrap());
        assert_eq!(seg.lanes, None);
    }

    #[test]
    fn test_centroid_is_length_weighted() {
        // Long leg along x (length 4), short leg up y (length 1)
        let seg = RoadSegment::new(
            vec![geo(0.0, 0.0), geo(4.0, 0.0), geo(4.0, 1.0)],
            RoadClass::Residential,
            Meters::new(5.0),
        );
        let c = seg.centroid().unwrap();
        // (2,0)*4 + (4,0.5)*1 over 5
        assert!((c.x - 2.4).abs() < 1e-12);
        assert!((c.y - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_degenerate_geometry() {
        let point = RoadSegment::new(vec![geo(3.0, 7.0)], RoadClass::Service, Meters::new(0.0));
        assert_eq!(point.centroid(), Some(geo(3.0, 7.0)));

        let empty = RoadSegment::new(vec![], RoadClass::Service, Meters::new(0.0));
        assert_eq!(empty.centroid(), None);
    }

    #[test]
    fn test_network_bounds_from_geometry() {
        let network = RoadNetwork::from_segments(vec![
            RoadSegment::new(vec![geo(0.0, 0.0), geo(2.0, 1.0)], RoadClass::Primary, Meters::new(1.0)),
            RoadSegment::new(vec![geo(-1.0, 3.0)], RoadClass::Primary, Meters::new(1.0)),
        ])
        .unwrap();
        assert_eq!(network.bounds.min_x(), -1.0);
        assert_eq!(network.bounds.max_x(), 2.0);
        assert_eq!(network.bounds.max_y(), 3.0);

        assert!(RoadNetwork::from_segments(vec![]).is_err());
    }
}
