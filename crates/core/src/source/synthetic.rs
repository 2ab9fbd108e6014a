//! Seeded synthetic city
//!
//! Produces a jittered street grid with a few arterial roads and a scatter of
//! traffic sensors whose daily profile follows the weekday traffic curve. The
//! same seed always yields the same network and sensors, which makes it useful
//! for demos and end-to-end tests without any external data.

use super::{RoadNetworkSource, TrafficSource};
use crate::core_types::{geo, BoundingBox, GeoPoint, Meters};
use crate::error::SourceError;
use crate::roads::{RoadClass, RoadNetwork, RoadSegment};
use crate::simulation::profiles::{HOURS_PER_DAY, WEEKDAY_TRAFFIC_VOLUME};
use crate::traffic::TrafficPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

// Metres per degree of latitude, and of longitude at the equator
const METERS_PER_DEG_LAT: f64 = 110_540.0;
const METERS_PER_DEG_LON: f64 = 111_320.0;

/// Approximate length of a polyline in metres (equirectangular)
fn polyline_length(points: &[GeoPoint]) -> Meters {
    let total: f64 = points
        .windows(2)
        .map(|pair| {
            let mid_lat = (pair[0].y + pair[1].y) / 2.0;
            let dx = (pair[1].x - pair[0].x) * METERS_PER_DEG_LON * mid_lat.to_radians().cos();
            let dy = (pair[1].y - pair[0].y) * METERS_PER_DEG_LAT;
            dx.hypot(dy)
        })
        .sum();
    Meters::from(total as f32)
}

/// Reproducible street grid plus sensors
#[derive(Debug, Clone)]
pub struct SyntheticCity {
    pub seed: u64,
    pub bounds: BoundingBox,
    /// Streets running in each direction
    pub streets_per_axis: usize,
    pub sensors: usize,
}

impl SyntheticCity {
    /// A city roughly the size of Jeżyce, Poznań
    ///
    /// # Errors
    ///
    /// Never fails for these constants; the `Result` comes from bounding box
    /// validation.
    pub fn new(seed: u64) -> Result<Self, SourceError> {
        Ok(Self {
            seed,
            bounds: BoundingBox::new(16.86, 16.93, 52.40, 52.43)?,
            streets_per_axis: 12,
            sensors: 8,
        })
    }

    fn street_class(rng: &mut StdRng, index: usize, count: usize) -> (RoadClass, Option<f32>) {
        if index == count / 2 {
            return (RoadClass::Primary, Some(2.0));
        }
        if index == count / 4 || index == 3 * count / 4 {
            return (RoadClass::Secondary, Some(rng.random_range(1..=2) as f32));
        }
        let class = match rng.random_range(0..10) {
            0 => RoadClass::Tertiary,
            1 => RoadClass::LivingStreet,
            2 => RoadClass::Service,
            _ => RoadClass::Residential,
        };
        (class, None)
    }

    /// Split a straight street into one segment per block
    fn street_segments<'a>(
        points: &'a [GeoPoint],
        class: RoadClass,
        lanes: Option<f32>,
        name: &str,
    ) -> impl Iterator<Item = RoadSegment> + 'a {
        let name = name.to_string();
        points.windows(2).map(move |pair| {
            let mut segment = RoadSegment::new(pair.to_vec(), class, polyline_length(pair))
                .with_name(name.clone());
            segment.lanes = lanes;
            segment
        })
    }
}

impl RoadNetworkSource for SyntheticCity {
    fn fetch_roads(&self, place: &str) -> Result<RoadNetwork, SourceError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let b = self.bounds;
        let n = self.streets_per_axis.max(2);
        let jitter_x = b.width() / (n as f64 * 6.0);
        let jitter_y = b.height() / (n as f64 * 6.0);

        // Crossing positions along each axis, shared by both street directions
        let xs: Vec<f64> = (0..n)
            .map(|i| b.min_x() + b.width() * i as f64 / (n - 1) as f64)
            .collect();
        let ys: Vec<f64> = (0..n)
            .map(|i| b.min_y() + b.height() * i as f64 / (n - 1) as f64)
            .collect();

        let mut segments = Vec::new();
        for (i, &y) in ys.iter().enumerate() {
            let (class, lanes) = Self::street_class(&mut rng, i, n);
            let points: Vec<GeoPoint> = xs
                .iter()
                .map(|&x| geo(x, y + rng.random_range(-jitter_y..=jitter_y)))
                .collect();
            let name = format!("Street {}", i + 1);
            segments.extend(Self::street_segments(&points, class, lanes, &name));
        }
        for (j, &x) in xs.iter().enumerate() {
            let (class, lanes) = Self::street_class(&mut rng, j, n);
            let points: Vec<GeoPoint> = ys
                .iter()
                .map(|&y| geo(x + rng.random_range(-jitter_x..=jitter_x), y))
                .collect();
            let name = format!("Avenue {}", j + 1);
            segments.extend(Self::street_segments(&points, class, lanes, &name));
        }

        debug!(
            "Generated {} synthetic road segments for `{}` (seed {})",
            segments.len(),
            place,
            self.seed
        );
        Ok(RoadNetwork::with_bounds(segments, b))
    }
}

impl TrafficSource for SyntheticCity {
    fn fetch_hourly_congestion(&self) -> Result<Vec<TrafficPoint>, SourceError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(0x5EED));
        let b = self.bounds;

        let points = (0..self.sensors)
            .map(|_| {
                let location = geo(
                    rng.random_range(b.min_x()..=b.max_x()),
                    rng.random_range(b.min_y()..=b.max_y()),
                );
                let peak: f32 = rng.random_range(15.0..60.0);
                let mut hourly = [0.0_f32; HOURS_PER_DAY];
                for (hour, value) in hourly.iter_mut().enumerate() {
                    let noise: f32 = rng.random_range(-3.0..3.0);
                    *value = (peak * WEEKDAY_TRAFFIC_VOLUME.at(hour) + noise).max(0.0).round();
                }
                TrafficPoint::new(location, hourly)
            })
            .collect();
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_city() {
        let a = SyntheticCity::new(7).unwrap();
        let b = SyntheticCity::new(7).unwrap();
        let ra = a.fetch_roads("x").unwrap();
        let rb = b.fetch_roads("x").unwrap();
        assert_eq!(ra.segments, rb.segments);
        assert_eq!(
            a.fetch_hourly_congestion().unwrap(),
            b.fetch_hourly_congestion().unwrap()
        );

        let other = SyntheticCity::new(8).unwrap().fetch_roads("x").unwrap();
        assert_ne!(ra.segments, other.segments);
    }

    #[test]
    fn test_network_shape() {
        let city = SyntheticCity::new(1).unwrap();
        let network = city.fetch_roads("x").unwrap();
        // 12 streets each way, 11 blocks per street
        assert_eq!(network.segments.len(), 2 * 12 * 11);
        assert!(network
            .segments
            .iter()
            .any(|s| s.class == Some(RoadClass::Primary) && s.lanes == Some(2.0)));
        assert!(network.segments.iter().all(|s| *s.length > 0.0));
    }

    #[test]
    fn test_sensors_inside_bounds() {
        let city = SyntheticCity::new(3).unwrap();
        let sensors = city.fetch_hourly_congestion().unwrap();
        assert_eq!(sensors.len(), 8);
        for s in &sensors {
            assert!(city.bounds.contains(&s.location));
            assert!(s.hourly.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_polyline_length() {
        // 0.01° of latitude ≈ 1105 m
        let len = polyline_length(&[geo(16.9, 52.40), geo(16.9, 52.41)]);
        assert!((*len - 1105.4).abs() < 1.0, "{len}");
    }
}
