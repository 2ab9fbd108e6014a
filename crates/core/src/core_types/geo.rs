//! Geographic coordinates and bounding boxes
//!
//! Coordinates are stored as `nalgebra::Point2<f64>` with `x = longitude` and
//! `y = latitude`, matching the (x, y) order mapping providers use for
//! geometries.

use crate::error::InputError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Geographic coordinate, `x = lon`, `y = lat`
pub type GeoPoint = Point2<f64>;

/// Build a [`GeoPoint`] from longitude and latitude
#[inline]
#[must_use]
pub fn geo(lon: f64, lat: f64) -> GeoPoint {
    GeoPoint::new(lon, lat)
}

/// Axis-aligned geographic extent of the simulated area
///
/// Construction rejects degenerate boxes (zero or negative extent, non-finite
/// edges) so that coordinate mapping downstream is total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box from its edges
    ///
    /// # Errors
    ///
    /// Returns [`InputError::DegenerateBounds`] if any edge is non-finite or
    /// either extent is not strictly positive.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, InputError> {
        let finite = [min_x, max_x, min_y, max_y].iter().all(|v| v.is_finite());
        if !finite || max_x <= min_x || max_y <= min_y {
            return Err(InputError::DegenerateBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Smallest box enclosing all points
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyNetwork`] for an empty iterator and
    /// [`InputError::DegenerateBounds`] when the points are collinear along an
    /// axis (zero width or height).
    pub fn enclosing<'a, I>(points: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter().peekable();
        if iter.peek().is_none() {
            return Err(InputError::EmptyNetwork);
        }

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in iter {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, max_x, min_y, max_y)
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// East-west extent in degrees
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// North-south extent in degrees
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_boxes() {
        assert!(BoundingBox::new(1.0, 1.0, 0.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 1.0, 2.0, 1.0).is_err());
        assert!(BoundingBox::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 1.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_enclosing_points() {
        let pts = [geo(16.90, 52.41), geo(16.95, 52.43), geo(16.92, 52.40)];
        let bbox = BoundingBox::enclosing(&pts).unwrap();
        assert_eq!(bbox.min_x(), 16.90);
        assert_eq!(bbox.max_x(), 16.95);
        assert_eq!(bbox.min_y(), 52.40);
        assert_eq!(bbox.max_y(), 52.43);
        assert!(bbox.contains(&geo(16.91, 52.42)));
        assert!(!bbox.contains(&geo(17.0, 52.42)));
    }

    #[test]
    fn test_enclosing_empty_is_error() {
        let pts: Vec<GeoPoint> = Vec::new();
        assert!(matches!(
            BoundingBox::enclosing(&pts),
            Err(InputError::EmptyNetwork)
        ));
    }
}
