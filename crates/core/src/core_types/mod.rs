//! Core types and utilities

pub mod geo;
pub mod units;

pub use geo::{geo, BoundingBox, GeoPoint};
pub use units::*;
