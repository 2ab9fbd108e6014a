//! Traffic sensors and congestion attribution
//!
//! - `point`: a sensor position with its 24-hour congestion profile
//! - `table`: semicolon-delimited sensor table reader
//! - `index`: R-tree nearest-sensor lookup
//! - `congestion`: per-hour multiplier grids over road cells

mod congestion;
mod index;
mod point;
mod table;

pub use congestion::{CongestionAttributor, CongestionGrid};
pub use index::SensorIndex;
pub use point::TrafficPoint;
pub(crate) use table::parse_lat_lon;
pub use table::{parse_traffic_table, TrafficTableFormat};
