//! Road network model and rasterization
//!
//! Road geometry arrives as provider records, is normalized into
//! [`RoadSegment`]s, and is burned once into the static emission-base grid by
//! [`RoadRasterizer`]. The same pass produces the road-cell mask and one street
//! label per name.

mod class;
mod labels;
mod rasterizer;
mod segment;

pub use class::{EmissionTable, RoadClass};
pub use labels::{LabelCandidate, LabelSet};
pub use rasterizer::{line_cells, RasterizedNetwork, RoadRasterizer};
pub use segment::{OneOrMany, RoadNetwork, RoadRecord, RoadSegment, TagValue};
