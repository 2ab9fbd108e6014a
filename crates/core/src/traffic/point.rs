use crate::core_types::GeoPoint;
use crate::simulation::profiles::HOURS_PER_DAY;
use serde::{Deserialize, Serialize};

/// A traffic sensor and its typical congestion over a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    /// Sensor position (x = longitude, y = latitude)
    pub location: GeoPoint,
    /// Congestion percentage for each hour, `0` meaning free flow
    pub hourly: [f32; HOURS_PER_DAY],
    /// Street the sensor sits on, when the source names it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl TrafficPoint {
    #[must_use]
    pub fn new(location: GeoPoint, hourly: [f32; HOURS_PER_DAY]) -> Self {
        Self {
            location,
            hourly,
            street: None,
        }
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// Emission multiplier at `hour`: `1 + congestion / 100`
    #[inline]
    #[must_use]
    pub fn multiplier(&self, hour: usize) -> f32 {
        1.0 + self.hourly[hour % HOURS_PER_DAY] / 100.0
    }
}
