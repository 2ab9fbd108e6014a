use crate::core_types::GeoPoint;
use crate::error::CollectorError;
use serde::{Deserialize, Serialize};

/// Speeds reported by a traffic flow provider for one road point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowReading {
    pub current_speed: f32,
    pub free_flow_speed: f32,
}

impl FlowReading {
    #[must_use]
    pub fn new(current_speed: f32, free_flow_speed: f32) -> Self {
        Self {
            current_speed,
            free_flow_speed,
        }
    }

    /// `(1 − current / free_flow) × 100`, truncated toward zero
    ///
    /// Negative when traffic moves faster than free flow.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidReading`] if either speed is
    /// non-finite, the current speed is negative, or the free-flow speed is
    /// not positive.
    pub fn congestion_pct(&self, location: &str) -> Result<i32, CollectorError> {
        let valid = self.current_speed.is_finite()
            && self.free_flow_speed.is_finite()
            && self.current_speed >= 0.0
            && self.free_flow_speed > 0.0;
        if !valid {
            return Err(CollectorError::InvalidReading {
                location: location.to_string(),
                current: self.current_speed,
                free_flow: self.free_flow_speed,
            });
        }
        let ratio = f64::from(self.current_speed) / f64::from(self.free_flow_speed);
        Ok(((1.0 - ratio) * 100.0).trunc() as i32)
    }
}

/// Source of live flow readings, e.g. a traffic web API
pub trait FlowProvider: Send + Sync {
    /// Current and free-flow speed at `location`
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Provider`] for transport or decoding
    /// failures; the collector retries these.
    fn flow_at(&self, location: &GeoPoint) -> Result<FlowReading, CollectorError>;
}

/// A street point the collector polls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredStreet {
    pub street: String,
    pub location: GeoPoint,
}

/// One collector observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionSample {
    pub street: String,
    pub location: GeoPoint,
    pub hour: u8,
    pub minute: u8,
    pub congestion_pct: i32,
}

/// Format a point the way the sensor tables store it: `lat,lon`
#[must_use]
pub fn format_lat_lon(location: &GeoPoint) -> String {
    format!("{},{}", location.y, location.x)
}
