//! Hour-of-day lookup tables
//!
//! The driver picks per-step inputs from these: background pollutant level per
//! hour (one profile per simulated day), traffic volume per hour (shared by all
//! days), and a wind forecast in fixed-width buckets.

use crate::error::ConfigError;
use crate::solver::WindParams;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;

/// One value per hour of the day
///
/// Serialized as a plain 24-element list; other lengths fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct HourlyProfile([f32; HOURS_PER_DAY]);

impl TryFrom<Vec<f32>> for HourlyProfile {
    type Error = ConfigError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        let len = values.len();
        let arr: [f32; HOURS_PER_DAY] = values
            .try_into()
            .map_err(|_| ConfigError::ProfileLength(len))?;
        Ok(Self(arr))
    }
}

impl From<HourlyProfile> for Vec<f32> {
    fn from(profile: HourlyProfile) -> Self {
        profile.0.to_vec()
    }
}

impl HourlyProfile {
    #[must_use]
    pub const fn new(values: [f32; HOURS_PER_DAY]) -> Self {
        Self(values)
    }

    /// Same value at every hour
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self([value; HOURS_PER_DAY])
    }

    /// Value for `hour`, wrapping past midnight
    #[inline]
    #[must_use]
    pub fn at(&self, hour: usize) -> f32 {
        self.0[hour % HOURS_PER_DAY]
    }

    #[must_use]
    pub fn values(&self) -> &[f32; HOURS_PER_DAY] {
        &self.0
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ProfileValue`] for the first negative or
    /// non-finite entry.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        match self
            .0
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            Some((hour, &value)) => Err(ConfigError::ProfileValue {
                name: name.to_string(),
                hour,
                value,
            }),
            None => Ok(()),
        }
    }
}

/// Share of peak traffic on the road at each hour of a weekday
pub const WEEKDAY_TRAFFIC_VOLUME: HourlyProfile = HourlyProfile::new([
    0.05, 0.05, 0.05, 0.05, 0.1, 0.3, // night
    0.6, 1.0, 0.9, 0.8, 0.7, 0.7, // morning
    0.8, 0.8, 0.9, 1.0, 0.9, 0.8, // afternoon
    0.7, 0.6, 0.5, 0.4, 0.2, 0.1, // evening
]);

/// Monitoring-station PM10 background for a winter Monday (µg/m³)
pub const MONDAY_BACKGROUND: HourlyProfile = HourlyProfile::new([
    28.44, 24.69, 24.04, 23.08, 22.5, 21.96, 22.32, 25.27, 28.61, 26.98, 27.41, 26.78, 30.68,
    28.69, 31.62, 28.23, 28.42, 32.76, 38.14, 40.36, 38.14, 40.18, 35.66, 35.66,
]);

/// Monitoring-station PM10 background for the following Tuesday (µg/m³)
pub const TUESDAY_BACKGROUND: HourlyProfile = HourlyProfile::new([
    32.85, 30.7, 30.55, 31.61, 31.81, 29.2, 30.45, 32.91, 32.59, 33.46, 33.25, 33.14, 31.18,
    29.12, 27.94, 25.09, 28.01, 28.6, 34.02, 39.94, 43.78, 45.77, 51.22, 47.21,
]);

/// Inputs for one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub name: String,
    /// Background pollutant level per hour
    pub background: HourlyProfile,
    /// Wind per forecast bucket, in chronological order
    pub wind: Vec<WindParams>,
}

impl DayPlan {
    /// Wind for `hour`; buckets past the end of the forecast reuse the last one
    #[must_use]
    pub fn wind_at(&self, hour: usize, bucket_hours: usize) -> WindParams {
        let bucket = hour / bucket_hours.max(1);
        self.wind
            .get(bucket)
            .or_else(|| self.wind.last())
            .copied()
            .unwrap_or(WindParams::CALM)
    }

    /// # Errors
    ///
    /// Returns an error if the background profile is malformed, the forecast
    /// is empty, or any wind bucket is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.background.validate(&self.name)?;
        if self.wind.is_empty() {
            return Err(ConfigError::EmptyForecast(self.name.clone()));
        }
        for (bucket, wind) in self.wind.iter().enumerate() {
            if let Some(reason) = wind.problem() {
                return Err(ConfigError::InvalidWind {
                    day: self.name.clone(),
                    bucket,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Default warm-up day: light westerly turning north-westerly
    #[must_use]
    pub fn monday() -> Self {
        Self {
            name: "Monday".to_string(),
            background: MONDAY_BACKGROUND,
            wind: vec![
                WindParams::new(0.12, 1, 0),
                WindParams::new(0.10, 1, 0),
                WindParams::new(0.14, 1, 1),
                WindParams::new(0.22, 1, 1),
                WindParams::new(0.26, 1, 1),
                WindParams::new(0.20, 0, 1),
                WindParams::new(0.14, 0, 1),
                WindParams::new(0.10, 1, 1),
            ],
        }
    }

    /// Default recorded day: calm night, easterly afternoon
    #[must_use]
    pub fn tuesday() -> Self {
        Self {
            name: "Tuesday".to_string(),
            background: TUESDAY_BACKGROUND,
            wind: vec![
                WindParams::new(0.06, -1, 0),
                WindParams::new(0.0, 0, 0),
                WindParams::new(0.08, -1, 0),
                WindParams::new(0.16, -1, -1),
                WindParams::new(0.24, -1, 0),
                WindParams::new(0.18, -1, 0),
                WindParams::new(0.10, 0, -1),
                WindParams::new(0.06, 0, -1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_rejects_wrong_length() {
        let short: Result<HourlyProfile, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(short.is_err());

        let full = serde_json::to_string(&vec![1.5_f32; 24]).unwrap();
        let profile: HourlyProfile = serde_json::from_str(&full).unwrap();
        assert_eq!(profile.at(23), 1.5);
    }

    #[test]
    fn test_profile_wraps_hour() {
        assert_eq!(WEEKDAY_TRAFFIC_VOLUME.at(7), 1.0);
        assert_eq!(WEEKDAY_TRAFFIC_VOLUME.at(24 + 7), 1.0);
    }

    #[test]
    fn test_profile_rejects_negative_values() {
        let mut values = [1.0; 24];
        values[5] = -2.0;
        let err = HourlyProfile::new(values).validate("bad").unwrap_err();
        assert!(matches!(err, ConfigError::ProfileValue { hour: 5, .. }));
    }

    #[test]
    fn test_wind_bucket_selection_and_clamp() {
        let day = DayPlan {
            name: "short".into(),
            background: HourlyProfile::constant(10.0),
            wind: vec![WindParams::new(0.1, 1, 0), WindParams::new(0.2, 0, 1)],
        };
        assert_eq!(day.wind_at(0, 3), WindParams::new(0.1, 1, 0));
        assert_eq!(day.wind_at(2, 3), WindParams::new(0.1, 1, 0));
        assert_eq!(day.wind_at(3, 3), WindParams::new(0.2, 0, 1));
        // Past the forecast: last bucket
        assert_eq!(day.wind_at(23, 3), WindParams::new(0.2, 0, 1));
    }

    #[test]
    fn test_day_validation() {
        assert!(DayPlan::monday().validate().is_ok());
        assert!(DayPlan::tuesday().validate().is_ok());

        let mut day = DayPlan::monday();
        day.wind.clear();
        assert!(matches!(day.validate(), Err(ConfigError::EmptyForecast(_))));

        let mut day = DayPlan::monday();
        day.wind[3].dir_y = 3;
        assert!(matches!(
            day.validate(),
            Err(ConfigError::InvalidWind { bucket: 3, .. })
        ));
    }
}
