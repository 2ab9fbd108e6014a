//! Simulation configuration
//!
//! A single `SimulationConfig` is created at startup (defaults, or JSON via
//! [`SimulationConfig::from_json_str`]), validated once, and then passed by
//! reference to every component. Nothing reads configuration from globals and
//! nothing reloads it mid-run.

use crate::core_types::{KilometersPerHour, Meters, Seconds};
use crate::error::ConfigError;
use crate::roads::EmissionTable;
use crate::simulation::profiles::{DayPlan, HourlyProfile, WEEKDAY_TRAFFIC_VOLUME};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: usize = 24 * 60;

/// Which road segments may name a street on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    /// Segments must be strictly longer than this to qualify
    pub min_length: Meters,
    /// Segments must have an emission weight strictly above this
    pub min_emission: f32,
    /// Renderers only draw labels from segments longer than this
    pub display_min_length: Meters,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            min_length: Meters::new(50.0),
            min_emission: 1.0,
            display_min_length: Meters::new(200.0),
        }
    }
}

/// Every tunable of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Area queried from the road network provider
    pub place_name: String,
    /// Cells per side of the square grid
    pub grid_size: usize,
    /// Side of one cell
    pub cell_size: Meters,
    /// Simulated time per step
    pub time_step: Seconds,
    /// Steps per simulated day
    pub steps_per_day: usize,
    /// Laplacian weight per step; above 0.25 the explicit scheme goes unstable
    pub diffusion_rate: f32,
    /// Fraction of pollutant lost per step
    pub decay_rate: f32,
    /// Scales congestion × volume into an emission rate
    pub traffic_emission_scalar: f32,
    /// Share of the emission attributed to the monitored background
    pub ratio_background: f32,
    /// Share of the emission attributed to traffic
    pub ratio_traffic: f32,
    /// Emission weight that counts as a fully road-like cell
    pub permeability_normalizer: f32,
    /// Emission multiplier per lane beyond the first
    pub lane_factor: f32,
    /// Wind speed at normalized speed 1.0
    pub wind_reference: KilometersPerHour,
    /// Normalized wind speeds at or below this skip advection
    pub wind_gate: f32,
    /// Hours covered by one wind forecast bucket
    pub forecast_bucket_hours: usize,
    pub labels: LabelRules,
    pub emission: EmissionTable,
    /// Share of peak traffic volume per hour
    pub traffic_volume: HourlyProfile,
    /// Simulated days in order; all but the last are warm-up
    pub days: Vec<DayPlan>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            place_name: "Jeżyce, Poznań, Poland".to_string(),
            grid_size: 450,
            cell_size: Meters::new(100.0),
            time_step: Seconds::new(300.0),
            steps_per_day: 288,
            diffusion_rate: 0.05,
            decay_rate: 0.012,
            traffic_emission_scalar: 60.0,
            ratio_background: 0.30,
            ratio_traffic: 0.70,
            permeability_normalizer: 25.0,
            lane_factor: 0.6,
            wind_reference: KilometersPerHour::new(50.0),
            wind_gate: 0.01,
            forecast_bucket_hours: 3,
            labels: LabelRules::default(),
            emission: EmissionTable::default(),
            traffic_volume: WEEKDAY_TRAFFIC_VOLUME,
            days: vec![DayPlan::monday(), DayPlan::tuesday()],
        }
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or any validation
    /// error from [`Self::validate`].
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value before any component is built
    ///
    /// # Errors
    ///
    /// Returns the first problem found: bad grid size or step count,
    /// non-finite or out-of-range rates, ratios not summing to 1, malformed
    /// emission weights, profiles or wind forecasts, or fewer than two days.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if self.steps_per_day == 0 || self.steps_per_day > MINUTES_PER_DAY {
            return Err(ConfigError::InvalidStepsPerDay(self.steps_per_day));
        }

        check_range("cell_size", *self.cell_size, f32::MIN_POSITIVE, f32::MAX)?;
        check_range("time_step", *self.time_step, f32::MIN_POSITIVE, f32::MAX)?;
        check_range("diffusion_rate", self.diffusion_rate, 0.0, 0.25)?;
        check_range("decay_rate", self.decay_rate, 0.0, 1.0)?;
        check_range(
            "traffic_emission_scalar",
            self.traffic_emission_scalar,
            0.0,
            f32::MAX,
        )?;
        check_range("ratio_background", self.ratio_background, 0.0, 1.0)?;
        check_range("ratio_traffic", self.ratio_traffic, 0.0, 1.0)?;
        if (self.ratio_background + self.ratio_traffic - 1.0).abs() > 1e-5 {
            return Err(ConfigError::RatioSum {
                background: self.ratio_background,
                traffic: self.ratio_traffic,
            });
        }
        check_range(
            "permeability_normalizer",
            self.permeability_normalizer,
            f32::MIN_POSITIVE,
            f32::MAX,
        )?;
        check_range("lane_factor", self.lane_factor, 0.0, f32::MAX)?;
        check_range("wind_reference", *self.wind_reference, 0.0, f32::MAX)?;
        check_range("wind_gate", self.wind_gate, 0.0, 1.0)?;
        if self.forecast_bucket_hours == 0 {
            return Err(ConfigError::OutOfRange {
                name: "forecast_bucket_hours",
                value: 0.0,
                min: 1.0,
                max: 24.0,
            });
        }
        check_range("labels.min_length", *self.labels.min_length, 0.0, f32::MAX)?;
        check_range("labels.min_emission", self.labels.min_emission, 0.0, f32::MAX)?;

        self.emission.validate()?;
        self.traffic_volume.validate("traffic_volume")?;

        if self.days.len() < 2 {
            return Err(ConfigError::TooFewDays(self.days.len()));
        }
        for day in &self.days {
            day.validate()?;
        }
        Ok(())
    }

    /// Simulated minutes per step
    #[must_use]
    pub fn minutes_per_step(&self) -> f64 {
        MINUTES_PER_DAY as f64 / self.steps_per_day as f64
    }

    /// Steps across all configured days
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days.len()
    }

    /// Index of the recorded (final) day
    #[must_use]
    pub fn recorded_day(&self) -> usize {
        self.days.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roads::RoadClass;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_steps(), 576);
        assert!((config.minutes_per_step() - 5.0).abs() < 1e-12);
        assert_eq!(config.recorded_day(), 1);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{"grid_size": 120, "decay_rate": 0.02, "emission": {"primary": 10.0}}"#,
        )
        .unwrap();
        assert_eq!(config.grid_size, 120);
        assert_eq!(config.decay_rate, 0.02);
        assert_eq!(config.steps_per_day, 288);
        assert_eq!(config.emission.weight(RoadClass::Primary), 10.0);
        assert_eq!(config.emission.weight(RoadClass::Motorway), 0.0);
        assert_eq!(config.days.len(), 2);
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_bad_rates() {
        let mut config = SimulationConfig::default();
        config.decay_rate = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { name: "decay_rate", .. })
        ));

        let mut config = SimulationConfig::default();
        config.diffusion_rate = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.diffusion_rate = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_ratio_split_not_summing_to_one() {
        let mut config = SimulationConfig::default();
        config.ratio_traffic = 0.6;
        assert!(matches!(config.validate(), Err(ConfigError::RatioSum { .. })));
    }

    #[test]
    fn test_rejects_structural_problems() {
        let mut config = SimulationConfig::default();
        config.grid_size = 2;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGridSize(2))));

        let mut config = SimulationConfig::default();
        config.steps_per_day = 0;
        assert!(config.validate().is_err());

        // Non-divisors of 1440 are fine; only the range is enforced
        config.steps_per_day = 7;
        assert!(config.validate().is_ok());
        config.steps_per_day = 1441;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "steps per day must be within 1..=1440, got 1441");

        let mut config = SimulationConfig::default();
        config.days.truncate(1);
        assert!(matches!(config.validate(), Err(ConfigError::TooFewDays(1))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(SimulationConfig::from_json_str(r#"{"traffic_volume": [1.0]}"#).is_err());
    }
}
