//! Road classes and their baseline emission weights

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Road classification (OSM `highway` tag values the model recognizes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    Residential,
    LivingStreet,
    Service,
}

impl RoadClass {
    /// Every recognized class, heaviest first
    pub const ALL: [RoadClass; 10] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::PrimaryLink,
        RoadClass::Secondary,
        RoadClass::SecondaryLink,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::LivingStreet,
        RoadClass::Service,
    ];

    /// Parse a raw `highway` tag; unknown tags yield `None`
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let class = match tag.trim() {
            "motorway" => Self::Motorway,
            "trunk" => Self::Trunk,
            "primary" => Self::Primary,
            "primary_link" => Self::PrimaryLink,
            "secondary" => Self::Secondary,
            "secondary_link" => Self::SecondaryLink,
            "tertiary" => Self::Tertiary,
            "residential" => Self::Residential,
            "living_street" => Self::LivingStreet,
            "service" => Self::Service,
            _ => return None,
        };
        Some(class)
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Motorway => "motorway",
            Self::Trunk => "trunk",
            Self::Primary => "primary",
            Self::PrimaryLink => "primary_link",
            Self::Secondary => "secondary",
            Self::SecondaryLink => "secondary_link",
            Self::Tertiary => "tertiary",
            Self::Residential => "residential",
            Self::LivingStreet => "living_street",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Baseline emission weight per road class
///
/// Classes missing from the table weigh 0 and are skipped by the rasterizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmissionTable(BTreeMap<RoadClass, f32>);

impl Default for EmissionTable {
    fn default() -> Self {
        Self(BTreeMap::from([
            (RoadClass::Motorway, 25.0),
            (RoadClass::Trunk, 20.0),
            (RoadClass::Primary, 18.0),
            (RoadClass::PrimaryLink, 15.0),
            (RoadClass::Secondary, 14.0),
            (RoadClass::SecondaryLink, 14.0),
            (RoadClass::Tertiary, 8.0),
            (RoadClass::Residential, 4.0),
            (RoadClass::LivingStreet, 2.0),
            (RoadClass::Service, 1.0),
        ]))
    }
}

impl EmissionTable {
    /// Empty table (every class weighs 0)
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, class: RoadClass, weight: f32) {
        self.0.insert(class, weight);
    }

    #[must_use]
    pub fn weight(&self, class: RoadClass) -> f32 {
        self.0.get(&class).copied().unwrap_or(0.0)
    }

    /// Heaviest configured weight
    #[must_use]
    pub fn max_weight(&self) -> f32 {
        self.0.values().copied().fold(0.0, f32::max)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEmissionWeight`] for the first weight that
    /// is negative or non-finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (class, &value) in &self.0 {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidEmissionWeight {
                    class: class.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}
