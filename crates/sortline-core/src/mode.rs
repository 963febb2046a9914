//! Sensor modes, their decision zones, and sensor readings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseModeError;
use crate::package::{Attributes, PackageColor, PackageSize};

/// The active classification mode. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SensorMode {
    /// Sort by weight bands.
    Weight,
    /// Sort by surface color.
    Color,
    /// Sort by size category.
    Size,
}

impl SensorMode {
    /// All modes, in decision-zone order along the incoming lane.
    pub const ALL: [SensorMode; 3] = [Self::Weight, Self::Color, Self::Size];

    /// Horizontal coordinate of this mode's sensor along the incoming lane.
    ///
    /// The actuator is parked at the active mode's decision x.
    pub const fn decision_x(self) -> f64 {
        match self {
            Self::Weight => 320.0,
            Self::Color => 520.0,
            Self::Size => 720.0,
        }
    }

    /// Short key accepted by [`FromStr`] (`weight`, `color`, `size`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Color => "color",
            Self::Size => "size",
        }
    }

    /// Human-readable sensor name.
    pub fn sensor_name(self) -> &'static str {
        match self {
            Self::Weight => "Weight Sensor",
            Self::Color => "Color Sensor",
            Self::Size => "Size Sensor",
        }
    }

    /// Read the attribute this mode's sensor measures.
    pub fn read(self, attributes: &Attributes) -> SensorReading {
        match self {
            Self::Weight => SensorReading::Weight(attributes.weight),
            Self::Color => SensorReading::Color(attributes.color),
            Self::Size => SensorReading::Size(attributes.size),
        }
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SensorMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == lowered)
            .ok_or_else(|| ParseModeError {
                input: s.to_string(),
            })
    }
}

/// A single sensor measurement: the attribute relevant to one mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SensorReading {
    /// Weight in kg.
    Weight(u8),
    /// Surface color.
    Color(PackageColor),
    /// Size category.
    Size(PackageSize),
}

impl SensorReading {
    /// The mode that produces this kind of reading.
    pub fn mode(self) -> SensorMode {
        match self {
            Self::Weight(_) => SensorMode::Weight,
            Self::Color(_) => SensorMode::Color,
            Self::Size(_) => SensorMode::Size,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weight(w) => write!(f, "{w} kg"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Size(s) => write!(f, "{s}"),
        }
    }
}
