//! Light source definitions
//!
//! Static lights keep their configured color and location for every shot.
//! Dynamic lights move, rainbow lights change color; both are re-sampled
//! at every rendered coordinate.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// RGB color with components in `[0, 1]`.
pub type Rgb = [f64; 3];

fn default_max_energy() -> f64 {
    10.0
}

/// Light configuration, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Light {
    /// Fixed location, fixed color
    #[serde(rename = "static")]
    Static {
        color: Rgb,
        location: DVec3,
        #[serde(default = "default_max_energy")]
        max_energy: f64,
    },
    /// Random location within `max_range`, fixed color
    #[serde(rename = "dynamic")]
    Dynamic {
        color: Rgb,
        max_range: f64,
        #[serde(default = "default_max_energy")]
        max_energy: f64,
    },
    /// Fixed location, random color
    #[serde(rename = "rainbow_static_light")]
    RainbowStatic {
        location: DVec3,
        #[serde(default = "default_max_energy")]
        max_energy: f64,
    },
    /// Random location, random color
    #[serde(rename = "rainbow_dynamic_light")]
    RainbowDynamic {
        max_range: f64,
        #[serde(default = "default_max_energy")]
        max_energy: f64,
    },
}

impl Light {
    /// A light that never moves and never changes color.
    pub fn static_light(color: Rgb, location: DVec3, max_energy: f64) -> Result<Self, ConfigError> {
        let light = Light::Static {
            color,
            location,
            max_energy,
        };
        light.validate()?;
        Ok(light)
    }

    /// A light with a fixed color placed randomly inside `[-max_range, max_range]^3`.
    pub fn dynamic_light(color: Rgb, max_range: f64, max_energy: f64) -> Result<Self, ConfigError> {
        let light = Light::Dynamic {
            color,
            max_range,
            max_energy,
        };
        light.validate()?;
        Ok(light)
    }

    /// A light at a fixed location with a random color.
    pub fn rainbow_static_light(location: DVec3, max_energy: f64) -> Result<Self, ConfigError> {
        let light = Light::RainbowStatic {
            location,
            max_energy,
        };
        light.validate()?;
        Ok(light)
    }

    /// A light with random location and random color.
    pub fn rainbow_dynamic_light(max_range: f64, max_energy: f64) -> Result<Self, ConfigError> {
        let light = Light::RainbowDynamic {
            max_range,
            max_energy,
        };
        light.validate()?;
        Ok(light)
    }

    /// Kind tag as written in config files.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Light::Static { .. } => "static",
            Light::Dynamic { .. } => "dynamic",
            Light::RainbowStatic { .. } => "rainbow_static_light",
            Light::RainbowDynamic { .. } => "rainbow_dynamic_light",
        }
    }

    /// Upper bound for the light intensity.
    pub fn max_energy(&self) -> f64 {
        match self {
            Light::Static { max_energy, .. }
            | Light::Dynamic { max_energy, .. }
            | Light::RainbowStatic { max_energy, .. }
            | Light::RainbowDynamic { max_energy, .. } => *max_energy,
        }
    }

    /// Whether the light is placed at a new random location every shot.
    pub fn moves(&self) -> bool {
        matches!(self, Light::Dynamic { .. } | Light::RainbowDynamic { .. })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Light::Static { color, location, .. } => {
                validate_color(color)?;
                validate_location(location)?;
            }
            Light::Dynamic { color, max_range, .. } => {
                validate_color(color)?;
                validate_range("light max_range", *max_range)?;
            }
            Light::RainbowStatic { location, .. } => validate_location(location)?,
            Light::RainbowDynamic { max_range, .. } => {
                validate_range("light max_range", *max_range)?
            }
        }
        validate_range("light max_energy", self.max_energy())
    }
}

fn validate_color(color: &Rgb) -> Result<(), ConfigError> {
    for (channel, value) in ["r", "g", "b"].iter().zip(color.iter()) {
        if !(0.0..=1.0).contains(value) {
            return Err(ConfigError::Validation(format!(
                "{}-channel must be between 0 and 1, got {}",
                channel, value
            )));
        }
    }
    Ok(())
}

fn validate_location(location: &DVec3) -> Result<(), ConfigError> {
    if !location.is_finite() {
        return Err(ConfigError::Validation(format!(
            "light location must be finite, got {}",
            location
        )));
    }
    Ok(())
}

/// Shared by lights and viewpoints: a non-negative, finite bound.
pub(crate) fn validate_range(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}
