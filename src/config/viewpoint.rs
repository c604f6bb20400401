//! Camera viewpoint definitions

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::light::validate_range;
use super::ConfigError;

/// Fewest segments a UV sphere can be built from.
pub const MIN_SPHERE_DIVISIONS: u32 = 3;

/// How camera coordinates are generated, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Viewpoint {
    /// The same location repeated `amount` times
    #[serde(rename = "static_camera")]
    StaticCamera { location: DVec3, amount: u32 },
    /// `amount` random locations inside `[-max_range, max_range]^3`
    #[serde(rename = "dynamic_camera")]
    DynamicCamera { amount: u32, max_range: f64 },
    /// Vertices of a UV sphere of diameter `size`
    #[serde(rename = "object_path", alias = "spherical_path")]
    SphericalPath {
        size: f64,
        horizontal_divisions: u32,
        vertical_divisions: u32,
    },
}

impl Viewpoint {
    /// A fixed camera location shot `amount` times.
    pub fn static_camera(location: DVec3, amount: u32) -> Result<Self, ConfigError> {
        let viewpoint = Viewpoint::StaticCamera { location, amount };
        viewpoint.validate()?;
        Ok(viewpoint)
    }

    /// `amount` random camera locations.
    pub fn dynamic_camera(amount: u32, max_range: f64) -> Result<Self, ConfigError> {
        let viewpoint = Viewpoint::DynamicCamera { amount, max_range };
        viewpoint.validate()?;
        Ok(viewpoint)
    }

    /// Camera locations following the vertices of a sphere around the model.
    pub fn spherical_path(
        size: f64,
        horizontal_divisions: u32,
        vertical_divisions: u32,
    ) -> Result<Self, ConfigError> {
        let viewpoint = Viewpoint::SphericalPath {
            size,
            horizontal_divisions,
            vertical_divisions,
        };
        viewpoint.validate()?;
        Ok(viewpoint)
    }

    /// Kind tag as written in config files.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Viewpoint::StaticCamera { .. } => "static_camera",
            Viewpoint::DynamicCamera { .. } => "dynamic_camera",
            Viewpoint::SphericalPath { .. } => "object_path",
        }
    }

    /// Number of coordinates this viewpoint samples.
    pub fn point_count(&self) -> usize {
        match self {
            Viewpoint::StaticCamera { amount, .. } | Viewpoint::DynamicCamera { amount, .. } => {
                *amount as usize
            }
            Viewpoint::SphericalPath {
                horizontal_divisions,
                vertical_divisions,
                ..
            } => uv_sphere_vertex_count(*horizontal_divisions, *vertical_divisions),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Viewpoint::StaticCamera { location, amount } => {
                if !location.is_finite() {
                    return Err(ConfigError::Validation(format!(
                        "camera location must be finite, got {}",
                        location
                    )));
                }
                validate_amount(*amount)
            }
            Viewpoint::DynamicCamera { amount, max_range } => {
                validate_amount(*amount)?;
                validate_range("camera max_range", *max_range)
            }
            Viewpoint::SphericalPath {
                size,
                horizontal_divisions,
                vertical_divisions,
            } => {
                if !size.is_finite() || *size <= 0.0 {
                    return Err(ConfigError::Validation(format!(
                        "sphere size must be positive, got {}",
                        size
                    )));
                }
                if *horizontal_divisions < MIN_SPHERE_DIVISIONS
                    || *vertical_divisions < MIN_SPHERE_DIVISIONS
                {
                    return Err(ConfigError::Validation(format!(
                        "sphere needs at least {} horizontal and vertical divisions, got {}x{}",
                        MIN_SPHERE_DIVISIONS, horizontal_divisions, vertical_divisions
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Vertex count of a UV sphere: one ring per inner latitude plus two poles.
pub fn uv_sphere_vertex_count(horizontal_divisions: u32, vertical_divisions: u32) -> usize {
    horizontal_divisions as usize * (vertical_divisions as usize).saturating_sub(1) + 2
}

fn validate_amount(amount: u32) -> Result<(), ConfigError> {
    if amount == 0 {
        return Err(ConfigError::Validation(
            "viewpoint amount must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count() {
        let v = Viewpoint::static_camera(DVec3::new(1.0, 2.0, 3.0), 4).unwrap();
        assert_eq!(v.point_count(), 4);

        let v = Viewpoint::spherical_path(2.0, 8, 4).unwrap();
        // 8 * 3 ring vertices + 2 poles
        assert_eq!(v.point_count(), 26);
    }

    #[test]
    fn test_invalid_viewpoints() {
        assert!(Viewpoint::static_camera(DVec3::ZERO, 0).is_err());
        assert!(Viewpoint::dynamic_camera(10, -1.0).is_err());
        assert!(Viewpoint::spherical_path(0.0, 8, 4).is_err());
        assert!(Viewpoint::spherical_path(2.0, 2, 4).is_err());
    }

    #[test]
    fn test_spherical_path_alias() {
        let v: Viewpoint = serde_json::from_str(
            r#"{"kind": "spherical_path", "size": 2.0, "horizontal_divisions": 6, "vertical_divisions": 3}"#,
        )
        .unwrap();
        assert_eq!(v.kind_name(), "object_path");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<Viewpoint, _> =
            serde_json::from_str(r#"{"kind": "orbit", "amount": 3}"#);
        assert!(result.is_err());
    }
}
