//! Camera that always tracks the origin

use glam::{DVec3, Mat4, Vec3};

/// Perspective camera aimed at the origin from an arbitrary location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingCamera {
    /// Eye position in world space
    location: Vec3,
    /// Vertical field of view in radians
    fov: f32,
    /// Near clipping plane
    near: f32,
    /// Far clipping plane
    far: f32,
}

impl TrackingCamera {
    pub fn new() -> Self {
        Self {
            location: Vec3::new(0.0, -5.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            near: 0.01,
            far: 1000.0,
        }
    }

    pub fn set_location(&mut self, location: DVec3) {
        self.location = location.as_vec3();
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        // Z is up; fall back to Y when looking straight down or up a pole
        let forward = -self.location.normalize_or_zero();
        let up = if forward.cross(Vec3::Z).length_squared() < 1e-6 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        Mat4::look_at_rh(self.location, Vec3::ZERO, up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for TrackingCamera {
    fn default() -> Self {
        Self::new()
    }
}
