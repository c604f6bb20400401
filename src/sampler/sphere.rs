//! UV sphere vertex generation for spherical camera paths

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::config::uv_sphere_vertex_count;

/// Vertices of a UV sphere centered on the origin, in generation order.
///
/// The sphere has diameter `size`, `horizontal` segments around the Z axis
/// and `vertical` segments from pole to pole. Order: top pole, then the
/// `vertical - 1` inner rings from top to bottom (each starting on +X and
/// turning counter-clockwise), then the bottom pole.
pub fn uv_sphere_vertices(size: f64, horizontal: u32, vertical: u32) -> Vec<DVec3> {
    let radius = size / 2.0;
    let rings = vertical.saturating_sub(1);
    let mut vertices = Vec::with_capacity(uv_sphere_vertex_count(horizontal, vertical));

    vertices.push(DVec3::new(0.0, 0.0, radius));

    for v in 1..=rings {
        // Polar angle measured from +Z
        let phi = (v as f64 / vertical as f64) * PI;
        let z = phi.cos() * radius;
        let ring_radius = phi.sin() * radius;

        for h in 0..horizontal {
            let theta = (h as f64 / horizontal as f64) * TAU;
            vertices.push(DVec3::new(
                theta.cos() * ring_radius,
                theta.sin() * ring_radius,
                z,
            ));
        }
    }

    vertices.push(DVec3::new(0.0, 0.0, -radius));
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertex_count() {
        let vertices = uv_sphere_vertices(2.0, 8, 4);
        // 8 * (4 - 1) ring vertices + 2 poles
        assert_eq!(vertices.len(), 26);
        assert_eq!(vertices.len(), uv_sphere_vertex_count(8, 4));
    }

    #[test]
    fn test_vertex_count_of_fine_sphere() {
        // Ring vertices alone exceed u32::MAX here
        assert_eq!(uv_sphere_vertex_count(100_000, 100_000), 100_000 * 99_999 + 2);
        assert_eq!(uv_sphere_vertices(2.0, 70_000, 2).len(), 70_002);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let vertices = uv_sphere_vertices(3.0, 12, 6);
        for vertex in &vertices {
            assert!((vertex.length() - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sphere_poles_and_order() {
        let vertices = uv_sphere_vertices(2.0, 4, 2);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0], DVec3::new(0.0, 0.0, 1.0));
        assert_eq!(vertices[5], DVec3::new(0.0, 0.0, -1.0));
        // Equator ring starts on +X
        assert!((vertices[1] - DVec3::X).length() < 1e-9);
        assert!((vertices[2] - DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_sphere_is_deterministic() {
        assert_eq!(uv_sphere_vertices(2.0, 10, 10), uv_sphere_vertices(2.0, 10, 10));
    }
}
