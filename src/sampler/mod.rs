//! Viewpoint and per-shot sampling
//!
//! Turns viewpoint settings into camera coordinates and resolves the
//! randomized parts of lights and materials for a single shot. Every random
//! draw goes through a caller-supplied [`Rng`] so runs can be seeded.

mod sphere;

pub use sphere::uv_sphere_vertices;

use glam::DVec3;
use rand::Rng;

use crate::config::{Light, Material, Rgb, Texture, Viewpoint};

/// Camera coordinates for every viewpoint, in input order.
pub type ViewpointPaths = Vec<Vec<DVec3>>;

/// Sample the coordinates of every viewpoint.
///
/// With `preview` set, only the first coordinate of the first viewpoint is
/// kept so a single representative shot gets rendered.
pub fn sample<R: Rng + ?Sized>(viewpoints: &[Viewpoint], preview: bool, rng: &mut R) -> ViewpointPaths {
    let paths: ViewpointPaths = viewpoints
        .iter()
        .map(|viewpoint| sample_viewpoint(viewpoint, rng))
        .collect();

    if preview {
        return collapse_to_preview(paths);
    }
    paths
}

/// Coordinates for a single viewpoint.
pub fn sample_viewpoint<R: Rng + ?Sized>(viewpoint: &Viewpoint, rng: &mut R) -> Vec<DVec3> {
    match *viewpoint {
        Viewpoint::StaticCamera { location, amount } => vec![location; amount as usize],
        Viewpoint::DynamicCamera { amount, max_range } => (0..amount)
            .map(|_| random_point(rng, max_range))
            .collect(),
        Viewpoint::SphericalPath {
            size,
            horizontal_divisions,
            vertical_divisions,
        } => uv_sphere_vertices(size, horizontal_divisions, vertical_divisions),
    }
}

fn collapse_to_preview(paths: ViewpointPaths) -> ViewpointPaths {
    match paths.into_iter().flatten().next() {
        Some(first) => vec![vec![first]],
        None => Vec::new(),
    }
}

/// A point with every coordinate uniform in `[-max_range, max_range]`.
///
/// Draws on the unit interval and scales, since the width of
/// `-max_range..=max_range` is not finite for ranges near `f64::MAX`.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, max_range: f64) -> DVec3 {
    DVec3::new(
        max_range * rng.random_range(-1.0..=1.0),
        max_range * rng.random_range(-1.0..=1.0),
        max_range * rng.random_range(-1.0..=1.0),
    )
}

/// A color with every channel uniform in `[0, 1]`.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    [
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    ]
}

/// Pick the texture for one shot; `Random` becomes one of the concrete textures.
pub fn resolve_texture<R: Rng + ?Sized>(texture: Texture, rng: &mut R) -> Texture {
    if !texture.is_random() {
        return texture;
    }
    let choices = Texture::concrete();
    choices[rng.random_range(0..choices.len())]
}

/// A light as placed in the scene for one shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInstance {
    pub color: Rgb,
    pub location: DVec3,
    pub energy: f64,
}

/// Resolve color, location and energy of a light for one shot.
pub fn resolve_light<R: Rng + ?Sized>(light: &Light, rng: &mut R) -> LightInstance {
    match *light {
        Light::Static {
            color,
            location,
            max_energy,
        } => LightInstance {
            color,
            location,
            energy: max_energy,
        },
        Light::Dynamic {
            color,
            max_range,
            max_energy,
        } => LightInstance {
            color,
            location: random_point(rng, max_range),
            energy: rng.random_range(0.0..=max_energy),
        },
        Light::RainbowStatic {
            location,
            max_energy,
        } => LightInstance {
            color: random_color(rng),
            location,
            energy: max_energy,
        },
        Light::RainbowDynamic {
            max_range,
            max_energy,
        } => LightInstance {
            color: random_color(rng),
            location: random_point(rng, max_range),
            energy: rng.random_range(0.0..=max_energy),
        },
    }
}

/// Material parameters applied to the model for one shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMaterial {
    pub texture: Texture,
    pub metallic: f64,
    pub specular: f64,
    pub roughness: f64,
}

/// Fix the shader parameters of a material for one shot.
///
/// `texture` is the already resolved texture of the shot, so every style of
/// a coordinate shares it.
pub fn resolve_material<R: Rng + ?Sized>(
    material: &Material,
    texture: Texture,
    rng: &mut R,
) -> ResolvedMaterial {
    let (metallic, specular, roughness) = material.fixed_params().unwrap_or_else(|| {
        (
            rng.random_range(0.0..=1.0),
            rng.random_range(0.0..=1.0),
            rng.random_range(0.0..=1.0),
        )
    });
    ResolvedMaterial {
        texture,
        metallic,
        specular,
        roughness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_static_camera_repeats_location() {
        let viewpoint = Viewpoint::static_camera(DVec3::new(1.0, 2.0, 3.0), 4).unwrap();
        let paths = sample(&[viewpoint], false, &mut rng());
        assert_eq!(paths, vec![vec![DVec3::new(1.0, 2.0, 3.0); 4]]);
    }

    #[test]
    fn test_dynamic_camera_within_range() {
        let viewpoint = Viewpoint::dynamic_camera(200, 2.5).unwrap();
        let paths = sample(&[viewpoint], false, &mut rng());
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 200);
        for point in &paths[0] {
            for c in point.to_array() {
                assert!((-2.5..=2.5).contains(&c));
            }
        }
    }

    #[test]
    fn test_dynamic_camera_huge_range_stays_finite() {
        let max_range = 1e308;
        let viewpoint = Viewpoint::dynamic_camera(50, max_range).unwrap();
        let paths = sample(&[viewpoint], false, &mut rng());
        assert_eq!(paths[0].len(), 50);
        for point in &paths[0] {
            assert!(point.is_finite());
            assert!(point.abs().max_element() <= max_range);
        }

        let light = Light::dynamic_light([1.0, 1.0, 1.0], f64::MAX, 10.0).unwrap();
        let instance = resolve_light(&light, &mut rng());
        assert!(instance.location.is_finite());
    }

    #[test]
    fn test_dynamic_camera_seeded_is_reproducible() {
        let viewpoint = Viewpoint::dynamic_camera(5, 3.0).unwrap();
        let a = sample(&[viewpoint], false, &mut rng());
        let b = sample(&[viewpoint], false, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_range_collapses_to_origin() {
        let viewpoint = Viewpoint::dynamic_camera(3, 0.0).unwrap();
        let paths = sample(&[viewpoint], false, &mut rng());
        assert!(paths[0].iter().all(|p| *p == DVec3::ZERO));
    }

    #[test]
    fn test_paths_keep_viewpoint_order() {
        let viewpoints = [
            Viewpoint::spherical_path(2.0, 6, 3).unwrap(),
            Viewpoint::static_camera(DVec3::new(4.0, 0.0, 0.0), 2).unwrap(),
        ];
        let paths = sample(&viewpoints, false, &mut rng());
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 6 * 2 + 2);
        assert_eq!(paths[1], vec![DVec3::new(4.0, 0.0, 0.0); 2]);
    }

    #[test]
    fn test_preview_keeps_first_point_of_first_viewpoint() {
        let viewpoints = [
            Viewpoint::static_camera(DVec3::new(1.0, 2.0, 3.0), 4).unwrap(),
            Viewpoint::dynamic_camera(10, 5.0).unwrap(),
        ];
        let paths = sample(&viewpoints, true, &mut rng());
        assert_eq!(paths, vec![vec![DVec3::new(1.0, 2.0, 3.0)]]);

        let sphere = [Viewpoint::spherical_path(2.0, 8, 4).unwrap()];
        let paths = sample(&sphere, true, &mut rng());
        assert_eq!(paths, vec![vec![DVec3::new(0.0, 0.0, 1.0)]]);
    }

    #[test]
    fn test_random_texture_resolves_to_concrete() {
        let mut rng = rng();
        for _ in 0..100 {
            let texture = resolve_texture(Texture::Random, &mut rng);
            assert!(Texture::concrete().contains(&texture));
        }
        assert_eq!(resolve_texture(Texture::Wood, &mut rng), Texture::Wood);
    }

    #[test]
    fn test_light_resolution_per_kind() {
        let mut rng = rng();
        let location = DVec3::new(0.0, 0.0, 5.0);

        let fixed = Light::static_light([0.2, 0.4, 0.6], location, 8.0).unwrap();
        let instance = resolve_light(&fixed, &mut rng);
        assert_eq!(
            instance,
            LightInstance {
                color: [0.2, 0.4, 0.6],
                location,
                energy: 8.0
            }
        );

        let rainbow = Light::rainbow_static_light(location, 3.0).unwrap();
        let instance = resolve_light(&rainbow, &mut rng);
        assert_eq!(instance.location, location);
        assert_eq!(instance.energy, 3.0);
        assert!(instance.color.iter().all(|c| (0.0..=1.0).contains(c)));

        let moving = Light::rainbow_dynamic_light(2.0, 4.0).unwrap();
        for _ in 0..50 {
            let instance = resolve_light(&moving, &mut rng);
            assert!(instance.location.abs().max_element() <= 2.0);
            assert!((0.0..=4.0).contains(&instance.energy));
        }
    }

    #[test]
    fn test_material_resolution() {
        let mut rng = rng();
        let fixed = Material::static_texture_and_params(Texture::Gold, 0.9, 0.5, 0.1).unwrap();
        let resolved = resolve_material(&fixed, Texture::Gold, &mut rng);
        assert_eq!((resolved.metallic, resolved.specular, resolved.roughness), (0.9, 0.5, 0.1));

        let dynamic = Material::dynamic_texture_and_params();
        let resolved = resolve_material(&dynamic, Texture::Marble, &mut rng);
        assert_eq!(resolved.texture, Texture::Marble);
        assert!((0.0..=1.0).contains(&resolved.roughness));
    }
}
