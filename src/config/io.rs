//! JSON config files
//!
//! Configs are written with sorted keys so the same config always produces
//! the same file. Reading goes through [`ConfigFile`] so a missing key is
//! reported as a structural error and a failed invariant as a validation error.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Config, ConfigError, Environment, Light, Object, Render, Viewpoint};

/// On-disk shape of a config, before validation.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    environment: Environment,
    render: Render,
    objects: Vec<Object>,
    lights: Vec<Light>,
    viewpoints: Vec<Viewpoint>,
}

/// Encode a config as pretty, key-sorted JSON, writing it to `path` if given.
pub fn serialize(config: &Config, path: Option<&Path>) -> Result<String, ConfigError> {
    // serde_json::Map is a BTreeMap here, so converting through Value sorts keys
    let value = serde_json::to_value(config)?;
    let json = serde_json::to_string_pretty(&value)?;

    if let Some(path) = path {
        fs::write(path, &json)?;
        log::info!("Saved config to {:?}", path);
    }

    Ok(json)
}

/// Decode and validate a config from JSON text.
pub fn deserialize(text: &str) -> Result<Config, ConfigError> {
    let file: ConfigFile = serde_json::from_str(text)?;
    Config::new(
        file.environment,
        file.render,
        file.objects,
        file.lights,
        file.viewpoints,
    )
}

/// Read and validate a config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let json = fs::read_to_string(path)?;
    let config = deserialize(&json)?;
    log::info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Material, RenderStyle, Texture};
    use glam::DVec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn full_config() -> Config {
        Config::new(
            Environment::new(2.5).unwrap(),
            Render::new(
                256,
                128,
                "dataset",
                vec![RenderStyle::RayTraced, RenderStyle::Silhouette],
            )
            .unwrap(),
            vec![
                Object::new(
                    "bunny",
                    "models/bunny.obj",
                    Material::static_texture_and_params(Texture::Gold, 0.9, 0.5, 0.125).unwrap(),
                    true,
                )
                .unwrap(),
                Object::new(
                    "teapot",
                    "models/teapot.obj",
                    Material::dynamic_texture_and_params(),
                    false,
                )
                .unwrap(),
            ],
            vec![
                Light::static_light([1.0, 0.25, 0.0], DVec3::new(1.0, -2.0, 3.5), 7.0).unwrap(),
                Light::dynamic_light([0.1, 0.2, 0.3], 4.0, 12.0).unwrap(),
                Light::rainbow_static_light(DVec3::new(0.0, 0.0, 5.0), 3.0).unwrap(),
                Light::rainbow_dynamic_light(6.0, 10.0).unwrap(),
            ],
            vec![
                Viewpoint::static_camera(DVec3::new(1.0, 2.0, 3.0), 4).unwrap(),
                Viewpoint::dynamic_camera(10, 5.5).unwrap(),
                Viewpoint::spherical_path(3.0, 12, 6).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let config = full_config();
        let json = serialize(&config, None).unwrap();
        let restored = deserialize(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_serialize_is_deterministic_and_sorted() {
        let config = full_config();
        let first = serialize(&config, None).unwrap();
        let second = serialize(&config, None).unwrap();
        assert_eq!(first, second);

        let environment = first.find("\"environment\"").unwrap();
        let lights = first.find("\"lights\"").unwrap();
        let objects = first.find("\"objects\"").unwrap();
        let render = first.find("\"render\"").unwrap();
        let viewpoints = first.find("\"viewpoints\"").unwrap();
        assert!(environment < lights && lights < objects);
        assert!(objects < render && render < viewpoints);
    }

    fn random_config(rng: &mut StdRng) -> Config {
        let mut unit = || rng.random_range(0.0..=1.0);
        let color = [unit(), unit(), unit()];
        let params = (unit(), unit(), unit());
        let location = DVec3::new(
            rng.random_range(-100.0..100.0),
            rng.random_range(-100.0..100.0),
            rng.random_range(-100.0..100.0),
        );
        let energy = rng.random_range(0.0..100.0);
        let range = rng.random_range(0.0..50.0);

        Config::new(
            Environment::new(rng.random_range(0.001..50.0)).unwrap(),
            Render::new(64, 64, "dataset", vec![RenderStyle::Normal]).unwrap(),
            vec![Object::new(
                "model",
                "model.obj",
                Material::static_texture_and_params(Texture::Wood, params.0, params.1, params.2).unwrap(),
                true,
            )
            .unwrap()],
            vec![
                Light::static_light(color, location, energy).unwrap(),
                Light::dynamic_light(color, range, energy).unwrap(),
                Light::rainbow_static_light(location, energy).unwrap(),
            ],
            vec![
                Viewpoint::static_camera(location, 1).unwrap(),
                Viewpoint::dynamic_camera(3, range).unwrap(),
                Viewpoint::spherical_path(rng.random_range(0.01..20.0), 8, 4).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_arbitrary_floats() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..2000 {
            let config = random_config(&mut rng);
            let restored = deserialize(&serialize(&config, None).unwrap()).unwrap();
            assert_eq!(restored, config);
        }
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = full_config();
        serialize(&config, Some(&path)).unwrap();
        assert_eq!(load(&path).unwrap(), config);
    }

    #[test]
    fn test_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("config.json");
        let result = serialize(&full_config(), Some(&path));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_missing_key_is_structural() {
        let mut value = serde_json::to_value(full_config()).unwrap();
        value.as_object_mut().unwrap().remove("render");
        let result = deserialize(&value.to_string());
        assert!(matches!(result, Err(ConfigError::Structural(_))));
    }

    #[test]
    fn test_empty_lights_is_validation() {
        let mut value = serde_json::to_value(full_config()).unwrap();
        value["lights"] = serde_json::json!([]);
        let result = deserialize(&value.to_string());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_out_of_range_color_is_validation() {
        let mut value = serde_json::to_value(full_config()).unwrap();
        value["lights"][0]["color"] = serde_json::json!([2.0, 0.0, 0.0]);
        let result = deserialize(&value.to_string());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_reads_addon_field_names() {
        let json = r#"{
            "environment": {"dimension": 1},
            "objects": [{
                "name": "sample",
                "path": "model.obj",
                "normalize": true,
                "material": {"kind": "static_dynamic", "texture": "random"}
            }],
            "lights": [{"kind": "dynamic", "color": [1, 1, 1], "max_range": 5, "max_energy": 10}],
            "viewpoints": [{"kind": "dynamic_camera", "amount": 100, "max_range": 5}],
            "render": {
                "resolution_x": 128,
                "resolution_y": 128,
                "output_dir_path": "out",
                "styles": ["normal", "silhouette", "texture-segmentation", "ray-traced", "rastered"]
            }
        }"#;
        let config = deserialize(json).unwrap();
        assert_eq!(config.render().styles.len(), 5);
        assert_eq!(config.objects()[0].material.texture(), Texture::Random);
    }
}
