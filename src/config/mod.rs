//! Configuration model
//!
//! Value types describing one dataset generation run: the normalization
//! environment, the objects to render, lights, camera viewpoints and render
//! output. A [`Config`] is validated once at construction and read-only after.

mod io;
mod light;
mod material;
mod render;
mod viewpoint;

pub use io::{deserialize, load, serialize};
pub use light::{Light, Rgb};
pub use material::{Material, Texture};
pub use render::{Backend, Lighting, MaterialOverride, Render, RenderStyle, StyleSetup};
pub use viewpoint::{uv_sphere_vertex_count, Viewpoint, MIN_SPHERE_DIVISIONS};

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building, reading or writing a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("malformed configuration: {0}")]
    Structural(#[from] serde_json::Error),
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounding volume objects are normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Edge length of the cube centered on the origin
    pub dimension: f64,
}

impl Environment {
    pub fn new(dimension: f64) -> Result<Self, ConfigError> {
        let environment = Self { dimension };
        environment.validate()?;
        Ok(environment)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.dimension.is_finite() || self.dimension <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "environment dimension must be positive, got {}",
                self.dimension
            )));
        }
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self { dimension: 1.0 }
    }
}

fn default_normalize() -> bool {
    true
}

/// A model to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Unique name, used as the output folder name
    pub name: String,
    /// Source model file
    pub path: PathBuf,
    /// Material applied while rendering
    pub material: Material,
    /// Fit the model into the environment before rendering
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

impl Object {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        material: Material,
        normalize: bool,
    ) -> Result<Self, ConfigError> {
        let object = Self {
            name: name.into(),
            path: path.into(),
            material,
            normalize,
        };
        object.validate()?;
        Ok(object)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "object name {:?} cannot be used as a folder name",
                self.name
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "object {:?} has no model path",
                self.name
            )));
        }
        if self.path.to_str().is_none() {
            return Err(ConfigError::Validation(format!(
                "object {:?} has a model path that is not valid UTF-8: {}",
                self.name,
                self.path.display()
            )));
        }
        self.material.validate()
    }
}

/// A complete, validated generation run description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    environment: Environment,
    render: Render,
    objects: Vec<Object>,
    lights: Vec<Light>,
    viewpoints: Vec<Viewpoint>,
}

impl Config {
    /// Validate and assemble a configuration.
    pub fn new(
        environment: Environment,
        mut render: Render,
        objects: Vec<Object>,
        lights: Vec<Light>,
        viewpoints: Vec<Viewpoint>,
    ) -> Result<Self, ConfigError> {
        if objects.is_empty() {
            return Err(ConfigError::Validation("objects is empty!".to_string()));
        }
        if lights.is_empty() {
            return Err(ConfigError::Validation("lights is empty!".to_string()));
        }
        if viewpoints.is_empty() {
            return Err(ConfigError::Validation("viewpoints is empty!".to_string()));
        }

        environment.validate()?;
        render.dedup_styles();
        render.validate()?;

        let mut names = HashSet::new();
        for object in &objects {
            object.validate()?;
            if !names.insert(object.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "object name {:?} is used more than once",
                    object.name
                )));
            }
        }
        for light in &lights {
            light.validate()?;
        }
        for viewpoint in &viewpoints {
            viewpoint.validate()?;
        }

        Ok(Self {
            environment,
            render,
            objects,
            lights,
            viewpoints,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn render(&self) -> &Render {
        &self.render
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Root output directory.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.render.output_dir_path)
    }

    /// Coordinates rendered per object.
    pub fn coordinates_per_object(&self, preview: bool) -> usize {
        if preview {
            return 1;
        }
        self.viewpoints.iter().map(Viewpoint::point_count).sum()
    }

    /// Images written per object.
    pub fn images_per_object(&self, preview: bool) -> usize {
        self.coordinates_per_object(preview) * self.render.styles.len()
    }

    /// Starter configuration mirroring the add-on panel defaults.
    pub fn example() -> Self {
        let object = Object {
            name: "sample".to_string(),
            path: PathBuf::from("model.obj"),
            material: Material::static_texture_dynamic_params(Texture::Random),
            normalize: true,
        };
        let light = Light::Dynamic {
            color: [1.0, 1.0, 1.0],
            max_range: 5.0,
            max_energy: 10.0,
        };
        let viewpoint = Viewpoint::DynamicCamera {
            amount: 100,
            max_range: 5.0,
        };
        let render = Render {
            resolution_x: 128,
            resolution_y: 128,
            output_dir_path: "output".to_string(),
            styles: RenderStyle::all().to_vec(),
        };

        Self {
            environment: Environment::default(),
            render,
            objects: vec![object],
            lights: vec![light],
            viewpoints: vec![viewpoint],
        }
    }
}
