//! Scene operations
//!
//! Everything the generator needs from a 3D engine: cameras, lights, models,
//! materials and style renders. The generator only talks to a scene through
//! [`SceneOperations`], so a host engine and the software [`OfflineScene`]
//! are interchangeable.

mod camera;
mod mesh;
mod offline;

pub use camera::TrackingCamera;
pub use mesh::ModelMesh;
pub use offline::OfflineScene;

use std::path::{Path, PathBuf};

use glam::DVec3;
use rand::RngCore;
use thiserror::Error;

use crate::config::{Environment, Object, Render, RenderStyle, Texture, Viewpoint};
use crate::sampler::{self, LightInstance, ResolvedMaterial, ViewpointPaths};

/// Errors reported by a scene backend.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("unsupported model format {extension:?} for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to parse model {}: {reason}", .path.display())]
    ModelParse { path: PathBuf, reason: String },
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
    #[error("no camera has been positioned")]
    NoCamera,
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("scene I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Backend(String),
}

/// Handle to the world/environment created for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentHandle(pub u64);

/// Handle to a camera in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub u64);

/// Handle to a light in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle(pub u64);

/// Handle to a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Capabilities a 3D engine exposes to the dataset generator.
///
/// A scene value is owned by one generation run and driven from a single
/// thread. Camera placement, lights and material state persist between calls
/// until cleared.
pub trait SceneOperations {
    /// Set up the world the objects are rendered in.
    fn create_environment(&mut self, environment: &Environment) -> Result<EnvironmentHandle, SceneError>;

    /// Camera coordinates for every viewpoint, in input order.
    fn create_viewpoints(
        &mut self,
        viewpoints: &[Viewpoint],
        preview: bool,
        rng: &mut dyn RngCore,
    ) -> ViewpointPaths {
        sampler::sample(viewpoints, preview, rng)
    }

    /// Add a point light resolved for the current shot.
    fn create_light(&mut self, light: &LightInstance) -> Result<LightHandle, SceneError>;

    /// Import a model, fitting it into a cube of edge `dimension` when the
    /// object asks to be normalized.
    fn load_object(&mut self, object: &Object, dimension: f64) -> Result<ObjectHandle, SceneError>;

    /// Add a camera that keeps the origin in view.
    fn create_camera(&mut self) -> Result<CameraHandle, SceneError>;

    fn move_camera_to(&mut self, camera: CameraHandle, location: DVec3) -> Result<(), SceneError>;

    /// Render one style of the current shot into `output_dir`.
    fn render(
        &mut self,
        output_dir: &Path,
        style: RenderStyle,
        texture: Texture,
        object: ObjectHandle,
    ) -> Result<(), SceneError>;

    /// Remove every light from the scene.
    fn clear_lights(&mut self) -> Result<(), SceneError>;

    /// Apply resolved shader parameters to a model.
    fn load_material(&mut self, object: ObjectHandle, material: &ResolvedMaterial) -> Result<(), SceneError>;

    fn set_render_resolution(&mut self, render: &Render) -> Result<(), SceneError>;

    /// Texture the object is rendered with for the next coordinate.
    fn define_texture(&mut self, object: &Object, rng: &mut dyn RngCore) -> Texture {
        sampler::resolve_texture(object.material.texture(), rng)
    }

    /// Write the model, as currently placed in the scene, to `path`.
    fn export_normalized_object(&mut self, object: ObjectHandle, path: &Path) -> Result<(), SceneError>;

    /// Remove models, cameras and lights.
    fn clear_objects(&mut self) -> Result<(), SceneError>;
}
