//! Multiview Gen - multiview image dataset generation
//!
//! Places cameras around 3D models, lights them and renders each camera
//! coordinate in several styles (plain, silhouette, texture segmentation,
//! ray-traced, rasterized). Every model gets its own folder of per-coordinate
//! images plus a CSV index of camera locations and textures.
//!
//! The 3D engine sits behind [`scene::SceneOperations`]; [`scene::OfflineScene`]
//! is a software backend that needs no host application.

pub mod config;
pub mod generator;
pub mod logging;
pub mod output;
pub mod sampler;
pub mod scene;

pub use config::{Config, ConfigError};
pub use generator::{
    DatasetGenerator, FailurePolicy, GenerationError, GenerationOptions, GenerationReport,
    GenerationWorker, WorkerEvent,
};
pub use scene::{OfflineScene, SceneError, SceneOperations};
