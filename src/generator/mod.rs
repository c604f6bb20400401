//! Dataset generation
//!
//! Drives a [`SceneOperations`] backend through the per-object pipeline:
//!
//! 1. set up the world, a camera and the camera coordinates, load the model
//!    and create the object folder;
//! 2. export the normalized model when the object is normalized;
//! 3. for every coordinate: move the camera, place lights, create the index
//!    folder, set the resolution, resolve texture and material, render each
//!    style, record a CSV row and clear the lights;
//! 4. write the CSV index and clear the scene.
//!
//! Objects run strictly one after another. A failed object is cleaned up and
//! either stops the run or is skipped, depending on [`FailurePolicy`].

mod progress;
mod worker;

pub use progress::{GenerationProgress, GenerationReport, ObjectReport, ProgressEvent, SkippedObject};
pub use worker::{GenerationWorker, WorkerEvent};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::{Config, Object};
use crate::output::{CsvIndex, OutputLayout};
use crate::sampler;
use crate::scene::{SceneError, SceneOperations};

/// Errors that stop an object's pipeline.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("object {object}: {source}")]
    Scene {
        object: String,
        #[source]
        source: SceneError,
    },
    #[error("object {object}: output folder {} already exists", .path.display())]
    OutputExists { object: String, path: PathBuf },
    #[error("object {object}: failed to write {}: {source}", .path.display())]
    Io {
        object: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("generation cancelled while processing {object}")]
    Cancelled { object: String },
    #[error("generation worker panicked")]
    WorkerPanicked,
}

impl GenerationError {
    /// Name of the object whose pipeline failed.
    pub fn object(&self) -> Option<&str> {
        match self {
            GenerationError::Scene { object, .. }
            | GenerationError::OutputExists { object, .. }
            | GenerationError::Io { object, .. }
            | GenerationError::Cancelled { object } => Some(object),
            GenerationError::WorkerPanicked => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled { .. })
    }
}

/// What happens to the rest of the run when an object fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop and return the error
    #[default]
    Abort,
    /// Record the failure and continue with the next object
    SkipObject,
}

/// Run options that are not part of the dataset description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Render a single coordinate per object
    pub preview: bool,
    pub failure_policy: FailurePolicy,
    /// Seed for every random draw; entropy from the OS when unset
    pub seed: Option<u64>,
}

/// Generates the dataset described by a [`Config`] with one scene backend.
pub struct DatasetGenerator<S: SceneOperations> {
    config: Config,
    scene: S,
    options: GenerationOptions,
    cancel: Arc<AtomicBool>,
}

impl<S: SceneOperations> DatasetGenerator<S> {
    pub fn new(config: Config, scene: S, options: GenerationOptions) -> Self {
        Self {
            config,
            scene,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned cancel flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Generate every object.
    pub fn run(&mut self) -> Result<GenerationReport, GenerationError> {
        self.run_with_progress(|_| {})
    }

    /// Generate every object, reporting progress as it goes.
    pub fn run_with_progress<F>(&mut self, mut progress: F) -> Result<GenerationReport, GenerationError>
    where
        F: FnMut(ProgressEvent),
    {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let output_dir = self.config.output_dir();
        let total = self.config.objects().len();
        log::info!(
            "Generating {} object(s), {} image(s) each, into {}",
            total,
            self.config.images_per_object(self.options.preview),
            output_dir.display()
        );

        let mut report = GenerationReport::new(output_dir);

        for (position, object) in self.config.objects().iter().enumerate() {
            progress(ProgressEvent::ObjectStarted {
                name: object.name.clone(),
                position,
                total,
            });

            let mut run = ObjectRun {
                config: &self.config,
                scene: &mut self.scene,
                object,
                preview: self.options.preview,
                cancel: &self.cancel,
                rng: &mut rng,
                progress: &mut progress,
            };

            match run.generate() {
                Ok(object_report) => {
                    log::info!(
                        "Finished {}: {} coordinate(s), {} image(s)",
                        object.name,
                        object_report.rows,
                        object_report.images
                    );
                    progress(ProgressEvent::ObjectCompleted(object_report.clone()));
                    report.objects.push(object_report);
                }
                Err(err) => {
                    clear_after_failure(&mut self.scene, &object.name);

                    if err.is_cancelled() || self.options.failure_policy == FailurePolicy::Abort {
                        log::error!("Generation stopped: {}", err);
                        return Err(err);
                    }

                    log::warn!("Skipping {}: {}", object.name, err);
                    let error = err.to_string();
                    progress(ProgressEvent::ObjectSkipped {
                        name: object.name.clone(),
                        error: error.clone(),
                    });
                    report.skipped.push(SkippedObject {
                        name: object.name.clone(),
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Best-effort scene reset after a failed object.
fn clear_after_failure<S: SceneOperations>(scene: &mut S, object: &str) {
    if let Err(e) = scene.clear_lights() {
        log::warn!("Failed to clear lights after {} failed: {}", object, e);
    }
    if let Err(e) = scene.clear_objects() {
        log::warn!("Failed to clear objects after {} failed: {}", object, e);
    }
}

/// State for generating a single object.
struct ObjectRun<'a, S: SceneOperations> {
    config: &'a Config,
    scene: &'a mut S,
    object: &'a Object,
    preview: bool,
    cancel: &'a AtomicBool,
    rng: &'a mut StdRng,
    progress: &'a mut dyn FnMut(ProgressEvent),
}

impl<S: SceneOperations> ObjectRun<'_, S> {
    fn generate(&mut self) -> Result<ObjectReport, GenerationError> {
        let config = self.config;
        let object = self.object;
        let environment = config.environment();

        // Setup
        self.check_cancelled()?;
        self.scene
            .create_environment(environment)
            .map_err(|e| self.scene_error(e))?;
        let camera = self.scene.create_camera().map_err(|e| self.scene_error(e))?;
        let paths = self
            .scene
            .create_viewpoints(config.viewpoints(), self.preview, &mut *self.rng);
        let handle = self
            .scene
            .load_object(object, environment.dimension)
            .map_err(|e| self.scene_error(e))?;

        let layout = OutputLayout::new(&config.output_dir(), &object.name);
        layout
            .create_object_dir()
            .map_err(|e| self.output_error(layout.object_dir(), e))?;

        if object.normalize {
            self.check_cancelled()?;
            self.scene
                .export_normalized_object(handle, &layout.normalized_model_path())
                .map_err(|e| self.scene_error(e))?;
        }

        let total: usize = paths.iter().map(Vec::len).sum();
        let styles = &config.render().styles;
        let mut csv = CsvIndex::new();
        let mut images = 0;

        for (index, location) in paths.iter().flatten().enumerate() {
            self.check_cancelled()?;
            log::debug!("{} coordinate {}/{} at {}", object.name, index + 1, total, location);

            self.scene
                .move_camera_to(camera, *location)
                .map_err(|e| self.scene_error(e))?;

            for light in config.lights() {
                let instance = sampler::resolve_light(light, &mut *self.rng);
                self.scene
                    .create_light(&instance)
                    .map_err(|e| self.scene_error(e))?;
            }

            let index_dir = layout
                .create_index_dir(index)
                .map_err(|e| self.output_error(&layout.index_dir(index), e))?;

            self.scene
                .set_render_resolution(config.render())
                .map_err(|e| self.scene_error(e))?;

            let texture = self.scene.define_texture(object, &mut *self.rng);
            let material = sampler::resolve_material(&object.material, texture, &mut *self.rng);
            self.scene
                .load_material(handle, &material)
                .map_err(|e| self.scene_error(e))?;

            for style in styles {
                self.scene
                    .render(&index_dir, *style, texture, handle)
                    .map_err(|e| self.scene_error(e))?;
                images += 1;
            }

            csv.push(index, *location, texture);

            self.scene.clear_lights().map_err(|e| self.scene_error(e))?;

            (self.progress)(ProgressEvent::CoordinateRendered {
                object: object.name.clone(),
                index,
                total,
            });
        }

        // Teardown
        let csv_path = layout.csv_path();
        csv.save(&csv_path).map_err(|e| self.output_error(&csv_path, e))?;
        self.scene.clear_objects().map_err(|e| self.scene_error(e))?;

        Ok(ObjectReport {
            name: object.name.clone(),
            object_dir: layout.object_dir().to_path_buf(),
            rows: csv.len(),
            images,
        })
    }

    fn check_cancelled(&self) -> Result<(), GenerationError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(GenerationError::Cancelled {
                object: self.object.name.clone(),
            });
        }
        Ok(())
    }

    fn scene_error(&self, source: SceneError) -> GenerationError {
        GenerationError::Scene {
            object: self.object.name.clone(),
            source,
        }
    }

    fn output_error(&self, path: &Path, source: io::Error) -> GenerationError {
        let object = self.object.name.clone();
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::AlreadyExists {
            GenerationError::OutputExists { object, path }
        } else {
            GenerationError::Io { object, path, source }
        }
    }
}
