//! Background generation worker
//!
//! Runs a [`DatasetGenerator`] on its own thread. The thread owns the scene
//! for the whole run; the caller observes it through [`WorkerEvent`]s and can
//! ask it to stop between coordinates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{DatasetGenerator, GenerationError, GenerationOptions, GenerationReport, ProgressEvent};
use crate::config::Config;
use crate::scene::SceneOperations;

/// Events from the worker thread.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Worker picked up the run
    Started { objects: usize },
    /// Progress inside the run
    Progress(ProgressEvent),
    /// Run completed
    Completed(GenerationReport),
    /// Run stopped with an error
    Failed(String),
    /// Run was cancelled
    Cancelled,
}

/// Handle to a generation run on a background thread.
pub struct GenerationWorker {
    cancel: Arc<AtomicBool>,
    event_rx: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<Result<GenerationReport, GenerationError>>>,
}

impl GenerationWorker {
    /// Start generating `config` with `scene` on a new thread.
    pub fn spawn<S>(config: Config, scene: S, options: GenerationOptions) -> std::io::Result<Self>
    where
        S: SceneOperations + Send + 'static,
    {
        let (event_tx, event_rx) = unbounded::<WorkerEvent>();
        let cancel = Arc::new(AtomicBool::new(false));
        let generator = DatasetGenerator::new(config, scene, options).with_cancel_flag(Arc::clone(&cancel));

        let handle = thread::Builder::new()
            .name("dataset-generator".to_string())
            .spawn(move || Self::worker_loop(generator, event_tx))?;

        Ok(Self {
            cancel,
            event_rx,
            handle: Some(handle),
        })
    }

    /// Worker thread main body.
    fn worker_loop<S: SceneOperations>(
        mut generator: DatasetGenerator<S>,
        event_tx: Sender<WorkerEvent>,
    ) -> Result<GenerationReport, GenerationError> {
        let objects = generator.config().objects().len();
        let _ = event_tx.send(WorkerEvent::Started { objects });

        let progress_tx = event_tx.clone();
        let result = generator.run_with_progress(move |event| {
            let _ = progress_tx.send(WorkerEvent::Progress(event));
        });

        let event = match &result {
            Ok(report) => WorkerEvent::Completed(report.clone()),
            Err(err) if err.is_cancelled() => WorkerEvent::Cancelled,
            Err(err) => WorkerEvent::Failed(err.to_string()),
        };
        let _ = event_tx.send(event);
        result
    }

    /// Ask the run to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Poll for worker events (non-blocking).
    pub fn poll_events(&self) -> Vec<WorkerEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Event stream for blocking consumers. Ends once the worker exits.
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.event_rx
    }

    /// Wait for the run to finish.
    pub fn join(mut self) -> Result<GenerationReport, GenerationError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| GenerationError::WorkerPanicked)?,
            None => Err(GenerationError::WorkerPanicked),
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Environment, Light, Material, Object, Render, RenderStyle, Texture, Viewpoint,
    };
    use crate::sampler::{LightInstance, ResolvedMaterial};
    use crate::scene::{
        CameraHandle, EnvironmentHandle, LightHandle, ObjectHandle, OfflineScene, SceneError,
    };
    use glam::DVec3;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// What the scene looked like when the worker let go of it.
    #[derive(Default)]
    struct SceneState {
        objects_cleared: AtomicBool,
        live_lights: AtomicUsize,
    }

    /// Offline scene that holds every camera move after the first until the
    /// gate opens.
    struct GatedScene {
        inner: OfflineScene,
        gate: Receiver<()>,
        moves: usize,
        state: Arc<SceneState>,
    }

    impl GatedScene {
        fn sync_lights(&self) {
            self.state
                .live_lights
                .store(self.inner.light_count(), Ordering::SeqCst);
        }
    }

    impl SceneOperations for GatedScene {
        fn create_environment(&mut self, environment: &Environment) -> Result<EnvironmentHandle, SceneError> {
            self.inner.create_environment(environment)
        }

        fn create_light(&mut self, light: &LightInstance) -> Result<LightHandle, SceneError> {
            let handle = self.inner.create_light(light)?;
            self.sync_lights();
            Ok(handle)
        }

        fn load_object(&mut self, object: &Object, dimension: f64) -> Result<ObjectHandle, SceneError> {
            self.inner.load_object(object, dimension)
        }

        fn create_camera(&mut self) -> Result<CameraHandle, SceneError> {
            self.inner.create_camera()
        }

        fn move_camera_to(&mut self, camera: CameraHandle, location: DVec3) -> Result<(), SceneError> {
            self.moves += 1;
            if self.moves > 1 {
                // Opens on a send or when the sender is dropped
                let _ = self.gate.recv();
            }
            self.inner.move_camera_to(camera, location)
        }

        fn render(
            &mut self,
            output_dir: &Path,
            style: RenderStyle,
            texture: Texture,
            object: ObjectHandle,
        ) -> Result<(), SceneError> {
            self.inner.render(output_dir, style, texture, object)
        }

        fn clear_lights(&mut self) -> Result<(), SceneError> {
            self.inner.clear_lights()?;
            self.sync_lights();
            Ok(())
        }

        fn load_material(&mut self, object: ObjectHandle, material: &ResolvedMaterial) -> Result<(), SceneError> {
            self.inner.load_material(object, material)
        }

        fn set_render_resolution(&mut self, render: &Render) -> Result<(), SceneError> {
            self.inner.set_render_resolution(render)
        }

        fn export_normalized_object(&mut self, object: ObjectHandle, path: &Path) -> Result<(), SceneError> {
            self.inner.export_normalized_object(object, path)
        }

        fn clear_objects(&mut self) -> Result<(), SceneError> {
            self.inner.clear_objects()?;
            self.state.objects_cleared.store(true, Ordering::SeqCst);
            self.sync_lights();
            Ok(())
        }
    }

    fn is_rendered(event: &WorkerEvent) -> bool {
        matches!(event, WorkerEvent::Progress(ProgressEvent::CoordinateRendered { .. }))
    }

    fn config(output_dir: &std::path::Path, model: &std::path::Path, amount: u32) -> Config {
        Config::new(
            Environment::default(),
            Render::new(16, 16, output_dir.to_string_lossy(), vec![RenderStyle::Silhouette]).unwrap(),
            vec![Object::new("cube", model, Material::default(), true).unwrap()],
            vec![Light::rainbow_dynamic_light(3.0, 10.0).unwrap()],
            vec![Viewpoint::static_camera(DVec3::new(3.0, 0.0, 0.0), amount).unwrap()],
        )
        .unwrap()
    }

    fn write_model(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("cube.obj");
        std::fs::write(&path, "v -1 -1 -1\nv 1 1 1\nv 1 -1 1\n").unwrap();
        path
    }

    #[test]
    fn test_worker_completes_and_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let model = write_model(tmp.path());
        let out = tmp.path().join("out");
        let options = GenerationOptions {
            seed: Some(1),
            ..Default::default()
        };

        let worker = GenerationWorker::spawn(config(&out, &model, 3), OfflineScene::new(), options).unwrap();
        let events: Vec<WorkerEvent> = worker.events().iter().collect();
        let report = worker.join().unwrap();

        assert_eq!(report.total_rows(), 3);
        assert!(matches!(events.first(), Some(WorkerEvent::Started { objects: 1 })));
        assert!(matches!(events.last(), Some(WorkerEvent::Completed(_))));
        let rendered = events
            .iter()
            .filter(|e| matches!(e, WorkerEvent::Progress(ProgressEvent::CoordinateRendered { .. })))
            .count();
        assert_eq!(rendered, 3);
    }

    #[test]
    fn test_cancel_running_worker() {
        let tmp = tempfile::tempdir().unwrap();
        let model = write_model(tmp.path());
        let out = tmp.path().join("out");

        let (gate_tx, gate_rx) = unbounded::<()>();
        let state = Arc::new(SceneState::default());
        let scene = GatedScene {
            inner: OfflineScene::new(),
            gate: gate_rx,
            moves: 0,
            state: Arc::clone(&state),
        };
        let worker = GenerationWorker::spawn(config(&out, &model, 3), scene, GenerationOptions::default())
            .unwrap();

        // The second coordinate waits on the gate, so the run is still live here
        let mut events = Vec::new();
        while !events.iter().any(is_rendered) {
            let event = worker
                .events()
                .recv_timeout(Duration::from_secs(10))
                .expect("first coordinate was not rendered");
            events.push(event);
        }
        assert!(!worker.is_finished());

        worker.cancel();
        assert!(worker.is_cancelled());
        drop(gate_tx);

        while !worker.is_finished() {
            std::thread::sleep(Duration::from_millis(5));
        }
        events.extend(worker.poll_events());

        assert!(matches!(events.last(), Some(WorkerEvent::Cancelled)));
        assert!(!events.iter().any(|e| matches!(e, WorkerEvent::Completed(_))));
        assert!(events.iter().filter(|e| is_rendered(e)).count() < 3);

        let err = worker.join().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.object(), Some("cube"));

        assert!(!out.join("cube").join("cube.csv").exists());
        assert!(state.objects_cleared.load(Ordering::SeqCst));
        assert_eq!(state.live_lights.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_before_start_stops_run() {
        let tmp = tempfile::tempdir().unwrap();
        let model = write_model(tmp.path());
        let out = tmp.path().join("out");

        let cancel = Arc::new(AtomicBool::new(true));
        let mut generator = DatasetGenerator::new(
            config(&out, &model, 2),
            OfflineScene::new(),
            GenerationOptions::default(),
        )
        .with_cancel_flag(cancel);

        let err = generator.run().unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.object(), Some("cube"));
        assert!(!out.join("cube").exists());
    }
}
