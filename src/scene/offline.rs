//! Software scene backend
//!
//! Renders models as depth-tested point clouds into RGBA PNG files. It
//! stands in for a host 3D engine: no GPU, no shader graphs, only enough
//! shading to tell the styles apart.

use std::collections::HashMap;
use std::path::Path;

use glam::{DVec3, Vec3};
use image::{Rgba, RgbaImage};

use super::{
    CameraHandle, EnvironmentHandle, LightHandle, ModelMesh, ObjectHandle, SceneError,
    SceneOperations, TrackingCamera,
};
use crate::config::{Environment, Lighting, MaterialOverride, Object, Render, RenderStyle, Texture};
use crate::output;
use crate::sampler::{LightInstance, ResolvedMaterial};

/// Color of unshaded geometry.
const NEUTRAL_GREY: [f32; 3] = [0.5, 0.5, 0.5];
/// Ambient term added under global illumination.
const AMBIENT: f32 = 0.08;
/// Energy at which a light contributes its full color.
const REFERENCE_ENERGY: f32 = 10.0;

struct SceneModel {
    name: String,
    mesh: ModelMesh,
    material: Option<ResolvedMaterial>,
}

/// In-memory scene rendering with a point-splat rasterizer.
pub struct OfflineScene {
    next_id: u64,
    environment: Option<Environment>,
    cameras: HashMap<u64, TrackingCamera>,
    active_camera: Option<u64>,
    lights: Vec<(LightHandle, LightInstance)>,
    models: HashMap<u64, SceneModel>,
    resolution: (u32, u32),
    renders: usize,
}

impl OfflineScene {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            environment: None,
            cameras: HashMap::new(),
            active_camera: None,
            lights: Vec::new(),
            models: HashMap::new(),
            resolution: (128, 128),
            renders: 0,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Lights currently in the scene.
    pub fn lights(&self) -> impl Iterator<Item = &LightInstance> {
        self.lights.iter().map(|(_, light)| light)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn object_count(&self) -> usize {
        self.models.len()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Images written since the scene was created.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Vertices of a loaded model as placed in the scene.
    pub fn model_vertices(&self, object: ObjectHandle) -> Option<&[DVec3]> {
        self.models.get(&object.0).map(|m| m.mesh.vertices.as_slice())
    }

    pub fn model_material(&self, object: ObjectHandle) -> Option<ResolvedMaterial> {
        self.models.get(&object.0).and_then(|m| m.material)
    }

    fn model(&self, object: ObjectHandle) -> Result<&SceneModel, SceneError> {
        self.models.get(&object.0).ok_or(SceneError::UnknownHandle {
            kind: "object",
            id: object.0,
        })
    }

    /// Linear RGB of one vertex for the given style.
    fn shade(
        &self,
        style: RenderStyle,
        texture: Texture,
        material: Option<&ResolvedMaterial>,
        position: Vec3,
        eye: Vec3,
    ) -> [f32; 3] {
        let setup = style.setup();
        match setup.material {
            MaterialOverride::Cleared => NEUTRAL_GREY,
            MaterialOverride::Silhouette => [0.0, 0.0, 0.0],
            MaterialOverride::Segmentation => {
                let [r, g, b, _] = texture.segmentation_color();
                [r as f32, g as f32, b as f32]
            }
            MaterialOverride::Full => {
                let base = Vec3::from_array(texture.base_color().map(|c| c as f32));
                let lit = match setup.lighting {
                    Lighting::GlobalIllumination => {
                        self.illuminate(base, material, position, eye, style == RenderStyle::RayTraced)
                    }
                    Lighting::Shadeless | Lighting::None => base,
                };
                lit.to_array()
            }
        }
    }

    /// Lambert plus Blinn-Phong highlight over every light in the scene.
    fn illuminate(
        &self,
        base: Vec3,
        material: Option<&ResolvedMaterial>,
        position: Vec3,
        eye: Vec3,
        falloff: bool,
    ) -> Vec3 {
        let (metallic, specular, roughness) = material
            .map(|m| (m.metallic as f32, m.specular as f32, m.roughness as f32))
            .unwrap_or((0.0, 0.5, 0.5));

        // Models are centered on the origin, so the radial direction is a
        // usable normal for a point cloud
        let normal = position.normalize_or(Vec3::Z);
        let view = (eye - position).normalize_or_zero();
        let diffuse_color = base * (1.0 - metallic);
        let specular_color = Vec3::splat(specular).lerp(base, metallic);
        let shininess = 2.0 + (1.0 - roughness) * 126.0;

        let mut color = base * AMBIENT;
        for (_, light) in &self.lights {
            let to_light = light.location.as_vec3() - position;
            let distance_sq = to_light.length_squared().max(1e-4);
            let dir = to_light.normalize_or_zero();
            let light_color = Vec3::from_array(light.color.map(|c| c as f32));

            let mut intensity = light.energy as f32 / REFERENCE_ENERGY;
            if falloff {
                intensity /= distance_sq;
            }

            let lambert = normal.dot(dir).max(0.0);
            let half = (dir + view).normalize_or_zero();
            let highlight = if lambert > 0.0 {
                normal.dot(half).max(0.0).powf(shininess)
            } else {
                0.0
            };

            color += (diffuse_color * lambert + specular_color * highlight) * light_color * intensity;
        }
        color.clamp(Vec3::ZERO, Vec3::ONE)
    }

    fn rasterize(
        &self,
        model: &SceneModel,
        camera: &TrackingCamera,
        style: RenderStyle,
        texture: Texture,
    ) -> RgbaImage {
        let (width, height) = self.resolution;
        let mut image = RgbaImage::new(width, height);
        let mut depth = vec![f32::INFINITY; pixel_count(width, height)];
        let view_projection = camera.view_projection_matrix(width as f32 / height as f32);
        let eye = camera.location();

        for vertex in &model.mesh.vertices {
            let position = vertex.as_vec3();
            let clip = view_projection * position.extend(1.0);
            if clip.w <= 0.0 || !clip.is_finite() {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
                continue;
            }

            let x = (((ndc.x + 1.0) * 0.5 * width as f32) as u32).min(width - 1);
            let y = (((1.0 - ndc.y) * 0.5 * height as f32) as u32).min(height - 1);
            let slot = pixel_slot(x, y, width);
            if ndc.z >= depth[slot] {
                continue;
            }
            depth[slot] = ndc.z;

            let [r, g, b] = self.shade(style, texture, model.material.as_ref(), position, eye);
            image.put_pixel(x, y, Rgba([to_u8(r), to_u8(g), to_u8(b), 255]));
        }

        image
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Row-major index of a pixel in the depth buffer.
fn pixel_slot(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Default for OfflineScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneOperations for OfflineScene {
    fn create_environment(&mut self, environment: &Environment) -> Result<EnvironmentHandle, SceneError> {
        self.environment = Some(*environment);
        Ok(EnvironmentHandle(self.allocate_id()))
    }

    fn create_light(&mut self, light: &LightInstance) -> Result<LightHandle, SceneError> {
        let handle = LightHandle(self.allocate_id());
        self.lights.push((handle, *light));
        Ok(handle)
    }

    fn load_object(&mut self, object: &Object, dimension: f64) -> Result<ObjectHandle, SceneError> {
        let path = &object.path;
        if !path.is_file() {
            return Err(SceneError::ModelNotFound(path.clone()));
        }
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if extension != "obj" {
            return Err(SceneError::UnsupportedFormat {
                path: path.clone(),
                extension,
            });
        }

        let text = std::fs::read_to_string(path)?;
        let mut mesh = ModelMesh::parse_obj(&text).map_err(|reason| SceneError::ModelParse {
            path: path.clone(),
            reason,
        })?;
        if object.normalize {
            mesh.normalize(dimension);
        }

        log::debug!(
            "Loaded {} ({} vertices) from {}",
            object.name,
            mesh.vertices.len(),
            path.display()
        );

        let handle = ObjectHandle(self.allocate_id());
        self.models.insert(
            handle.0,
            SceneModel {
                name: object.name.clone(),
                mesh,
                material: None,
            },
        );
        Ok(handle)
    }

    fn create_camera(&mut self) -> Result<CameraHandle, SceneError> {
        let id = self.allocate_id();
        self.cameras.insert(id, TrackingCamera::new());
        self.active_camera = Some(id);
        Ok(CameraHandle(id))
    }

    fn move_camera_to(&mut self, camera: CameraHandle, location: DVec3) -> Result<(), SceneError> {
        let tracked = self.cameras.get_mut(&camera.0).ok_or(SceneError::UnknownHandle {
            kind: "camera",
            id: camera.0,
        })?;
        tracked.set_location(location);
        self.active_camera = Some(camera.0);
        Ok(())
    }

    fn render(
        &mut self,
        output_dir: &Path,
        style: RenderStyle,
        texture: Texture,
        object: ObjectHandle,
    ) -> Result<(), SceneError> {
        let camera = self
            .active_camera
            .and_then(|id| self.cameras.get(&id))
            .ok_or(SceneError::NoCamera)?;
        let model = self.model(object)?;

        let image = self.rasterize(model, camera, style, texture);
        let path = output::image_path(output_dir, style);
        image.save(&path)?;

        log::debug!("Rendered {} of {} to {}", style, model.name, path.display());
        self.renders += 1;
        Ok(())
    }

    fn clear_lights(&mut self) -> Result<(), SceneError> {
        self.lights.clear();
        Ok(())
    }

    fn load_material(&mut self, object: ObjectHandle, material: &ResolvedMaterial) -> Result<(), SceneError> {
        let model = self.models.get_mut(&object.0).ok_or(SceneError::UnknownHandle {
            kind: "object",
            id: object.0,
        })?;
        model.material = Some(*material);
        Ok(())
    }

    fn set_render_resolution(&mut self, render: &Render) -> Result<(), SceneError> {
        self.resolution = (render.resolution_x, render.resolution_y);
        Ok(())
    }

    fn export_normalized_object(&mut self, object: ObjectHandle, path: &Path) -> Result<(), SceneError> {
        let model = self.model(object)?;
        std::fs::write(path, model.mesh.to_obj(&model.name))?;
        Ok(())
    }

    fn clear_objects(&mut self) -> Result<(), SceneError> {
        self.models.clear();
        self.cameras.clear();
        self.active_camera = None;
        self.lights.clear();
        Ok(())
    }
}
