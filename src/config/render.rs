//! Render output settings and style definitions

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One image variant produced per camera coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderStyle {
    /// No material, no lighting, rasterized
    #[serde(rename = "normal")]
    Normal,
    /// Flat black silhouette on a shadeless world
    #[serde(rename = "silhouette")]
    Silhouette,
    /// Flat per-texture color on a shadeless world
    #[serde(rename = "texture-segmentation")]
    TextureSegmentation,
    /// Full material, global illumination, path traced
    #[serde(rename = "ray-traced")]
    RayTraced,
    /// Full material, global illumination, rasterized
    #[serde(rename = "rasterized", alias = "rastered")]
    Rasterized,
}

/// Material applied to the model while a style renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialOverride {
    /// Material slots emptied
    Cleared,
    /// Emissive black silhouette material
    Silhouette,
    /// Emissive flat color of the resolved texture
    Segmentation,
    /// The resolved texture's full shaded material
    Full,
}

/// World lighting used while a style renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lighting {
    None,
    /// Emission alone determines pixel color
    Shadeless,
    /// Environment light plus scene lights
    GlobalIllumination,
}

/// Render engine used for a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Rasterized,
    PathTraced,
}

/// Everything a backend needs to set up before taking a style's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSetup {
    pub material: MaterialOverride,
    pub lighting: Lighting,
    pub backend: Backend,
}

impl RenderStyle {
    /// Name used in config files and as the image file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStyle::Normal => "normal",
            RenderStyle::Silhouette => "silhouette",
            RenderStyle::TextureSegmentation => "texture-segmentation",
            RenderStyle::RayTraced => "ray-traced",
            RenderStyle::Rasterized => "rasterized",
        }
    }

    /// Returns a human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            RenderStyle::Normal => "No-style",
            RenderStyle::Silhouette => "Silhouette",
            RenderStyle::TextureSegmentation => "Silhouette segmented",
            RenderStyle::RayTraced => "Ray-traced",
            RenderStyle::Rasterized => "Rasterized",
        }
    }

    /// Material override, lighting and engine for this style.
    pub fn setup(&self) -> StyleSetup {
        let (material, lighting, backend) = match self {
            RenderStyle::Normal => (MaterialOverride::Cleared, Lighting::None, Backend::Rasterized),
            RenderStyle::Silhouette => {
                (MaterialOverride::Silhouette, Lighting::Shadeless, Backend::Rasterized)
            }
            RenderStyle::TextureSegmentation => {
                (MaterialOverride::Segmentation, Lighting::Shadeless, Backend::Rasterized)
            }
            RenderStyle::RayTraced => {
                (MaterialOverride::Full, Lighting::GlobalIllumination, Backend::PathTraced)
            }
            RenderStyle::Rasterized => {
                (MaterialOverride::Full, Lighting::GlobalIllumination, Backend::Rasterized)
            }
        };
        StyleSetup {
            material,
            lighting,
            backend,
        }
    }

    /// Sample count the engine uses for this style.
    pub fn samples(&self) -> u32 {
        match self.setup().backend {
            Backend::PathTraced => 128,
            Backend::Rasterized => 100,
        }
    }

    /// All styles, in the default render order.
    pub fn all() -> &'static [RenderStyle] {
        &[
            RenderStyle::Normal,
            RenderStyle::Silhouette,
            RenderStyle::TextureSegmentation,
            RenderStyle::RayTraced,
            RenderStyle::Rasterized,
        ]
    }
}

impl std::fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution, location and styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Render {
    /// Image width in pixels
    pub resolution_x: u32,
    /// Image height in pixels
    pub resolution_y: u32,
    /// Root directory receiving one folder per object
    pub output_dir_path: String,
    /// Styles rendered for every coordinate, in order
    pub styles: Vec<RenderStyle>,
}

impl Render {
    /// Create render settings. Repeated styles are dropped, keeping the first.
    pub fn new(
        resolution_x: u32,
        resolution_y: u32,
        output_dir_path: impl Into<String>,
        styles: Vec<RenderStyle>,
    ) -> Result<Self, ConfigError> {
        let mut render = Self {
            resolution_x,
            resolution_y,
            output_dir_path: output_dir_path.into(),
            styles,
        };
        render.dedup_styles();
        render.validate()?;
        Ok(render)
    }

    pub(crate) fn dedup_styles(&mut self) {
        let mut seen = Vec::with_capacity(self.styles.len());
        self.styles.retain(|style| {
            if seen.contains(style) {
                false
            } else {
                seen.push(*style);
                true
            }
        });
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution_x == 0 || self.resolution_y == 0 {
            return Err(ConfigError::Validation(format!(
                "render resolution must be positive, got {}x{}",
                self.resolution_x, self.resolution_y
            )));
        }
        if self.output_dir_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Output directory path not specified!".to_string(),
            ));
        }
        Ok(())
    }
}
