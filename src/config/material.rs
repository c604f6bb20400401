//! Material definitions
//!
//! A material is a texture choice plus principled-shader parameters. The
//! material kind decides which of those are fixed and which are re-drawn
//! for every rendered coordinate.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Surface texture applied to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    /// Pick one of the concrete textures per coordinate
    #[default]
    Random,
    Gold,
    Marble,
    Crystal,
    Wood,
}

impl Texture {
    /// Name used in config files and CSV rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Texture::Random => "random",
            Texture::Gold => "gold",
            Texture::Marble => "marble",
            Texture::Crystal => "crystal",
            Texture::Wood => "wood",
        }
    }

    /// Returns a human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Texture::Random => "Random",
            Texture::Gold => "Gold",
            Texture::Marble => "Marble",
            Texture::Crystal => "Crystal",
            Texture::Wood => "Wood",
        }
    }

    /// The textures a `Random` choice resolves to.
    pub fn concrete() -> &'static [Texture] {
        &[Texture::Gold, Texture::Marble, Texture::Crystal, Texture::Wood]
    }

    /// Whether this texture is resolved at render time.
    pub fn is_random(&self) -> bool {
        matches!(self, Texture::Random)
    }

    /// Flat color used by the texture-segmentation style (RGBA, linear).
    pub fn segmentation_color(&self) -> [f64; 4] {
        match self {
            Texture::Marble => [0.262, 0.262, 0.262, 1.0],
            Texture::Crystal => [0.262, 0.014, 0.064, 1.0],
            Texture::Wood => [0.262, 0.112, 0.08, 1.0],
            Texture::Gold => [0.8, 0.44, 0.02, 1.0],
            // Only reached if a caller skips texture resolution
            Texture::Random => [1.0, 0.0, 1.0, 1.0],
        }
    }

    /// Base color used when the full material is shaded (RGB, linear).
    pub fn base_color(&self) -> [f64; 3] {
        match self {
            Texture::Marble => [0.85, 0.85, 0.82],
            Texture::Crystal => [0.7, 0.82, 0.9],
            Texture::Wood => [0.55, 0.33, 0.17],
            Texture::Gold => [1.0, 0.77, 0.34],
            Texture::Random => [1.0, 0.0, 1.0],
        }
    }
}

impl std::fmt::Display for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material configuration, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Material {
    /// Fixed texture and fixed shader parameters
    #[serde(rename = "static_static")]
    StaticTextureAndParams {
        texture: Texture,
        metallic: f64,
        specular: f64,
        roughness: f64,
    },
    /// Fixed texture, shader parameters drawn per coordinate
    #[serde(rename = "static_dynamic")]
    StaticTextureDynamicParams { texture: Texture },
    /// Texture and shader parameters drawn per coordinate
    #[serde(rename = "dynamic_dynamic")]
    DynamicTextureAndParams,
}

impl Material {
    /// Fixed texture with fixed metallic/specular/roughness values.
    pub fn static_texture_and_params(
        texture: Texture,
        metallic: f64,
        specular: f64,
        roughness: f64,
    ) -> Result<Self, ConfigError> {
        let material = Material::StaticTextureAndParams {
            texture,
            metallic,
            specular,
            roughness,
        };
        material.validate()?;
        Ok(material)
    }

    /// Fixed texture with randomized shader parameters.
    pub fn static_texture_dynamic_params(texture: Texture) -> Self {
        Material::StaticTextureDynamicParams { texture }
    }

    /// Random texture with randomized shader parameters.
    pub fn dynamic_texture_and_params() -> Self {
        Material::DynamicTextureAndParams
    }

    /// Configured texture; `Random` for the fully dynamic kind.
    pub fn texture(&self) -> Texture {
        match self {
            Material::StaticTextureAndParams { texture, .. }
            | Material::StaticTextureDynamicParams { texture } => *texture,
            Material::DynamicTextureAndParams => Texture::Random,
        }
    }

    /// Fixed `(metallic, specular, roughness)` if this kind has them.
    pub fn fixed_params(&self) -> Option<(f64, f64, f64)> {
        match self {
            Material::StaticTextureAndParams {
                metallic,
                specular,
                roughness,
                ..
            } => Some((*metallic, *specular, *roughness)),
            _ => None,
        }
    }

    /// Kind tag as written in config files.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Material::StaticTextureAndParams { .. } => "static_static",
            Material::StaticTextureDynamicParams { .. } => "static_dynamic",
            Material::DynamicTextureAndParams => "dynamic_dynamic",
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some((metallic, specular, roughness)) = self.fixed_params() {
            for (name, value) in [
                ("metallic", metallic),
                ("specular", specular),
                ("roughness", roughness),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::Validation(format!(
                        "material {} must be between 0 and 1, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::static_texture_dynamic_params(Texture::Random)
    }
}
