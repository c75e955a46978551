//! Scene file model and validation.
//!
//! A scene is a JSON document with four sections: `camera`, `textures`,
//! `materials`, and `objects`. Materials reference textures either inline
//! (an `[r, g, b]` color) or by table name; objects reference materials by
//! name. Range validation lives here and runs before any rendering starts;
//! name resolution happens when the renderer builds its world.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a scene description.
///
/// Every validation error names the offending field path so a bad scene file
/// can be fixed without guesswork.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("{path}: unknown {kind} \"{name}\"")]
    UnknownReference {
        path: String,
        kind: &'static str,
        name: String,
    },

    #[error("{path}: texture reference cycle through \"{name}\"")]
    TextureCycle { path: String, name: String },
}

impl SceneError {
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Camera configuration as written in the scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Ratio of image width over height.
    pub aspect_ratio: f32,
    /// Rendered image width in pixels.
    pub image_width: u32,
    /// Independent ray samples per pixel.
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth.
    pub max_depth: u32,
    /// Flat background color returned for rays that escape the scene.
    pub background: [f32; 3],
    /// Vertical field of view in degrees.
    pub vfov: f32,
    /// Camera position.
    pub lookfrom: [f32; 3],
    /// Point the camera looks at.
    pub lookat: [f32; 3],
    /// Camera-relative up direction.
    pub vup: [f32; 3],
    /// Aperture cone angle in degrees; 0 disables depth of field.
    #[serde(default)]
    pub defocus_angle: f32,
    /// Distance from lookfrom to the plane of perfect focus.
    #[serde(default = "default_focus_dist")]
    pub focus_dist: f32,
}

fn default_focus_dist() -> f32 {
    10.0
}

/// A texture table entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureDesc {
    Solid { color: [f32; 3] },
    Checker {
        scale: f32,
        even: TextureRef,
        odd: TextureRef,
    },
    Image { file: String },
    Noise { scale: f32 },
}

/// Either an inline color or the name of a texture table entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextureRef {
    Color([f32; 3]),
    Name(String),
}

/// A material table entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    Lambertian { albedo: TextureRef },
    Metal { albedo: [f32; 3], fuzz: f32 },
    Dielectric { refraction_index: f32 },
    DiffuseLight { emit: TextureRef },
}

/// A scene object. Boxes expand into six quads when the world is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDesc {
    Sphere {
        center: [f32; 3],
        /// End position for motion blur; the sphere moves from `center` to
        /// `center2` over the shutter interval.
        #[serde(default)]
        center2: Option<[f32; 3]>,
        radius: f32,
        material: String,
    },
    Quad {
        corner: [f32; 3],
        u: [f32; 3],
        v: [f32; 3],
        material: String,
    },
    Box {
        center: [f32; 3],
        /// Extents along x, y, z.
        size: [f32; 3],
        material: String,
    },
}

/// A parsed scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    pub camera: CameraConfig,
    #[serde(default)]
    pub textures: BTreeMap<String, TextureDesc>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

impl SceneFile {
    /// Read and parse a scene file, then validate its values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a scene from JSON text and validate its values.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        let scene: SceneFile = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Range-check every field. Returns the first violation found, naming the
    /// offending field path.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.validate_camera()?;

        for (name, texture) in &self.textures {
            validate_texture(texture, &format!("textures.{name}"))?;
        }

        for (name, material) in &self.materials {
            validate_material(material, &format!("materials.{name}"))?;
        }

        for (index, object) in self.objects.iter().enumerate() {
            validate_object(object, index)?;
        }

        Ok(())
    }

    fn validate_camera(&self) -> Result<(), SceneError> {
        let c = &self.camera;
        if !(c.aspect_ratio.is_finite() && c.aspect_ratio > 0.0) {
            return Err(SceneError::invalid(
                "camera.aspect_ratio",
                "expected a positive number",
            ));
        }
        if c.image_width == 0 {
            return Err(SceneError::invalid(
                "camera.image_width",
                "expected a positive integer",
            ));
        }
        if c.samples_per_pixel == 0 {
            return Err(SceneError::invalid(
                "camera.samples_per_pixel",
                "expected a positive integer",
            ));
        }
        if c.max_depth == 0 {
            return Err(SceneError::invalid(
                "camera.max_depth",
                "expected a positive integer",
            ));
        }
        validate_color(&c.background, "camera.background")?;
        if !(c.vfov > 0.0 && c.vfov < 180.0) {
            return Err(SceneError::invalid(
                "camera.vfov",
                "expected degrees in (0, 180)",
            ));
        }
        if c.defocus_angle < 0.0 {
            return Err(SceneError::invalid(
                "camera.defocus_angle",
                "expected a non-negative angle",
            ));
        }
        if !(c.focus_dist.is_finite() && c.focus_dist > 0.0) {
            return Err(SceneError::invalid(
                "camera.focus_dist",
                "expected a positive distance",
            ));
        }
        Ok(())
    }
}

fn validate_color(color: &[f32; 3], path: &str) -> Result<(), SceneError> {
    for (i, channel) in color.iter().enumerate() {
        if !(*channel >= 0.0 && *channel <= 1.0) {
            let mut p = path.to_string();
            let _ = write!(p, "[{i}]");
            return Err(SceneError::invalid(p, "expected a channel in [0, 1]"));
        }
    }
    Ok(())
}

fn validate_texture_ref(r: &TextureRef, path: &str) -> Result<(), SceneError> {
    match r {
        TextureRef::Color(color) => validate_color(color, path),
        // Whether the name resolves is checked when the world is built.
        TextureRef::Name(_) => Ok(()),
    }
}

fn validate_texture(texture: &TextureDesc, path: &str) -> Result<(), SceneError> {
    match texture {
        TextureDesc::Solid { color } => validate_color(color, &format!("{path}.color")),
        TextureDesc::Checker { scale, even, odd } => {
            if !(scale.is_finite() && *scale > 0.0) {
                return Err(SceneError::invalid(
                    format!("{path}.scale"),
                    "expected a positive number",
                ));
            }
            validate_texture_ref(even, &format!("{path}.even"))?;
            validate_texture_ref(odd, &format!("{path}.odd"))
        }
        TextureDesc::Image { file } => {
            if file.is_empty() {
                return Err(SceneError::invalid(
                    format!("{path}.file"),
                    "expected a file path",
                ));
            }
            Ok(())
        }
        TextureDesc::Noise { scale } => {
            if !(scale.is_finite() && *scale > 0.0) {
                return Err(SceneError::invalid(
                    format!("{path}.scale"),
                    "expected a positive number",
                ));
            }
            Ok(())
        }
    }
}

fn validate_material(material: &MaterialDesc, path: &str) -> Result<(), SceneError> {
    match material {
        MaterialDesc::Lambertian { albedo } => {
            validate_texture_ref(albedo, &format!("{path}.albedo"))
        }
        MaterialDesc::Metal { albedo, fuzz } => {
            validate_color(albedo, &format!("{path}.albedo"))?;
            if !(*fuzz >= 0.0 && *fuzz <= 1.0) {
                return Err(SceneError::invalid(
                    format!("{path}.fuzz"),
                    "expected a value in [0, 1]",
                ));
            }
            Ok(())
        }
        MaterialDesc::Dielectric { refraction_index } => {
            if !(refraction_index.is_finite() && *refraction_index > 0.0) {
                return Err(SceneError::invalid(
                    format!("{path}.refraction_index"),
                    "expected a positive number",
                ));
            }
            Ok(())
        }
        MaterialDesc::DiffuseLight { emit } => validate_texture_ref(emit, &format!("{path}.emit")),
    }
}

fn validate_object(object: &ObjectDesc, index: usize) -> Result<(), SceneError> {
    match object {
        ObjectDesc::Sphere { radius, .. } => {
            if !(radius.is_finite() && *radius > 0.0) {
                return Err(SceneError::invalid(
                    format!("objects[{index}].radius"),
                    "expected a positive radius",
                ));
            }
            Ok(())
        }
        ObjectDesc::Quad { u, v, .. } => {
            let u = Vec3::from_array(*u);
            let v = Vec3::from_array(*v);
            if u.cross(v).length_squared() < 1e-12 {
                return Err(SceneError::invalid(
                    format!("objects[{index}]"),
                    "quad edge vectors u and v must span a plane",
                ));
            }
            Ok(())
        }
        ObjectDesc::Box { size, .. } => {
            if size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
                return Err(SceneError::invalid(
                    format!("objects[{index}].size"),
                    "expected positive extents",
                ));
            }
            Ok(())
        }
    }
}
