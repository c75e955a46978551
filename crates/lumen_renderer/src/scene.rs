//! Build a render world from a validated scene description.
//!
//! Name resolution happens here: texture references resolve through the
//! texture table (with cycle detection), materials bind their textures, and
//! objects bind their materials. Everything shared ends up behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::hittable::Primitive;
use crate::material::{Color, Material};
use crate::perlin::Perlin;
use crate::quad::{make_box, Quad};
use crate::sphere::Sphere;
use crate::texture::Texture;
use lumen_core::{ImageData, MaterialDesc, ObjectDesc, SceneError, SceneFile, TextureDesc, TextureRef};
use lumen_math::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Sentinel substituted for unreadable texture image files.
const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Build the camera and the BVH world from a scene description.
///
/// `seed` feeds the procedural noise tables so a scene renders identically
/// for identical seeds. Fails fast on dangling or cyclic references; an
/// unreadable texture image only degrades (see `MISSING_TEXTURE_COLOR`).
pub fn build(scene: &SceneFile, seed: u64) -> Result<(Camera, Bvh), SceneError> {
    let mut textures = TextureTable::new(scene, seed);

    let mut materials: HashMap<&str, Arc<Material>> = HashMap::new();
    for (name, desc) in &scene.materials {
        let material = build_material(desc, &format!("materials.{name}"), &mut textures)?;
        materials.insert(name.as_str(), Arc::new(material));
    }

    let mut primitives = Vec::new();
    for (index, object) in scene.objects.iter().enumerate() {
        build_object(object, index, &materials, &mut primitives)?;
    }
    log::debug!("scene built: {} primitives", primitives.len());

    let config = &scene.camera;
    let mut camera = Camera::new()
        .with_image(config.aspect_ratio, config.image_width)
        .with_quality(config.samples_per_pixel, config.max_depth)
        .with_background(Color::from_array(config.background))
        .with_view(
            Vec3::from_array(config.lookfrom),
            Vec3::from_array(config.lookat),
            Vec3::from_array(config.vup),
        )
        .with_lens(config.vfov, config.defocus_angle, config.focus_dist);
    camera.initialize();

    Ok((camera, Bvh::new(primitives)))
}

/// Texture table resolver with memoization and cycle detection.
struct TextureTable<'a> {
    scene: &'a SceneFile,
    resolved: HashMap<String, Arc<Texture>>,
    in_progress: Vec<String>,
    rng: SmallRng,
}

impl<'a> TextureTable<'a> {
    fn new(scene: &'a SceneFile, seed: u64) -> Self {
        Self {
            scene,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn resolve_ref(&mut self, r: &TextureRef, path: &str) -> Result<Arc<Texture>, SceneError> {
        match r {
            TextureRef::Color(color) => Ok(Arc::new(Texture::solid(Color::from_array(*color)))),
            TextureRef::Name(name) => self.resolve_name(name, path),
        }
    }

    fn resolve_name(&mut self, name: &str, path: &str) -> Result<Arc<Texture>, SceneError> {
        if let Some(texture) = self.resolved.get(name) {
            return Ok(texture.clone());
        }
        if self.in_progress.iter().any(|n| n == name) {
            return Err(SceneError::TextureCycle {
                path: path.to_string(),
                name: name.to_string(),
            });
        }

        let desc = self
            .scene
            .textures
            .get(name)
            .ok_or_else(|| SceneError::UnknownReference {
                path: path.to_string(),
                kind: "texture",
                name: name.to_string(),
            })?;

        self.in_progress.push(name.to_string());
        let texture = match desc {
            TextureDesc::Solid { color } => Texture::solid(Color::from_array(*color)),
            TextureDesc::Checker { scale, even, odd } => {
                let even = self.resolve_ref(even, &format!("textures.{name}.even"))?;
                let odd = self.resolve_ref(odd, &format!("textures.{name}.odd"))?;
                Texture::checker(*scale, even, odd)
            }
            TextureDesc::Image { file } => match ImageData::load(file) {
                Ok(image) => Texture::image(Arc::new(image)),
                Err(err) => {
                    log::warn!("{err}; substituting sentinel color");
                    Texture::solid(MISSING_TEXTURE_COLOR)
                }
            },
            TextureDesc::Noise { scale } => Texture::noise(Perlin::new(&mut self.rng), *scale),
        };
        self.in_progress.pop();

        let texture = Arc::new(texture);
        self.resolved.insert(name.to_string(), texture.clone());
        Ok(texture)
    }
}

fn build_material(
    desc: &MaterialDesc,
    path: &str,
    textures: &mut TextureTable<'_>,
) -> Result<Material, SceneError> {
    Ok(match desc {
        MaterialDesc::Lambertian { albedo } => {
            Material::lambertian_textured(textures.resolve_ref(albedo, &format!("{path}.albedo"))?)
        }
        MaterialDesc::Metal { albedo, fuzz } => {
            Material::metal(Color::from_array(*albedo), *fuzz)
        }
        MaterialDesc::Dielectric { refraction_index } => Material::dielectric(*refraction_index),
        MaterialDesc::DiffuseLight { emit } => {
            Material::diffuse_light_textured(textures.resolve_ref(emit, &format!("{path}.emit"))?)
        }
    })
}

fn build_object(
    object: &ObjectDesc,
    index: usize,
    materials: &HashMap<&str, Arc<Material>>,
    primitives: &mut Vec<Primitive>,
) -> Result<(), SceneError> {
    let lookup = |name: &str| -> Result<Arc<Material>, SceneError> {
        materials
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownReference {
                path: format!("objects[{index}].material"),
                kind: "material",
                name: name.to_string(),
            })
    };

    match object {
        ObjectDesc::Sphere {
            center,
            center2,
            radius,
            material,
        } => {
            let material = lookup(material)?;
            let center = Vec3::from_array(*center);
            let sphere = match center2 {
                Some(center2) => {
                    Sphere::new_moving(center, Vec3::from_array(*center2), *radius, material)
                }
                None => Sphere::new(center, *radius, material),
            };
            primitives.push(Primitive::Sphere(sphere));
        }
        ObjectDesc::Quad {
            corner,
            u,
            v,
            material,
        } => {
            let material = lookup(material)?;
            primitives.push(Primitive::Quad(Quad::new(
                Vec3::from_array(*corner),
                Vec3::from_array(*u),
                Vec3::from_array(*v),
                material,
            )));
        }
        ObjectDesc::Box {
            center,
            size,
            material,
        } => {
            let material = lookup(material)?;
            primitives.extend(make_box(
                Vec3::from_array(*center),
                Vec3::from_array(*size),
                material,
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMERA: &str = r#"
        "camera": {
            "aspect_ratio": 1.0,
            "image_width": 32,
            "samples_per_pixel": 4,
            "max_depth": 5,
            "background": [0.7, 0.8, 1.0],
            "vfov": 90.0,
            "lookfrom": [0, 0, 0],
            "lookat": [0, 0, -1],
            "vup": [0, 1, 0]
        }
    "#;

    #[test]
    fn test_build_expands_boxes() {
        let json = format!(
            r#"{{
                {CAMERA},
                "materials": {{
                    "gray": {{ "type": "lambertian", "albedo": [0.5, 0.5, 0.5] }}
                }},
                "objects": [
                    {{ "type": "sphere", "center": [0, 0, -2], "radius": 0.5,
                       "material": "gray" }},
                    {{ "type": "box", "center": [2, 0, -2], "size": [1, 1, 1],
                       "material": "gray" }}
                ]
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        let (camera, world) = build(&scene, 0).unwrap();

        // One sphere plus six box faces
        assert_eq!(world.len(), 7);
        assert_eq!(camera.image_height(), 32);
    }

    #[test]
    fn test_unknown_material_reference() {
        let json = format!(
            r#"{{
                {CAMERA},
                "objects": [
                    {{ "type": "sphere", "center": [0, 0, -2], "radius": 0.5,
                       "material": "missing" }}
                ]
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        let err = build(&scene, 0).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("objects[0].material"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_unknown_texture_reference() {
        let json = format!(
            r#"{{
                {CAMERA},
                "materials": {{
                    "bad": {{ "type": "lambertian", "albedo": "nope" }}
                }}
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        let err = build(&scene, 0).unwrap_err();
        assert!(err.to_string().contains("materials.bad.albedo"));
    }

    #[test]
    fn test_texture_cycle_detected() {
        let json = format!(
            r#"{{
                {CAMERA},
                "textures": {{
                    "a": {{ "type": "checker", "scale": 1.0, "even": "b", "odd": [0, 0, 0] }},
                    "b": {{ "type": "checker", "scale": 1.0, "even": "a", "odd": [1, 1, 1] }}
                }},
                "materials": {{
                    "mat": {{ "type": "lambertian", "albedo": "a" }}
                }}
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        let err = build(&scene, 0).unwrap_err();
        assert!(matches!(err, SceneError::TextureCycle { .. }));
    }

    #[test]
    fn test_missing_image_degrades_to_sentinel() {
        let json = format!(
            r#"{{
                {CAMERA},
                "textures": {{
                    "earth": {{ "type": "image", "file": "/nonexistent/earth.png" }}
                }},
                "materials": {{
                    "mapped": {{ "type": "lambertian", "albedo": "earth" }}
                }}
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        // Build succeeds; the texture resolves to the magenta sentinel.
        let (_, world) = build(&scene, 0).unwrap();
        assert!(world.is_empty());
    }

    #[test]
    fn test_shared_texture_resolves_once() {
        let json = format!(
            r#"{{
                {CAMERA},
                "textures": {{
                    "marble": {{ "type": "noise", "scale": 2.0 }}
                }},
                "materials": {{
                    "a": {{ "type": "lambertian", "albedo": "marble" }},
                    "b": {{ "type": "diffuse_light", "emit": "marble" }}
                }}
            }}"#
        );
        let scene = SceneFile::from_json(&json).unwrap();
        assert!(build(&scene, 0).is_ok());
    }
}
