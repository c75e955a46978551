//! Material scattering and emission.
//!
//! One closed set of variants dispatched by match: the renderer never needs
//! open extensibility, and exhaustive matching keeps every scattering branch
//! visible in one place.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::random::{gen_f32, random_unit_vector};
use crate::texture::Texture;
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Surface material: decides, per hit, whether light scatters onward and
/// what it emits. Shared across primitives through `Arc`.
#[derive(Debug)]
pub enum Material {
    /// Diffuse surface with a texture-backed albedo.
    Lambertian { albedo: Arc<Texture> },
    /// Specular reflector; `fuzz` in [0, 1] perturbs the mirror direction.
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive surface governed by its relative refraction index.
    Dielectric { refraction_index: f32 },
    /// Emission-only surface; never scatters.
    DiffuseLight { emit: Arc<Texture> },
}

impl Material {
    /// Diffuse material with a solid albedo color.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian {
            albedo: Arc::new(Texture::solid(albedo)),
        }
    }

    /// Diffuse material sampling the given texture.
    pub fn lambertian_textured(albedo: Arc<Texture>) -> Self {
        Material::Lambertian { albedo }
    }

    /// Metal with the given albedo and roughness (clamped to [0, 1]).
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Dielectric with the given refraction index (1.5 is typical glass).
    pub fn dielectric(refraction_index: f32) -> Self {
        Material::Dielectric { refraction_index }
    }

    /// Uniform emitter with a solid color.
    pub fn diffuse_light(emit: Color) -> Self {
        Material::DiffuseLight {
            emit: Arc::new(Texture::solid(emit)),
        }
    }

    /// Emitter sampling the given texture.
    pub fn diffuse_light_textured(emit: Arc<Texture>) -> Self {
        Material::DiffuseLight { emit }
    }

    /// Scatter an incoming ray at a hit.
    ///
    /// Returns the attenuation and the outgoing ray, or `None` when the ray
    /// is absorbed. The outgoing ray keeps the incoming ray's time so moving
    /// primitives stay coherent across bounces.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        match self {
            Material::Lambertian { albedo } => {
                let mut scatter_direction = rec.normal + random_unit_vector(rng);

                // Catch degenerate scatter direction
                if scatter_direction.length_squared() < 1e-8 {
                    scatter_direction = rec.normal;
                }

                let scattered = Ray::new(rec.p, scatter_direction, ray_in.time);
                Some((albedo.value(rec.u, rec.v, rec.p), scattered))
            }

            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction.normalize(), rec.normal);
                let direction = reflected + *fuzz * random_unit_vector(rng);

                // A fuzzed direction that dips below the surface is absorbed.
                if direction.dot(rec.normal) > 0.0 {
                    Some((*albedo, Ray::new(rec.p, direction, ray_in.time)))
                } else {
                    None
                }
            }

            Material::Dielectric { refraction_index } => {
                // Front face means entering: air-to-material ratio.
                let ri = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    *refraction_index
                };

                let unit_direction = ray_in.direction.normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                // Total internal reflection leaves Snell's law unsolvable.
                let cannot_refract = ri * sin_theta > 1.0;
                let direction = if cannot_refract || reflectance(cos_theta, ri) > gen_f32(rng) {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, ri)
                };

                let scattered = Ray::new(rec.p, direction, ray_in.time);
                Some((Color::ONE, scattered))
            }

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Light emitted at the hit location. Black for everything but lights.
    pub fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight { emit } => emit.value(u, v, p),
            _ => Color::ZERO,
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with the given index ratio.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
#[inline]
fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
