//! Recursive radiance estimation and the parallel render loop.

use crate::camera::Camera;
use crate::hittable::Hittable;
use crate::material::Color;
use indicatif::{ProgressBar, ProgressStyle};
use lumen_math::{Interval, Ray};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

/// Estimate the radiance arriving along a ray.
///
/// Bounded recursion is the only termination mechanism: at depth 0 the path
/// contributes black. The valid-hit window starts at 1e-3 rather than zero
/// to suppress self-intersection at the previous bounce's origin.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    background: Color,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(0.001, f32::INFINITY)) else {
        return background;
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some((attenuation, scattered)) => {
            emitted + attenuation * ray_color(&scattered, world, depth - 1, background, rng)
        }
        None => emitted,
    }
}

/// Render one pixel: average `samples_per_pixel` independent estimates.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        let ray = camera.get_ray(i, j, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth, camera.background, rng);
    }

    pixel_color * camera.pixel_samples_scale()
}

/// Linear-radiance image buffer produced by `render`.
pub struct Film {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Film {
    /// Create a film filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Quantize to flat RGB bytes, applying the gamma-2 tone curve.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let intensity = Interval::new(0.0, 0.999);
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);

        for color in &self.pixels {
            for channel in [color.x, color.y, color.z] {
                let gamma = linear_to_gamma(channel);
                bytes.push((256.0 * intensity.clamp(gamma)) as u8);
            }
        }

        bytes
    }
}

/// Gamma correction: radiance accumulates in linear space, so a square-root
/// tone curve is applied per channel before quantization.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Render the scene, one rayon task per image row.
///
/// Rows are independent, so the only shared mutable state is the film
/// addressed through disjoint row slices. Each row gets its own generator
/// seeded from `seed` and the row index: a fixed seed reproduces the exact
/// image regardless of how rayon schedules the rows.
pub fn render(camera: &Camera, world: &dyn Hittable, seed: u64) -> Film {
    let width = camera.image_width;
    let height = camera.image_height();
    assert!(height > 0, "camera not initialized");

    log::info!(
        "rendering {}x{} at {} spp across {} threads",
        width,
        height,
        camera.samples_per_pixel,
        rayon::current_num_threads()
    );
    let start = std::time::Instant::now();

    let progress = ProgressBar::new(height as u64);
    progress.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} rows ETA: {eta}"));

    let mut film = Film::new(width, height);
    film.pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(j, row)| {
            let mut rng = row_rng(seed, j as u64);
            for (i, pixel) in row.iter_mut().enumerate() {
                *pixel = render_pixel(camera, world, i as u32, j as u32, &mut rng);
            }
            progress.inc(1);
        });

    progress.finish_and_clear();
    log::info!("render finished in {:.2?}", start.elapsed());

    film
}

/// Per-row generator: mix the row index into the base seed so rows draw
/// independent streams.
fn row_rng(seed: u64, row: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ row.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Bvh;
    use crate::hittable::Primitive;
    use crate::material::Material;
    use crate::sphere::Sphere;
    use lumen_math::Vec3;
    use std::sync::Arc;

    fn one_sphere_world() -> Bvh {
        Bvh::new(vec![Primitive::Sphere(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5))),
        ))])
    }

    #[test]
    fn test_depth_zero_is_black() {
        let world = one_sphere_world();
        let ray = Ray::at_time_zero(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = row_rng(0, 0);

        let color = ray_color(&ray, &world, 0, Color::ONE, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = one_sphere_world();
        let background = Color::new(0.2, 0.3, 0.4);
        let ray = Ray::at_time_zero(Vec3::ZERO, Vec3::Y);
        let mut rng = row_rng(0, 0);

        let color = ray_color(&ray, &world, 10, background, &mut rng);
        assert_eq!(color, background);
    }

    #[test]
    fn test_emissive_hit_returns_emission() {
        let world = Bvh::new(vec![Primitive::Sphere(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Material::diffuse_light(Color::new(0.9, 0.8, 0.7))),
        ))]);
        let ray = Ray::at_time_zero(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = row_rng(0, 0);

        let color = ray_color(&ray, &world, 10, Color::ZERO, &mut rng);
        assert_eq!(color, Color::new(0.9, 0.8, 0.7));
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-5);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_film_quantization() {
        let mut film = Film::new(2, 1);
        film.pixels[0] = Color::new(0.0, 0.25, 1.0);
        film.pixels[1] = Color::new(4.0, -1.0, 0.5);

        let bytes = film.to_rgb8();
        assert_eq!(bytes.len(), 6);
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], 128); // sqrt(0.25) = 0.5 -> 128
        assert_eq!(bytes[2], 255); // clamped below 1.0 -> 255

        // Over-range and negative channels clamp instead of wrapping.
        assert_eq!(bytes[3], 255);
        assert_eq!(bytes[4], 0);
    }

    #[test]
    fn test_row_rngs_are_independent_streams() {
        let mut a = row_rng(7, 0);
        let mut b = row_rng(7, 1);
        let mut a2 = row_rng(7, 0);

        let xs: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let ys: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        let xs2: Vec<u32> = (0..4).map(|_| a2.next_u32()).collect();

        assert_eq!(xs, xs2);
        assert_ne!(xs, ys);
    }
}
