//! Lumen - CPU Monte Carlo path tracing core.
//!
//! The pipeline: a `SceneFile` is built into a `Camera` plus a `Bvh` world,
//! `render` traces every pixel in parallel (one rayon task per image row,
//! each with its own seeded RNG), and the resulting `Film` holds linear
//! radiance ready for gamma quantization.

mod bvh;
mod camera;
mod hittable;
mod material;
mod perlin;
mod quad;
mod random;
mod renderer;
pub mod scene;
mod sphere;
mod texture;

pub use bvh::Bvh;
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList, Primitive};
pub use material::{Color, Material};
pub use perlin::Perlin;
pub use quad::{make_box, Quad};
pub use renderer::{linear_to_gamma, ray_color, render, render_pixel, Film};
pub use sphere::Sphere;
pub use texture::Texture;

/// Re-export the math value types the public API is expressed in.
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
