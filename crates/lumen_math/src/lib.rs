//! Math value types for the lumen renderer.
//!
//! Vectors and colors come straight from `glam`; this crate adds the scalar
//! `Interval`, the axis-aligned `Aabb`, and the time-carrying `Ray` that the
//! renderer crates build on.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
