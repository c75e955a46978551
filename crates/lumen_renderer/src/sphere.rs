//! Sphere primitive, stationary or moving.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::material::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// A sphere, possibly moving linearly over the shutter interval.
///
/// The center is stored as a ray: origin at time 0 plus the displacement
/// covered by time 1, so `center.at(t)` is the instantaneous center for a
/// ray sampled at time t. A stationary sphere simply has zero displacement.
#[derive(Debug)]
pub struct Sphere {
    center: Ray,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center: Ray::at_time_zero(center, Vec3::ZERO),
            radius,
            material,
            bbox,
        }
    }

    /// Create a sphere moving from `center1` (time 0) to `center2` (time 1).
    pub fn new_moving(center1: Vec3, center2: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        let box2 = Aabb::from_points(center2 - rvec, center2 + rvec);

        Self {
            center: Ray::at_time_zero(center1, center2 - center1),
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    /// Spherical UV coordinates of a point on the unit sphere.
    ///
    /// `u` comes from the azimuth with a +pi phase wrap into [0, 2pi),
    /// `v` from the polar angle down from +Y.
    fn sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let current_center = self.center.at(ray.time);
        let oc = current_center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Prefer the nearer root; fall back to the far one (the ray may
        // start inside the sphere).
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - current_center) / self.radius;
        let (u, v) = Self::sphere_uv(outward_normal);

        Some(HitRecord::new(
            ray,
            outward_normal,
            p,
            root,
            u,
            v,
            &self.material,
        ))
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
