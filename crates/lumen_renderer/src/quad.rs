//! Planar parallelogram primitive and the compound box helper.

use std::sync::Arc;

use crate::hittable::{HitRecord, Primitive};
use crate::material::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// A parallelogram patch: corner `q` plus edge vectors `u` and `v`.
///
/// The plane equation and the basis helper `w` are precomputed so a hit test
/// is one division plus two dot/cross pairs.
#[derive(Debug)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    normal: Vec3,
    d: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Quad {
    /// Create a quad from its corner and two edge vectors.
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize();
        let d = normal.dot(q);
        let w = n / n.dot(n);

        // Box both diagonals; their union covers any orientation.
        let bbox = Aabb::surrounding(
            &Aabb::from_points(q, q + u + v),
            &Aabb::from_points(q + u, q + v),
        );

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            material,
            bbox,
        }
    }

    /// Create a quad centered on `center` instead of cornered at `q`.
    pub fn from_center(center: Vec3, u: Vec3, v: Vec3, material: Arc<Material>) -> Self {
        Self::new(center - u / 2.0 - v / 2.0, u, v, material)
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.dot(ray.direction);

        // Ray parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        // Planar coordinates of the hit point against the edge basis; the
        // unit square bounds the infinite plane to the parallelogram.
        let intersection = ray.at(t);
        let planar_hit = intersection - self.q;
        let alpha = self.w.dot(planar_hit.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hit));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            self.normal,
            intersection,
            t,
            alpha,
            beta,
            &self.material,
        ))
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Expand an axis-aligned box into its six quad faces.
///
/// `size` gives the extents along x, y, z. The faces are independent
/// primitives; the aggregate needs no special handling for them.
pub fn make_box(center: Vec3, size: Vec3, material: Arc<Material>) -> Vec<Primitive> {
    let width = Vec3::new(size.x, 0.0, 0.0);
    let height = Vec3::new(0.0, size.y, 0.0);
    let length = Vec3::new(0.0, 0.0, size.z);

    vec![
        Primitive::Quad(Quad::from_center(center - length / 2.0, width, height, material.clone())),
        Primitive::Quad(Quad::from_center(center + length / 2.0, width, height, material.clone())),
        Primitive::Quad(Quad::from_center(center - width / 2.0, length, height, material.clone())),
        Primitive::Quad(Quad::from_center(center + width / 2.0, length, height, material.clone())),
        Primitive::Quad(Quad::from_center(center - height / 2.0, width, length, material.clone())),
        Primitive::Quad(Quad::from_center(center + height / 2.0, width, length, material)),
    ]
}
