//! Intersection protocol: hit records, the `Hittable` contract, the closed
//! primitive set, and the flat list aggregate.

use crate::material::Material;
use crate::quad::Quad;
use crate::sphere::Sphere;
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// Transient output of a single intersection query: each nested query
/// produces a fresh record, so callers copy out whatever they need before
/// querying again.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at the intersection (always points against the ray)
    pub normal: Vec3,
    /// Ray parameter t where the intersection occurs
    pub t: f32,
    /// UV surface coordinates for texture lookup
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// Build a record from the geometric outward normal.
    ///
    /// The stored normal is flipped to oppose the ray direction, and
    /// `front_face` records which side was struck.
    pub fn new(
        ray: &Ray,
        outward_normal: Vec3,
        p: Vec3,
        t: f32,
        u: f32,
        v: f32,
        material: &'a Material,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            p,
            normal,
            t,
            u,
            v,
            front_face,
            material,
        }
    }
}

/// Contract shared by everything a ray can intersect: primitives, the flat
/// list aggregate, and the BVH.
pub trait Hittable: Send + Sync {
    /// Nearest intersection within `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Tight axis-aligned bounding box.
    fn bounding_box(&self) -> Aabb;
}

/// The closed set of concrete shapes.
///
/// A compound box is not a variant of its own: it expands into six quads at
/// scene build time (see `make_box`).
#[derive(Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
}

impl Hittable for Primitive {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Primitive::Sphere(sphere) => sphere.hit(ray, ray_t),
            Primitive::Quad(quad) => quad.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(sphere) => sphere.bounding_box(),
            Primitive::Quad(quad) => quad.bounding_box(),
        }
    }
}

/// A flat list of primitives scanned linearly.
///
/// Exhaustive counterpart of the BVH: same nearest-hit result, no culling.
pub struct HittableList {
    objects: Vec<Primitive>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add a primitive to the list.
    pub fn add(&mut self, object: Primitive) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Primitive> for HittableList {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest_so_far = ray_t.max;
        let mut closest_hit = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, closest_so_far)) {
                closest_so_far = rec.t;
                closest_hit = Some(rec);
            }
        }

        closest_hit
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
