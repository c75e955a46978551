//! Bounding volume hierarchy over the scene's primitives.
//!
//! Built once per scene, traversed once per sample per pixel. Nodes live in
//! a single arena and reference children by index, so the whole tree is two
//! flat allocations and traversal is read-only (no locks needed under the
//! parallel render loop).

use crate::hittable::{HitRecord, Hittable, Primitive};
use lumen_math::{Aabb, Interval, Ray};

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        primitive: usize,
    },
    Internal {
        bbox: Aabb,
        left: usize,
        right: usize,
    },
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Internal { bbox, .. } => *bbox,
        }
    }
}

/// Binary BVH using a median split along the longest axis of each range's
/// union box. No surface-area heuristic: split quality rides on the spatial
/// locality of the input, and pathological layouts degrade to deep trees.
#[derive(Debug)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitives: Vec<Primitive>,
    root: Option<usize>,
}

impl Bvh {
    /// Build a BVH over the given primitives.
    pub fn new(mut primitives: Vec<Primitive>) -> Self {
        let mut nodes = Vec::with_capacity(primitives.len().saturating_mul(2));
        let count = primitives.len();
        let root = if count == 0 {
            None
        } else {
            Some(Self::build(&mut nodes, &mut primitives, 0, count))
        };

        Self {
            nodes,
            primitives,
            root,
        }
    }

    /// Number of primitives indexed by the tree.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Recursively build the [start, end) range, returning the node index.
    fn build(
        nodes: &mut Vec<BvhNode>,
        primitives: &mut Vec<Primitive>,
        start: usize,
        end: usize,
    ) -> usize {
        let mut bbox = Aabb::EMPTY;
        for primitive in &primitives[start..end] {
            bbox = Aabb::surrounding(&bbox, &primitive.bounding_box());
        }

        let span = end - start;
        match span {
            1 => {
                nodes.push(BvhNode::Leaf {
                    bbox,
                    primitive: start,
                });
                nodes.len() - 1
            }
            2 => {
                // Two primitives split directly, no ordering needed.
                nodes.push(BvhNode::Leaf {
                    bbox: primitives[start].bounding_box(),
                    primitive: start,
                });
                let left = nodes.len() - 1;
                nodes.push(BvhNode::Leaf {
                    bbox: primitives[start + 1].bounding_box(),
                    primitive: start + 1,
                });
                let right = nodes.len() - 1;

                nodes.push(BvhNode::Internal { bbox, left, right });
                nodes.len() - 1
            }
            _ => {
                // Order the range by bounding-box minimum along the widest
                // axis of the union box, then split at the median.
                let axis = bbox.longest_axis();
                primitives[start..end].sort_unstable_by(|a, b| {
                    let a_min = a.bounding_box().axis_interval(axis).min;
                    let b_min = b.bounding_box().axis_interval(axis).min;
                    a_min.partial_cmp(&b_min).unwrap_or(std::cmp::Ordering::Equal)
                });

                let mid = start + span / 2;
                let left = Self::build(nodes, primitives, start, mid);
                let right = Self::build(nodes, primitives, mid, end);

                nodes.push(BvhNode::Internal { bbox, left, right });
                nodes.len() - 1
            }
        }
    }

    fn hit_node(&self, index: usize, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match &self.nodes[index] {
            BvhNode::Leaf { primitive, .. } => self.primitives[*primitive].hit(ray, ray_t),

            BvhNode::Internal { bbox, left, right } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                // Search the right subtree only up to the left hit, so the
                // nearer of two overlapping hits wins without a comparison
                // pass afterwards.
                let left_hit = self.hit_node(*left, ray, ray_t);
                let right_max = left_hit.as_ref().map_or(ray_t.max, |rec| rec.t);
                let right_hit = self.hit_node(*right, ray, Interval::new(ray_t.min, right_max));

                right_hit.or(left_hit)
            }
        }
    }
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.root.and_then(|root| self.hit_node(root, ray, ray_t))
    }

    fn bounding_box(&self) -> Aabb {
        self.root
            .map(|root| self.nodes[root].bbox())
            .unwrap_or(Aabb::EMPTY)
    }
}
