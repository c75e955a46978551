//! Perlin gradient noise and turbulence.

use crate::random::random_unit_vector;
use lumen_math::Vec3;
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// A seeded Perlin lattice: 256 random unit gradients indexed through three
/// xor-combined permutation tables.
#[derive(Debug)]
pub struct Perlin {
    randvec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let randvec = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();

        Self {
            randvec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    /// Smoothed gradient noise in [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i32;
        let j = p.y.floor() as i32;
        let k = p.z.floor() as i32;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    *corner = self.randvec[self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize]];
                }
            }
        }

        Self::perlin_interp(&c, u, v, w)
    }

    /// Multi-octave turbulence: |sum of halving-weight, doubling-frequency
    /// noise samples|. Always non-negative.
    pub fn turb(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }

    fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
        let mut p: Vec<usize> = (0..POINT_COUNT).collect();

        // Fisher-Yates
        for i in (1..POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            p.swap(i, target);
        }

        p
    }

    fn perlin_interp(c: &[[[Vec3; 2]; 2]; 2], u: f32, v: f32, w: f32) -> f32 {
        // Hermite smoothing removes the grid-aligned banding of straight
        // trilinear interpolation.
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);
        let mut accum = 0.0;

        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, corner) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                    let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * corner.dot(weight_v);
                }
            }
        }

        accum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_bounded() {
        let mut rng = SmallRng::seed_from_u64(11);
        let perlin = Perlin::new(&mut rng);

        for _ in 0..200 {
            let p = Vec3::new(
                crate::random::gen_range(&mut rng, -20.0, 20.0),
                crate::random::gen_range(&mut rng, -20.0, 20.0),
                crate::random::gen_range(&mut rng, -20.0, 20.0),
            );
            let n = perlin.noise(p);
            assert!((-1.0..=1.0).contains(&n), "noise out of range: {n}");
        }
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        let a = Perlin::new(&mut rng_a);
        let b = Perlin::new(&mut rng_b);

        let p = Vec3::new(1.3, -2.7, 0.4);
        assert_eq!(a.noise(p), b.noise(p));
        assert_eq!(a.turb(p, 7), b.turb(p, 7));
    }

    #[test]
    fn test_turbulence_non_negative_and_bounded() {
        let mut rng = SmallRng::seed_from_u64(11);
        let perlin = Perlin::new(&mut rng);

        for _ in 0..200 {
            let p = Vec3::new(
                crate::random::gen_range(&mut rng, -20.0, 20.0),
                crate::random::gen_range(&mut rng, -20.0, 20.0),
                crate::random::gen_range(&mut rng, -20.0, 20.0),
            );
            let t = perlin.turb(p, 7);
            // Geometric series of [-1, 1] octaves stays under 2.
            assert!((0.0..2.0).contains(&t), "turbulence out of range: {t}");
        }
    }
}
