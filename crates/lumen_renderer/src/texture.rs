//! Texture lookup: the closed set of color sources materials sample from.

use std::sync::Arc;

use crate::material::Color;
use crate::perlin::Perlin;
use lumen_math::{Interval, Vec3};
use lumen_core::ImageData;

/// A color source sampled at a surface parameter pair plus the 3-D hit point.
///
/// Procedural variants use the point, mapped variants use (u, v). Shared
/// between materials through `Arc` (a checker's sub-textures may themselves
/// be shared table entries).
#[derive(Debug)]
pub enum Texture {
    Solid {
        albedo: Color,
    },
    /// 3-D checker: parity of the floored, scaled hit point selects one of
    /// two sub-textures.
    Checker {
        inv_scale: f32,
        even: Arc<Texture>,
        odd: Arc<Texture>,
    },
    /// Nearest-pixel lookup into a decoded image.
    Image { image: Arc<ImageData> },
    /// Marble-like pattern driven by turbulence phase-shifting a sine.
    Noise { perlin: Perlin, scale: f32 },
}

impl Texture {
    pub fn solid(albedo: Color) -> Self {
        Texture::Solid { albedo }
    }

    /// Checker with squares of the given world-space scale.
    pub fn checker(scale: f32, even: Arc<Texture>, odd: Arc<Texture>) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn image(image: Arc<ImageData>) -> Self {
        Texture::Image { image }
    }

    pub fn noise(perlin: Perlin, scale: f32) -> Self {
        Texture::Noise { perlin, scale }
    }

    /// Sample the texture color.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid { albedo } => *albedo,

            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let xi = (inv_scale * p.x).floor() as i64;
                let yi = (inv_scale * p.y).floor() as i64;
                let zi = (inv_scale * p.z).floor() as i64;

                if (xi + yi + zi) % 2 == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }

            Texture::Image { image } => {
                if image.is_empty() {
                    // Solid cyan flags a missing image in the output.
                    return Color::new(0.0, 1.0, 1.0);
                }

                let unit = Interval::new(0.0, 1.0);
                let u = unit.clamp(u);
                let v = 1.0 - unit.clamp(v); // image rows run top-down

                let x = (u * image.width as f32) as u32;
                let y = (v * image.height as f32) as u32;
                Color::from_array(image.pixel(x, y))
            }

            Texture::Noise { perlin, scale } => {
                Color::splat(0.5) * (1.0 + (scale * p.z + 10.0 * perlin.turb(p, 7)).sin())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_ignores_coordinates() {
        let tex = Texture::solid(Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value(0.0, 0.0, Vec3::ZERO), Color::new(0.2, 0.4, 0.6));
        assert_eq!(
            tex.value(0.9, 0.1, Vec3::new(5.0, -3.0, 2.0)),
            Color::new(0.2, 0.4, 0.6)
        );
    }

    #[test]
    fn test_checker_parity() {
        let even = Arc::new(Texture::solid(Color::ZERO));
        let odd = Arc::new(Texture::solid(Color::ONE));
        let tex = Texture::checker(1.0, even, odd);

        // Cell (0,0,0) is even, stepping one unit along x flips parity.
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5)), Color::ZERO);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5)), Color::ONE);

        // Diagonal step flips parity once more, back to even.
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(1.5, 1.5, 0.5)), Color::ZERO);
    }

    #[test]
    fn test_image_nearest_lookup() {
        let image = Arc::new(ImageData::from_pixels(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0], // top-left
                [0.0, 1.0, 0.0], // top-right
                [0.0, 0.0, 1.0], // bottom-left
                [1.0, 1.0, 1.0], // bottom-right
            ],
        ));
        let tex = Texture::image(image);

        // v = 1 is the top image row, v = 0 the bottom.
        assert_eq!(tex.value(0.1, 0.9, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.9, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.1, 0.1, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(0.9, 0.1, Vec3::ZERO), Color::new(1.0, 1.0, 1.0));

        // Out-of-range coordinates clamp instead of wrapping.
        assert_eq!(tex.value(2.0, -1.0, Vec3::ZERO), Color::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty_image_yields_sentinel() {
        let tex = Texture::image(Arc::new(ImageData::from_pixels(0, 0, Vec::new())));
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_noise_stays_in_unit_range() {
        let mut rng = SmallRng::seed_from_u64(9);
        let tex = Texture::noise(Perlin::new(&mut rng), 4.0);

        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.53);
            let c = tex.value(0.0, 0.0, p);
            for channel in [c.x, c.y, c.z] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }
}
