//! Texture image loading.
//!
//! Decodes image files into linear RGB float pixels for the renderer's
//! image-backed textures. Loading failures are reported to the caller, which
//! decides whether to abort or degrade (the renderer substitutes a sentinel
//! color so a missing asset never kills a long render).

use std::path::Path;

use thiserror::Error;

/// Error returned when a texture image cannot be decoded.
#[derive(Debug, Error)]
#[error("failed to load texture image {path}: {source}")]
pub struct ImageLoadError {
    pub path: String,
    #[source]
    pub source: image::ImageError,
}

/// A decoded texture image.
///
/// Pixels are linear RGB floats in [0, 1], row-major from the top-left.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 3]>,
}

impl ImageData {
    /// Decode an image file, converting sRGB bytes to linear floats.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageLoadError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| ImageLoadError {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| [srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])])
            .collect();

        log::debug!("loaded texture image {} ({}x{})", path.display(), width, height);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image from raw pixel data. Used by tests and procedural
    /// callers; `pixels` must hold `width * height` entries.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// True when there is no pixel data to sample.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at integer coordinates, clamped to the image bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0])
    }
}

/// Convert an sRGB byte value to a linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_lookup_clamps() {
        let data = ImageData::from_pixels(
            2,
            2,
            vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0],
            ],
        );

        assert_eq!(data.pixel(0, 0), [1.0, 0.0, 0.0]);
        assert_eq!(data.pixel(1, 1), [1.0, 1.0, 1.0]);

        // Out-of-range coordinates clamp to the last row/column.
        assert_eq!(data.pixel(5, 0), [0.0, 1.0, 0.0]);
        assert_eq!(data.pixel(0, 5), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ImageData::load("/nonexistent/texture.png").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/texture.png"));
    }

    #[test]
    fn test_srgb_to_linear() {
        // Black stays black
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);

        // White stays white
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
