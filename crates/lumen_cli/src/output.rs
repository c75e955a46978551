//! Image output: PPM text or a compressed raster via the `image` crate,
//! chosen by output file extension.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use lumen_renderer::Film;

/// Encode the film to the given path.
///
/// `.ppm` writes the plain-text P3 format; `.png`, `.jpg`, and `.jpeg`
/// go through the `image` crate.
pub fn save(film: &Film, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "ppm" => save_ppm(film, path),
        "png" | "jpg" | "jpeg" => save_raster(film, path),
        other => Err(anyhow!(
            "unsupported output format \"{other}\" (expected ppm, png, jpg, or jpeg)"
        )),
    }
}

/// Write the plain-text P3 format: header, then row-major RGB triples.
fn save_ppm(film: &Film, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "P3")?;
    writeln!(out, "{} {}", film.width, film.height)?;
    writeln!(out, "255")?;

    for pixel in film.to_rgb8().chunks_exact(3) {
        writeln!(out, "{} {} {}", pixel[0], pixel[1], pixel[2])?;
    }

    out.flush()?;
    Ok(())
}

fn save_raster(film: &Film, path: &Path) -> Result<()> {
    let buffer = image::RgbImage::from_raw(film.width, film.height, film.to_rgb8())
        .ok_or_else(|| anyhow!("film dimensions do not match the pixel buffer"))?;
    buffer
        .save(path)
        .with_context(|| format!("failed to write image {}", path.display()))?;
    Ok(())
}
