//! `lumen` - render a JSON scene description to an image file.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use lumen_core::SceneFile;

/// Offline Monte Carlo path tracer.
#[derive(Parser)]
#[command(name = "lumen", version, about)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image (.ppm, .png, .jpg)
    output: PathBuf,

    /// Seed for the sample streams; a fixed seed reproduces the exact image
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the scene's samples per pixel
    #[arg(long)]
    samples: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut scene = SceneFile::load(&args.scene)
        .with_context(|| format!("invalid scene {}", args.scene.display()))?;

    if let Some(samples) = args.samples {
        anyhow::ensure!(samples > 0, "--samples must be positive");
        scene.camera.samples_per_pixel = samples;
    }

    let (camera, world) = lumen_renderer::scene::build(&scene, args.seed)
        .with_context(|| format!("invalid scene {}", args.scene.display()))?;

    let film = lumen_renderer::render(&camera, &world, args.seed);

    output::save(&film, &args.output)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}
