//! Track generator CLI
//!
//! Generates a procedural track and dumps every pipeline stage as OBJ:
//!
//! - `skeleton.obj` - chunk centers
//! - `splines.obj` - chunk centerlines
//! - `bones.obj` - chunk bones
//! - `track.obj` - skinned road meshes
//!
//! ```bash
//! track-gen --seed 42 --chunk-count 80 --chaos 0.6 --output out
//! track-gen --config track.toml
//! ```

mod config;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use neptune_trackgen::{
    Track, generate_chunk_template, track_rng, write_meshes_as_obj, write_track_bones_as_obj,
    write_track_skeleton_as_obj, write_track_splines_as_obj,
};
use tracing::info;

use config::TrackConfig;

/// Generate a procedural race track
#[derive(Parser)]
#[command(name = "track-gen")]
#[command(about = "Generate a procedural race track and dump it as OBJ")]
#[command(version)]
struct Cli {
    /// Track config (track.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible tracks (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of chunks, overrides the config
    #[arg(long)]
    chunk_count: Option<u32>,

    /// Randomness of turns and roll (0.0-1.0), overrides the config
    #[arg(long)]
    chaos: Option<f32>,

    /// Output directory, overrides the config
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Line segments per chunk spline, overrides the config
    #[arg(long)]
    tesselation: Option<u32>,
}

impl Cli {
    fn into_config(self) -> Result<(TrackConfig, Option<u64>)> {
        let mut config = match &self.config {
            Some(path) => TrackConfig::load(path)?,
            None => TrackConfig::default(),
        };

        if let Some(chunk_count) = self.chunk_count {
            config.generation.chunk_count = chunk_count;
        }
        if let Some(chaos) = self.chaos {
            config.generation.chaos = chaos;
        }
        if let Some(output) = self.output {
            config.output.directory = output;
        }
        if let Some(tesselation) = self.tesselation {
            config.output.tesselation = tesselation;
        }

        Ok((config, self.seed))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, seed) = Cli::parse().into_config()?;
    run(&config, seed)
}

fn run(config: &TrackConfig, seed: Option<u64>) -> Result<()> {
    let mut rng = track_rng(seed);

    let (track, report) = Track::generate(&config.generation, &mut rng).context("Track generation failed")?;
    info!(
        chunks = track.chunk_count(),
        tries = report.try_count,
        backtracks = report.backtrack_count,
        "Generated track"
    );

    let template = &config.template;
    let template_mesh = generate_chunk_template(template.length, template.width, template.thickness, template.segments);
    let mut meshes = track
        .skin_chunk_meshes(&template_mesh, template.length)
        .context("Chunk skinning failed")?;
    track.place_chunk_meshes(&mut meshes);

    let dir = &config.output.directory;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    write_obj(&dir.join("skeleton.obj"), |out| {
        write_track_skeleton_as_obj(out, &track.skeleton_nodes)
    })?;
    write_obj(&dir.join("splines.obj"), |out| {
        write_track_splines_as_obj(out, &track.skeleton_nodes, &track.splines, config.output.tesselation)
    })?;
    write_obj(&dir.join("bones.obj"), |out| {
        write_track_bones_as_obj(out, &track.skeleton_nodes, &track.skinning)
    })?;
    write_obj(&dir.join("track.obj"), |out| write_meshes_as_obj(out, &meshes))?;

    info!("Wrote OBJ files to {}", dir.display());
    Ok(())
}

fn write_obj(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    write(&mut out)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write {}", path.display()))
}
