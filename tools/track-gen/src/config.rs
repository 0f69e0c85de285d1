//! track.toml parsing
//!
//! ```toml
//! [generation]
//! chunk_count = 60
//! chaos = 0.7
//!
//! [output]
//! directory = "out"
//! tesselation = 32
//!
//! [template]
//! length = 10.0
//! width = 12.0
//! thickness = 1.0
//! segments = 16
//! ```
//!
//! Every section and field is optional.

use anyhow::{Context, Result};
use neptune_trackgen::GenerationInfo;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub generation: GenerationInfo,
    pub output: OutputSection,
    pub template: TemplateSection,
}

/// Where and how finely the OBJ dumps are written
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub directory: PathBuf,
    /// Line segments per chunk spline
    pub tesselation: u32,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            tesselation: 32,
        }
    }
}

/// Straight road slab skinned onto every chunk
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplateSection {
    pub length: f32,
    pub width: f32,
    pub thickness: f32,
    pub segments: u32,
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            length: 10.0,
            width: 12.0,
            thickness: 1.0,
            segments: 16,
        }
    }
}

impl TrackConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read track config: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse track config")
    }
}
