//! Error type for track generation

/// Errors reported by the track generation pipeline
///
/// Every variant is a caller-side problem (bad configuration, mismatched
/// buffers) except [`TrackGenError::GenerationExhausted`], which means the
/// random walk could not place enough non-overlapping chunks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackGenError {
    #[error("invalid chunk count {count} (must be {min}-{max})")]
    InvalidChunkCount { count: u32, min: u32, max: u32 },

    #[error("{what} buffer holds {actual} entries, expected {expected}")]
    BufferSizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid chaos {0} (must be within 0.0-1.0)")]
    InvalidChaos(f32),

    #[error("invalid radius range {min}-{max} (must be positive and ordered)")]
    InvalidRadiusRange { min: f32, max: f32 },

    #[error("spline of order {order} needs more than {control_points} control points")]
    InvalidSplineOrder { order: u32, control_points: usize },

    #[error(
        "skeleton generation gave up after {tries} tries with {generated}/{chunk_count} chunks placed (chaos {chaos})"
    )]
    GenerationExhausted {
        tries: u32,
        chunk_count: u32,
        chaos: f32,
        generated: usize,
    },

    #[error("cannot skin an empty mesh")]
    EmptyMesh,

    #[error("invalid template mesh length {0} (must be > 0)")]
    InvalidMeshLength(f32),
}

pub type Result<T> = std::result::Result<T, TrackGenError>;

/// Check that a caller-provided output buffer matches the expected length
pub(crate) fn check_buffer_size(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(TrackGenError::BufferSizeMismatch {
            what,
            expected,
            actual,
        })
    }
}
