//! Procedural race track generation
//!
//! The generator is a small forward pipeline over per-chunk data:
//!
//! 1. [`skeleton`] - constrained random walk placing one bounding sphere per
//!    chunk, backtracking whenever a new sphere overlaps an older one.
//! 2. [`spline`] - one rational cubic B-spline per chunk describing its
//!    centerline in chunk model space.
//! 3. [`skinning`] - a handful of bones per chunk sampled off the spline.
//! 4. [`mesh`] - linear-blend skinning of a straight template chunk mesh onto
//!    those bones, using weights derived from the vertex position alone.
//!
//! [`track::Track`] runs the whole pipeline and prepares the data handed to
//! the physics side; [`obj`] dumps every stage as Wavefront OBJ for debugging.
//!
//! # Example
//! ```no_run
//! use neptune_trackgen::{GenerationInfo, Track, generate_chunk_template, track_rng};
//!
//! let gen_info = GenerationInfo { chunk_count: 20, chaos: 0.6, ..Default::default() };
//! let mut rng = track_rng(Some(42));
//!
//! let (track, report) = Track::generate(&gen_info, &mut rng)?;
//! println!("generated in {} tries", report.try_count);
//!
//! let template = generate_chunk_template(10.0, 12.0, 1.0, 16);
//! let meshes = track.skin_chunk_meshes(&template, 10.0)?;
//! let collision = track.collision_geometry(&meshes);
//! # let _ = collision;
//! # Ok::<(), neptune_trackgen::TrackGenError>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod mesh;
pub mod obj;
pub mod rng;
pub mod skeleton;
pub mod skinning;
pub mod spline;
pub mod track;

pub use config::GenerationInfo;
pub use error::{Result, TrackGenError};
pub use mesh::{Mesh, compute_bone_weights, generate_chunk_template, skin_track_chunk_mesh};
pub use obj::{
    write_meshes_as_obj, write_track_bones_as_obj, write_track_skeleton_as_obj,
    write_track_splines_as_obj,
};
pub use rng::{TrackRng, track_rng};
pub use skeleton::{SkeletonGenerationReport, TrackSkeletonNode, generate_track_skeleton};
pub use skinning::{Bone, TrackSkinning, generate_track_skinning, generate_track_skinning_for_chunk};
pub use spline::{Spline, construct_spline, eval_spline, generate_track_splines};
pub use track::{CollisionGeometry, Track};
