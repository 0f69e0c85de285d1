//! Track generation constants
//!
//! Distances are expressed in meters and converted with [`METER_IN_GAME_UNITS`].

use std::f32::consts::{FRAC_PI_2, PI};

/// Game units per meter
pub const METER_IN_GAME_UNITS: f32 = 1.0;

/// Upper bound of the yaw deviation across one chunk (scaled by chaos)
pub const THETA_MAX: f32 = 0.8 * FRAC_PI_2;
/// Bound of the rotation of the deviation plane around the chunk axis
pub const PHI_MAX: f32 = PI;
/// Bound of the roll applied across one chunk (scaled by chaos)
pub const ROLL_MAX: f32 = 0.25 * PI;

pub const WIDTH_MIN: f32 = 20.0 * METER_IN_GAME_UNITS;
pub const WIDTH_MAX: f32 = 50.0 * METER_IN_GAME_UNITS;

/// Default bounding sphere radius range, in meters
pub const RADIUS_MIN_METER: f32 = 100.0;
pub const RADIUS_MAX_METER: f32 = 300.0;

pub const MIN_CHUNK_COUNT: u32 = 3;
pub const MAX_CHUNK_COUNT: u32 = 1000;

/// Node placements attempted before skeleton generation gives up
pub const MAX_TRY_COUNT: u32 = 10000;

pub const SPLINE_ORDER: u32 = 3;
/// Weight of the two inner control points sitting on the chunk center
pub const SPLINE_INNER_WEIGHT: f32 = 0.5;

pub const BONE_COUNT_PER_CHUNK: usize = 4;

/// Tolerance on the sum of skinning weights for one vertex
pub const WEIGHT_SUM_EPSILON: f32 = 1e-4;
