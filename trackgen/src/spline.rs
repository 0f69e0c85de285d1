//! Rational B-splines and per-chunk centerline fitting
//!
//! Control points are `Vec4`s whose `w` is a blend weight, not a homogeneous
//! coordinate: evaluation sums `basis * weight * position` and divides by the
//! sum of `basis * weight`.

use glam::{Vec3, Vec4};

use crate::constants::{SPLINE_INNER_WEIGHT, SPLINE_ORDER};
use crate::error::{Result, TrackGenError, check_buffer_size};
use crate::skeleton::TrackSkeletonNode;

/// Clamped B-spline curve
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// Polynomial degree
    pub order: u32,
    /// Positions in xyz, blend weight in w
    pub control_points: Vec<Vec4>,
    /// `control_points.len() + order + 1` knots, clamped at 0.0 and 1.0
    pub knots: Vec<f32>,
}

impl Default for Spline {
    fn default() -> Self {
        Self {
            order: SPLINE_ORDER,
            control_points: Vec::new(),
            knots: Vec::new(),
        }
    }
}

/// Build a clamped B-spline through `control_points`
///
/// The first and last `order + 1` knots are 0.0 and 1.0 so the curve starts
/// and ends exactly on the first and last control points. Interior knots are
/// evenly spaced.
pub fn construct_spline(order: u32, control_points: &[Vec4]) -> Result<Spline> {
    let point_count = control_points.len();
    let degree = order as usize;

    if order == 0 || point_count <= degree {
        return Err(TrackGenError::InvalidSplineOrder {
            order,
            control_points: point_count,
        });
    }

    let knot_count = point_count + degree + 1;
    let mut knots = vec![0.0f32; knot_count];

    for i in 0..=degree {
        knots[i] = 0.0;
        knots[knot_count - 1 - i] = 1.0;
    }

    let span_count = point_count - degree;
    for i in 1..span_count {
        knots[degree + i] = i as f32 / span_count as f32;
    }

    Ok(Spline {
        order,
        control_points: control_points.to_vec(),
        knots,
    })
}

/// Evaluate `spline` at `t`, clamped to [0, 1]
///
/// Plain Cox-de Boor recursion over every control point.
pub fn eval_spline(spline: &Spline, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);

    let mut result = Vec3::ZERO;
    let mut sum = 0.0f32;

    for (i, point) in spline.control_points.iter().enumerate() {
        let coeff = basis(&spline.knots, i, spline.order as usize, t) * point.w;

        result += point.truncate() * coeff;
        sum += coeff;
    }

    if sum > 0.0 { result / sum } else { result }
}

fn basis(knots: &[f32], i: usize, degree: usize, t: f32) -> f32 {
    if degree == 0 {
        return basis_step(knots, i, t);
    }

    let mut res = 0.0f32;

    // Zero-width spans contribute nothing
    let left_span = knots[i + degree] - knots[i];
    if left_span > 0.0 {
        let ratio = (t - knots[i]) / left_span;
        if ratio != 0.0 {
            res += ratio * basis(knots, i, degree - 1, t);
        }
    }

    let right_span = knots[i + degree + 1] - knots[i + 1];
    if right_span > 0.0 {
        let ratio = (knots[i + degree + 1] - t) / right_span;
        if ratio != 0.0 {
            res += ratio * basis(knots, i + 1, degree - 1, t);
        }
    }

    res
}

fn basis_step(knots: &[f32], i: usize, t: f32) -> f32 {
    let (lo, hi) = (knots[i], knots[i + 1]);

    if lo < hi && t >= lo && (t < hi || (t == hi && is_last_span(knots, i))) {
        1.0
    } else {
        0.0
    }
}

/// Whether no non-empty span follows span `i`, so it owns `t == 1.0`
fn is_last_span(knots: &[f32], i: usize) -> bool {
    knots[i + 1..].windows(2).all(|w| w[0] == w[1])
}

/// Fit one spline per chunk in chunk model space
///
/// One control point sits on each end of the chunk and two lighter ones on
/// the sphere center, which pulls the curve into a smooth bend.
pub fn generate_track_splines(skeleton_nodes: &[TrackSkeletonNode], splines: &mut [Spline]) -> Result<()> {
    check_buffer_size("spline", skeleton_nodes.len(), splines.len())?;

    for (node, spline) in skeleton_nodes.iter().zip(splines.iter_mut()) {
        *spline = chunk_spline(node.radius, node.rotation_ls * Vec3::X)?;
    }

    Ok(())
}

/// Centerline of a chunk of `radius` whose exit points along `exit_direction`
pub(crate) fn chunk_spline(radius: f32, exit_direction: Vec3) -> Result<Spline> {
    let control_points = [
        (Vec3::X * -radius).extend(1.0),
        Vec3::ZERO.extend(SPLINE_INNER_WEIGHT),
        Vec3::ZERO.extend(SPLINE_INNER_WEIGHT),
        (exit_direction * radius).extend(1.0),
    ];

    construct_spline(SPLINE_ORDER, &control_points)
}
