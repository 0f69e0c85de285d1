//! Track skeleton generation
//!
//! Each chunk of the track is a bounding sphere. The track enters a sphere on
//! its surface, bends by a random rotation while crossing it, and leaves on
//! the opposite side where the next sphere starts. Spheres are not allowed to
//! overlap: when a new one does, everything after the sphere it hit is thrown
//! away and the walk resumes from there.

use glam::{Affine3A, Quat, Vec3};
use rand::Rng;
use tracing::{debug, error, info};

use crate::config::GenerationInfo;
use crate::constants::{MAX_TRY_COUNT, PHI_MAX, ROLL_MAX, THETA_MAX, WIDTH_MAX, WIDTH_MIN};
use crate::error::{Result, TrackGenError, check_buffer_size};

/// Placement of one track chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSkeletonNode {
    /// Bounding sphere radius, also half the chunk length
    pub radius: f32,
    pub in_width: f32,
    pub out_width: f32,

    /// Angles the chunk end rotation was built from
    pub phi_angle: f32,
    pub theta_angle: f32,
    pub roll_angle: f32,

    /// Rotation across the chunk, in chunk model space
    pub rotation_ls: Quat,
    /// Orientation of the chunk model space at the entry plane
    pub orientation_ms_to_ws: Quat,
    /// Bounding sphere center
    pub center_ws: Vec3,

    /// Frame placed on the tangent plane where the track enters the sphere
    pub in_transform_ms_to_ws: Affine3A,
    /// Frame where the track leaves the sphere, equal to the next node's `in`
    pub out_transform_ms_to_ws: Affine3A,

    pub in_transform_ws_to_ms: Affine3A,
    pub out_transform_ws_to_ms: Affine3A,
}

impl Default for TrackSkeletonNode {
    fn default() -> Self {
        Self {
            radius: 0.0,
            in_width: 0.0,
            out_width: 0.0,
            phi_angle: 0.0,
            theta_angle: 0.0,
            roll_angle: 0.0,
            rotation_ls: Quat::IDENTITY,
            orientation_ms_to_ws: Quat::IDENTITY,
            center_ws: Vec3::ZERO,
            in_transform_ms_to_ws: Affine3A::IDENTITY,
            out_transform_ms_to_ws: Affine3A::IDENTITY,
            in_transform_ws_to_ms: Affine3A::IDENTITY,
            out_transform_ws_to_ms: Affine3A::IDENTITY,
        }
    }
}

impl TrackSkeletonNode {
    /// Build a node entering through `in_transform_ms_to_ws`
    ///
    /// The center sits `radius` ahead of the entry frame along its X axis.
    pub fn from_entry(
        in_transform_ms_to_ws: Affine3A,
        radius: f32,
        in_width: f32,
        out_width: f32,
        angles: ChunkAngles,
    ) -> Self {
        let (_, orientation_ms_to_ws, entry_ws) = in_transform_ms_to_ws.to_scale_rotation_translation();
        let rotation_ls = angles.rotation();

        let center_ws = entry_ws + orientation_ms_to_ws * (Vec3::X * radius);

        let out_orientation = orientation_ms_to_ws * rotation_ls;
        let exit_ws = center_ws + out_orientation * (Vec3::X * radius);
        let out_transform_ms_to_ws = Affine3A::from_rotation_translation(out_orientation, exit_ws);

        Self {
            radius,
            in_width,
            out_width,
            phi_angle: angles.phi,
            theta_angle: angles.theta,
            roll_angle: angles.roll,
            rotation_ls,
            orientation_ms_to_ws,
            center_ws,
            in_transform_ms_to_ws,
            out_transform_ms_to_ws,
            in_transform_ws_to_ms: in_transform_ms_to_ws.inverse(),
            out_transform_ws_to_ms: out_transform_ms_to_ws.inverse(),
        }
    }

    /// Whether the bounding spheres of `self` and `other` overlap
    pub fn overlaps(&self, other: &TrackSkeletonNode) -> bool {
        let min_distance = self.radius + other.radius;
        self.center_ws.distance_squared(other.center_ws) < min_distance * min_distance
    }
}

/// Angles describing how the track turns across a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChunkAngles {
    /// Rotation of the turn plane around the chunk axis
    pub phi: f32,
    /// Turn angle within that plane
    pub theta: f32,
    /// Roll accumulated across the chunk
    pub roll: f32,
}

impl ChunkAngles {
    /// Chunk end rotation in chunk model space
    ///
    /// Turns by `theta` in the plane rotated by `phi`, then undoes `phi` around
    /// the new forward axis so only `roll` remains as twist.
    pub fn rotation(&self) -> Quat {
        let deviation = Quat::from_axis_angle(Vec3::X, self.phi) * Quat::from_axis_angle(Vec3::Z, self.theta);
        let roll_fixup = Quat::from_axis_angle(deviation * Vec3::X, -self.phi + self.roll);

        roll_fixup * deviation
    }

    /// Sample angles within chaos-scaled bounds
    ///
    /// `phi` always spans the full circle, only `theta` and `roll` scale with
    /// chaos.
    pub fn sample<R: Rng + ?Sized>(chaos: f32, rng: &mut R) -> Self {
        let theta = rng.random_range(0.0..=THETA_MAX * chaos);
        let phi = rng.random_range(-PHI_MAX..=PHI_MAX);
        let roll = rng.random_range(-ROLL_MAX * chaos..=ROLL_MAX * chaos);

        Self { phi, theta, roll }
    }
}

/// Statistics of a successful skeleton generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkeletonGenerationReport {
    /// Candidate nodes generated, including rejected ones
    pub try_count: u32,
    /// Candidates rejected because they overlapped an earlier node
    pub backtrack_count: u32,
}

/// Fill `skeleton_nodes` with a non self-intersecting chain of chunks
///
/// `skeleton_nodes` must hold exactly `gen_info.chunk_count` entries. On
/// collision the already written nodes past the collider are discarded and
/// overwritten by later candidates.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if the buffer size does
/// not match, or if no complete track could be placed within
/// [`MAX_TRY_COUNT`] candidates. The buffer content is unspecified on error.
pub fn generate_track_skeleton<R: Rng + ?Sized>(
    gen_info: &GenerationInfo,
    skeleton_nodes: &mut [TrackSkeletonNode],
    rng: &mut R,
) -> Result<SkeletonGenerationReport> {
    generate_track_skeleton_with_budget(gen_info, skeleton_nodes, rng, MAX_TRY_COUNT)
}

pub(crate) fn generate_track_skeleton_with_budget<R: Rng + ?Sized>(
    gen_info: &GenerationInfo,
    skeleton_nodes: &mut [TrackSkeletonNode],
    rng: &mut R,
    max_tries: u32,
) -> Result<SkeletonGenerationReport> {
    gen_info.validate()?;
    check_buffer_size("skeleton node", gen_info.chunk_count as usize, skeleton_nodes.len())?;

    let radius_range = gen_info.radius_range()?;
    let chunk_count = skeleton_nodes.len();

    let mut report = SkeletonGenerationReport::default();
    let mut current_node_index = 0usize;

    while current_node_index < chunk_count && report.try_count < max_tries {
        let generated_nodes = &skeleton_nodes[..current_node_index];
        let new_node = generate_node(gen_info, radius_range, generated_nodes, rng);

        if let Some(collider_index) = find_collider(generated_nodes, &new_node) {
            debug!(
                collider_index,
                discarded = current_node_index - collider_index - 1,
                "track node collision, backtracking"
            );
            current_node_index = collider_index + 1;
            report.backtrack_count += 1;
        } else {
            skeleton_nodes[current_node_index] = new_node;
            current_node_index += 1;
        }

        report.try_count += 1;
    }

    if current_node_index < chunk_count {
        error!(
            chaos = gen_info.chaos,
            chunk_count,
            generated = current_node_index,
            "track skeleton generation exhausted its retry budget"
        );
        return Err(TrackGenError::GenerationExhausted {
            tries: report.try_count,
            chunk_count: gen_info.chunk_count,
            chaos: gen_info.chaos,
            generated: current_node_index,
        });
    }

    info!(
        chunk_count,
        tries = report.try_count,
        backtracks = report.backtrack_count,
        "generated track skeleton"
    );

    Ok(report)
}

fn generate_node<R: Rng + ?Sized>(
    gen_info: &GenerationInfo,
    (radius_min, radius_max): (f32, f32),
    generated_nodes: &[TrackSkeletonNode],
    rng: &mut R,
) -> TrackSkeletonNode {
    let radius = rng.random_range(radius_min..=radius_max);

    let (in_transform, in_width) = match generated_nodes.last() {
        Some(previous) => (previous.out_transform_ms_to_ws, previous.out_width),
        None => (Affine3A::IDENTITY, rng.random_range(WIDTH_MIN..=WIDTH_MAX)),
    };

    let angles = ChunkAngles::sample(gen_info.chaos, rng);
    let out_width = rng.random_range(WIDTH_MIN..=WIDTH_MAX);

    TrackSkeletonNode::from_entry(in_transform, radius, in_width, out_width, angles)
}

/// First node overlapping `node`, ignoring the immediate predecessor
///
/// The predecessor touches `node` by construction, testing it would only
/// report rounding noise.
fn find_collider(generated_nodes: &[TrackSkeletonNode], node: &TrackSkeletonNode) -> Option<usize> {
    let candidates = generated_nodes.len().saturating_sub(1);

    generated_nodes[..candidates]
        .iter()
        .position(|other| node.overlaps(other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::track_rng;

    const EPSILON: f32 = 1e-3;
    // Coordinates reach thousands of units, where an f32 ulp is ~1e-3
    const POSITION_TOLERANCE: f32 = 0.05;

    fn generate(chunk_count: u32, chaos: f32, seed: u64) -> (Vec<TrackSkeletonNode>, SkeletonGenerationReport) {
        let gen_info = GenerationInfo {
            chunk_count,
            chaos,
            ..Default::default()
        };
        let mut nodes = vec![TrackSkeletonNode::default(); chunk_count as usize];
        let report = generate_track_skeleton(&gen_info, &mut nodes, &mut track_rng(Some(seed))).unwrap();
        (nodes, report)
    }

    #[test]
    fn test_rotation_identity_without_turn() {
        let angles = ChunkAngles {
            phi: 1.2,
            theta: 0.0,
            roll: 0.0,
        };
        assert!(angles.rotation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_rotation_turns_forward_axis_by_theta() {
        let angles = ChunkAngles {
            phi: 0.7,
            theta: 0.4,
            roll: 0.1,
        };
        let forward = angles.rotation() * Vec3::X;
        assert!((forward.angle_between(Vec3::X) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_from_entry_places_center_and_exit() {
        let node = TrackSkeletonNode::from_entry(Affine3A::IDENTITY, 10.0, 20.0, 30.0, ChunkAngles::default());

        assert!(node.center_ws.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-6));
        assert!(
            Vec3::from(node.out_transform_ms_to_ws.translation).abs_diff_eq(Vec3::new(20.0, 0.0, 0.0), 1e-6)
        );
        assert!(node.in_transform_ws_to_ms.abs_diff_eq(Affine3A::IDENTITY, 1e-6));
    }

    #[test]
    fn test_overlaps() {
        let a = TrackSkeletonNode {
            radius: 5.0,
            ..Default::default()
        };
        let b = TrackSkeletonNode {
            radius: 5.0,
            center_ws: Vec3::new(9.0, 0.0, 0.0),
            ..Default::default()
        };
        let c = TrackSkeletonNode {
            radius: 5.0,
            center_ws: Vec3::new(11.0, 0.0, 0.0),
            ..Default::default()
        };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_find_collider_skips_predecessor() {
        let far = TrackSkeletonNode {
            radius: 1.0,
            center_ws: Vec3::new(100.0, 0.0, 0.0),
            ..Default::default()
        };
        let near = TrackSkeletonNode {
            radius: 1.0,
            ..Default::default()
        };
        let candidate = TrackSkeletonNode {
            radius: 1.0,
            center_ws: Vec3::new(0.5, 0.0, 0.0),
            ..Default::default()
        };

        assert_eq!(find_collider(&[far, near], &candidate), None);
        assert_eq!(find_collider(&[near, far, far], &candidate), Some(0));
        assert_eq!(find_collider(&[], &candidate), None);
    }

    #[test]
    fn test_generates_requested_chunk_count() {
        let (nodes, report) = generate(50, 1.0, 1234);

        assert_eq!(nodes.len(), 50);
        assert!(report.try_count >= 50);
        assert!(nodes.iter().all(|node| node.radius >= 100.0 && node.radius <= 300.0));
    }

    #[test]
    fn test_chain_is_continuous() {
        let (nodes, _) = generate(40, 1.0, 99);

        for pair in nodes.windows(2) {
            assert_eq!(pair[0].out_transform_ms_to_ws, pair[1].in_transform_ms_to_ws);
            assert_eq!(pair[0].out_width, pair[1].in_width);
        }
    }

    #[test]
    fn test_inverse_transforms_are_consistent() {
        let (nodes, _) = generate(10, 1.0, 5);

        for node in &nodes {
            let round_trip = node.in_transform_ws_to_ms * node.in_transform_ms_to_ws;
            assert!(round_trip.abs_diff_eq(Affine3A::IDENTITY, POSITION_TOLERANCE));
            let round_trip = node.out_transform_ws_to_ms * node.out_transform_ms_to_ws;
            assert!(round_trip.abs_diff_eq(Affine3A::IDENTITY, POSITION_TOLERANCE));
        }
    }

    #[test]
    fn test_no_sphere_overlap() {
        let (nodes, _) = generate(60, 1.0, 77);

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let distance = nodes[i].center_ws.distance(nodes[j].center_ws);
                let min_distance = nodes[i].radius + nodes[j].radius;
                assert!(
                    distance >= min_distance - POSITION_TOLERANCE,
                    "nodes {i} and {j} overlap: {distance} < {min_distance}"
                );
            }
        }
    }

    #[test]
    fn test_backtracked_track_stays_valid() {
        let gen_info = GenerationInfo {
            chunk_count: 1000,
            chaos: 1.0,
            ..Default::default()
        };

        // Long chaotic tracks run into themselves within a few seeds
        let (nodes, report) = (0..5)
            .map(|seed| {
                let mut nodes = vec![TrackSkeletonNode::default(); 1000];
                let report = generate_track_skeleton(&gen_info, &mut nodes, &mut track_rng(Some(seed))).unwrap();
                (nodes, report)
            })
            .find(|(_, report)| report.backtrack_count > 0)
            .expect("no seed backtracked");

        assert!(report.try_count > 1000);

        for pair in nodes.windows(2) {
            assert_eq!(pair[0].out_transform_ms_to_ws, pair[1].in_transform_ms_to_ws);
            assert_eq!(pair[0].out_width, pair[1].in_width);
        }

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let distance = nodes[i].center_ws.distance(nodes[j].center_ws);
                let min_distance = nodes[i].radius + nodes[j].radius;
                assert!(
                    distance >= min_distance - POSITION_TOLERANCE,
                    "nodes {i} and {j} overlap: {distance} < {min_distance}"
                );
            }
        }
    }

    #[test]
    fn test_exhausted_budget_is_an_error() {
        let gen_info = GenerationInfo {
            chunk_count: 10,
            chaos: 0.0,
            ..Default::default()
        };
        let mut nodes = vec![TrackSkeletonNode::default(); 10];

        let result = generate_track_skeleton_with_budget(&gen_info, &mut nodes, &mut track_rng(Some(1)), 3);
        assert_eq!(
            result,
            Err(TrackGenError::GenerationExhausted {
                tries: 3,
                chunk_count: 10,
                chaos: 0.0,
                generated: 3,
            })
        );
    }

    #[test]
    fn test_zero_chaos_is_straight() {
        let (nodes, report) = generate(5, 0.0, 3);

        assert_eq!(report.try_count, 5);
        assert_eq!(report.backtrack_count, 0);

        for node in &nodes {
            assert_eq!(node.theta_angle, 0.0);
            assert_eq!(node.roll_angle, 0.0);
            let forward = node.orientation_ms_to_ws * Vec3::X;
            assert!(forward.abs_diff_eq(Vec3::X, 1e-4));
            assert!(node.center_ws.y.abs() < EPSILON && node.center_ws.z.abs() < EPSILON);
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let (a, report_a) = generate(3, 1.0, 2024);
        let (b, report_b) = generate(3, 1.0, 2024);

        assert_eq!(a, b);
        assert_eq!(report_a, report_b);
    }

    #[test]
    fn test_rejects_invalid_chunk_count() {
        let gen_info = GenerationInfo {
            chunk_count: 2,
            ..Default::default()
        };
        let mut nodes = vec![TrackSkeletonNode::default(); 2];

        let result = generate_track_skeleton(&gen_info, &mut nodes, &mut track_rng(Some(0)));
        assert!(matches!(result, Err(TrackGenError::InvalidChunkCount { count: 2, .. })));
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let gen_info = GenerationInfo {
            chunk_count: 10,
            ..Default::default()
        };
        let mut nodes = vec![TrackSkeletonNode::default(); 9];

        let result = generate_track_skeleton(&gen_info, &mut nodes, &mut track_rng(Some(0)));
        assert_eq!(
            result,
            Err(TrackGenError::BufferSizeMismatch {
                what: "skeleton node",
                expected: 10,
                actual: 9
            })
        );
    }
}
