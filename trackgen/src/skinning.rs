//! Per-chunk bone generation
//!
//! Every chunk gets [`BONE_COUNT_PER_CHUNK`] bones laid end to end along its
//! spline. The spline only carries orientation at its two ends, so the roll of
//! the inner bones is reconstructed by slerping the chunk rotation and
//! re-orthogonalizing it against each bone direction.

use glam::{Affine3A, Mat3, Quat, Vec3};

use crate::constants::BONE_COUNT_PER_CHUNK;
use crate::error::{Result, check_buffer_size};
use crate::skeleton::TrackSkeletonNode;
use crate::spline::{Spline, chunk_spline, eval_spline};

/// Bone segment in chunk model space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bone {
    pub root: Vec3,
    pub end: Vec3,
}

/// Skinning data of one chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSkinning {
    pub bones: Vec<Bone>,
    /// Pure translations bringing the straight rest chunk to each bone root
    pub bind_pose_inv_transforms: Vec<Affine3A>,
    /// Bone frames on the curved chunk
    pub pose_transforms: Vec<Affine3A>,
}

impl TrackSkinning {
    /// Combined `pose * bind_pose_inv` transform of bone `index`
    pub fn bone_transform(&self, index: usize) -> Affine3A {
        self.pose_transforms[index] * self.bind_pose_inv_transforms[index]
    }
}

/// Generate skinning for every chunk
pub fn generate_track_skinning(
    skeleton_nodes: &[TrackSkeletonNode],
    splines: &[Spline],
    skinning: &mut [TrackSkinning],
) -> Result<()> {
    check_buffer_size("spline", skeleton_nodes.len(), splines.len())?;
    check_buffer_size("skinning", splines.len(), skinning.len())?;

    for ((node, spline), chunk_skinning) in skeleton_nodes.iter().zip(splines).zip(skinning.iter_mut()) {
        *chunk_skinning = generate_track_skinning_for_chunk(node, spline)?;
    }

    Ok(())
}

/// Generate the bones of one chunk from its fitted spline
pub fn generate_track_skinning_for_chunk(node: &TrackSkeletonNode, spline: &Spline) -> Result<TrackSkinning> {
    let bones = sample_bones(spline);

    // Bind pose comes from the same chunk left straight, so an unbent chunk
    // skins to the identity.
    let rest_bones = sample_bones(&chunk_spline(node.radius, Vec3::X)?);
    let bind_pose_inv_transforms = rest_bones
        .iter()
        .map(|bone| Affine3A::from_translation(-bone.root))
        .collect();

    let pose_transforms = bones
        .iter()
        .enumerate()
        .map(|(i, bone)| {
            let t = i as f32 / BONE_COUNT_PER_CHUNK as f32;
            let interpolated_orientation = Quat::IDENTITY.slerp(node.rotation_ls, t);

            Affine3A::from_mat3_translation(bone_basis(bone, interpolated_orientation), bone.root)
        })
        .collect();

    Ok(TrackSkinning {
        bones,
        bind_pose_inv_transforms,
        pose_transforms,
    })
}

/// Contiguous bones whose joints lie on the spline at `i / BONE_COUNT_PER_CHUNK`
fn sample_bones(spline: &Spline) -> Vec<Bone> {
    let joints: Vec<Vec3> = (0..=BONE_COUNT_PER_CHUNK)
        .map(|i| eval_spline(spline, i as f32 / BONE_COUNT_PER_CHUNK as f32))
        .collect();

    joints
        .windows(2)
        .map(|pair| Bone {
            root: pair[0],
            end: pair[1],
        })
        .collect()
}

/// Orthonormal frame with +X along the bone and +Y as close as possible to
/// the interpolated chunk up vector
fn bone_basis(bone: &Bone, interpolated_orientation: Quat) -> Mat3 {
    let plus_x = (bone.end - bone.root).normalize();
    let interpolated_plus_y = interpolated_orientation * Vec3::Y;
    let plus_y = (interpolated_plus_y - plus_x * interpolated_plus_y.dot(plus_x)).normalize();
    let plus_z = plus_x.cross(plus_y);

    debug_assert!((plus_z.length_squared() - 1.0).abs() < 1e-4);

    Mat3::from_cols(plus_x, plus_y, plus_z)
}
