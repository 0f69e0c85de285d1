//! Chunk meshes and their skinning onto the track
//!
//! Template chunk meshes are authored straight along +X and centered on the
//! origin. Skinning stretches them to the chunk length and bends them along
//! the chunk bones. Bone weights are derived from the vertex X position, so
//! templates need no per-vertex skin data.

use glam::{Affine3A, Vec3};

use crate::constants::{BONE_COUNT_PER_CHUNK, WEIGHT_SUM_EPSILON};
use crate::error::{Result, TrackGenError, check_buffer_size};
use crate::skeleton::TrackSkeletonNode;
use crate::skinning::TrackSkinning;

/// Triangle mesh with f32 attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions as [x, y, z]
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals as [x, y, z] (empty if none)
    pub normals: Vec<[f32; 3]>,
    /// UV coordinates as [u, v] (empty if none)
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Add a vertex with position, UV and normal, returning its index
    pub fn add_vertex(&mut self, position: Vec3, uv: (f32, f32), normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push([uv.0, uv.1]);
        index
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Recompute smooth, area weighted normals from the triangles
    ///
    /// Skinning only moves positions; call this afterwards so shading follows
    /// the bent surface. Vertices not referenced by any triangle get +Y.
    pub fn recompute_normals(&mut self) {
        let mut accumulated = vec![Vec3::ZERO; self.positions.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let p0 = Vec3::from(self.positions[i0]);
            let p1 = Vec3::from(self.positions[i1]);
            let p2 = Vec3::from(self.positions[i2]);

            // Unnormalized: longer for larger triangles
            let face_normal = (p1 - p0).cross(p2 - p0);
            accumulated[i0] += face_normal;
            accumulated[i1] += face_normal;
            accumulated[i2] += face_normal;
        }

        self.normals = accumulated
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Apply an affine transform to positions and normals
    pub fn transform(&mut self, transform: Affine3A) {
        let normal_matrix = transform.matrix3.inverse().transpose();

        for position in &mut self.positions {
            *position = transform.transform_point3(Vec3::from(*position)).to_array();
        }
        for normal in &mut self.normals {
            let n = normal_matrix * glam::Vec3A::from(*normal);
            *normal = Vec3::from(n).normalize_or_zero().to_array();
        }
    }
}

/// Blend weights of the chunk bones for a vertex at `x` along the chunk
///
/// `x` spans `[-radius, radius]` and maps to `t` in `[0, BONE_COUNT_PER_CHUNK]`.
/// Each bone gets a tent peaking at its mid-point; the first and last tents
/// stay at 1.0 past the chunk ends. The weights always sum to 1.
pub fn compute_bone_weights(x: f32, radius: f32) -> [f32; BONE_COUNT_PER_CHUNK] {
    let t = (x / radius + 1.0) * (BONE_COUNT_PER_CHUNK as f32 * 0.5);
    let last = BONE_COUNT_PER_CHUNK - 1;

    std::array::from_fn(|bone| {
        let center = bone as f32 + 0.5;

        if (bone == 0 && t <= center) || (bone == last && t >= center) {
            1.0
        } else {
            (1.0 - (t - center).abs()).max(0.0)
        }
    })
}

/// Skin the positions of a template chunk mesh in place
///
/// `mesh_length` is the template extent along X. Positions are stretched
/// along X to the chunk length `2 * radius`, blended between the chunk bones
/// and rotated into world orientation. The result stays centered on the
/// chunk: add `node.center_ws` to get world positions.
///
/// # Errors
///
/// Returns an error for an empty vertex slice, a non-positive `mesh_length`,
/// or skinning data that does not hold [`BONE_COUNT_PER_CHUNK`] bones.
pub fn skin_track_chunk_mesh(
    node: &TrackSkeletonNode,
    skinning: &TrackSkinning,
    vertices: &mut [[f32; 3]],
    mesh_length: f32,
) -> Result<()> {
    if vertices.is_empty() {
        return Err(TrackGenError::EmptyMesh);
    }
    if !(mesh_length > 0.0 && mesh_length.is_finite()) {
        return Err(TrackGenError::InvalidMeshLength(mesh_length));
    }
    check_buffer_size("pose transform", BONE_COUNT_PER_CHUNK, skinning.pose_transforms.len())?;
    check_buffer_size(
        "bind pose transform",
        BONE_COUNT_PER_CHUNK,
        skinning.bind_pose_inv_transforms.len(),
    )?;

    let scale_x = node.radius * 2.0 / mesh_length;
    let bone_transforms: [Affine3A; BONE_COUNT_PER_CHUNK] = std::array::from_fn(|i| skinning.bone_transform(i));

    for position in vertices.iter_mut() {
        let vertex = Vec3::from(*position) * Vec3::new(scale_x, 1.0, 1.0);
        let weights = compute_bone_weights(vertex.x, node.radius);

        let weight_sum: f32 = weights.iter().sum();
        debug_assert!(
            (weight_sum - 1.0).abs() < WEIGHT_SUM_EPSILON,
            "bone weights sum to {weight_sum}"
        );

        let mut skinned = Vec3::ZERO;
        for (transform, weight) in bone_transforms.iter().zip(weights) {
            if weight > 0.0 {
                skinned += transform.transform_point3(vertex) * weight;
            }
        }

        // Renormalize rather than trust the sum in release builds
        if weight_sum > 0.0 {
            skinned /= weight_sum;
        }

        *position = (node.orientation_ms_to_ws * skinned).to_array();
    }

    Ok(())
}

/// Generate a straight road slab to use as a chunk template
///
/// The slab spans `[-length/2, length/2]` along X, `[-width/2, width/2]`
/// along Z, with its driving surface at Y = 0 and `thickness` below it. It is
/// cut into `segments` slices along X so it can bend, and left open at both
/// ends where it meets the neighboring chunks.
pub fn generate_chunk_template(length: f32, width: f32, thickness: f32, segments: u32) -> Mesh {
    let segments = segments.max(1);
    let half_width = width * 0.5;

    // (start edge, end edge) in YZ, wound so the face points along the normal
    let faces = [
        ((0.0, half_width), (0.0, -half_width), Vec3::Y),
        ((-thickness, -half_width), (-thickness, half_width), Vec3::NEG_Y),
        ((-thickness, half_width), (0.0, half_width), Vec3::Z),
        ((0.0, -half_width), (-thickness, -half_width), Vec3::NEG_Z),
    ];

    let mut mesh = Mesh::new();

    for ((ay, az), (by, bz), normal) in faces {
        let first = mesh.vertex_count() as u32;

        for i in 0..=segments {
            let u = i as f32 / segments as f32;
            let x = (u - 0.5) * length;

            mesh.add_vertex(Vec3::new(x, ay, az), (u, 0.0), normal);
            mesh.add_vertex(Vec3::new(x, by, bz), (u, 1.0), normal);
        }

        for i in 0..segments {
            let base = first + i * 2;
            mesh.add_triangle(base, base + 2, base + 1);
            mesh.add_triangle(base + 1, base + 2, base + 3);
        }
    }

    mesh
}
