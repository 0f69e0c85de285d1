//! Whole-track pipeline and physics hand-off

use glam::{Affine3A, Vec3};
use rand::Rng;
use tracing::{debug, info};

use crate::config::GenerationInfo;
use crate::error::{Result, check_buffer_size};
use crate::mesh::{Mesh, skin_track_chunk_mesh};
use crate::skeleton::{SkeletonGenerationReport, TrackSkeletonNode, generate_track_skeleton};
use crate::skinning::{TrackSkinning, generate_track_skinning};
use crate::spline::{Spline, generate_track_splines};

/// Output of every generation stage, one entry per chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub gen_info: GenerationInfo,
    pub skeleton_nodes: Vec<TrackSkeletonNode>,
    pub splines: Vec<Spline>,
    pub skinning: Vec<TrackSkinning>,
}

/// Static world-space geometry for the physics engine
///
/// Owns its buffers so the track can be dropped once this is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionGeometry {
    /// Exit frame of every chunk, for placing checkpoints and respawns
    pub chunk_transforms: Vec<Affine3A>,
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Track {
    /// Run skeleton, spline and skinning generation
    pub fn generate<R: Rng + ?Sized>(
        gen_info: &GenerationInfo,
        rng: &mut R,
    ) -> Result<(Self, SkeletonGenerationReport)> {
        gen_info.validate()?;
        let chunk_count = gen_info.chunk_count as usize;

        let mut skeleton_nodes = vec![TrackSkeletonNode::default(); chunk_count];
        let report = generate_track_skeleton(gen_info, &mut skeleton_nodes, rng)?;

        let mut splines = vec![Spline::default(); chunk_count];
        generate_track_splines(&skeleton_nodes, &mut splines)?;

        let mut skinning = vec![TrackSkinning::default(); chunk_count];
        generate_track_skinning(&skeleton_nodes, &splines, &mut skinning)?;

        info!(chunk_count, "track generated");

        Ok((
            Self {
                gen_info: *gen_info,
                skeleton_nodes,
                splines,
                skinning,
            },
            report,
        ))
    }

    pub fn chunk_count(&self) -> usize {
        self.skeleton_nodes.len()
    }

    /// Skin a copy of `template` onto every chunk
    ///
    /// Meshes come out world-oriented but centered on their chunk, with
    /// normals recomputed from the bent surface.
    pub fn skin_chunk_meshes(&self, template: &Mesh, mesh_length: f32) -> Result<Vec<Mesh>> {
        check_buffer_size("skinning", self.skeleton_nodes.len(), self.skinning.len())?;

        let meshes = self
            .skeleton_nodes
            .iter()
            .zip(&self.skinning)
            .map(|(node, skinning)| {
                let mut mesh = template.clone();
                skin_track_chunk_mesh(node, skinning, &mut mesh.positions, mesh_length)?;
                mesh.recompute_normals();
                Ok(mesh)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            chunks = meshes.len(),
            vertices_per_chunk = template.vertex_count(),
            "skinned chunk meshes"
        );

        Ok(meshes)
    }

    /// Move chunk-centered meshes from [`Track::skin_chunk_meshes`] to their
    /// chunk's world position
    ///
    /// Meshes beyond the chunk count are left untouched.
    pub fn place_chunk_meshes(&self, meshes: &mut [Mesh]) {
        for (node, mesh) in self.skeleton_nodes.iter().zip(meshes.iter_mut()) {
            mesh.transform(Affine3A::from_translation(node.center_ws));
        }
    }

    /// Merge chunk meshes from [`Track::skin_chunk_meshes`] into world space
    ///
    /// Meshes beyond the chunk count are ignored.
    pub fn collision_geometry(&self, meshes: &[Mesh]) -> CollisionGeometry {
        let mut geometry = CollisionGeometry {
            chunk_transforms: self
                .skeleton_nodes
                .iter()
                .map(|node| node.out_transform_ms_to_ws)
                .collect(),
            ..Default::default()
        };

        for (node, mesh) in self.skeleton_nodes.iter().zip(meshes) {
            let base = geometry.vertices.len() as u32;

            geometry.vertices.extend(
                mesh.positions
                    .iter()
                    .map(|p| (Vec3::from(*p) + node.center_ws).to_array()),
            );
            geometry.indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        geometry
    }
}
