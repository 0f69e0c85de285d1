//! Wavefront OBJ dumps of every pipeline stage
//!
//! Meant for eyeballing a generated track in a model viewer. Skeleton,
//! splines and bones are written as polylines (`l`), skinned chunk meshes as
//! triangles (`f v/vt/vn`). Skeleton, splines and bones are written in world
//! space. Meshes are written as given; place skinned chunk meshes with
//! [`Track::place_chunk_meshes`](crate::track::Track::place_chunk_meshes)
//! first so they line up with the other dumps.

use std::io::{self, Write};

use glam::Vec3;

use crate::mesh::Mesh;
use crate::skeleton::TrackSkeletonNode;
use crate::skinning::TrackSkinning;
use crate::spline::{Spline, eval_spline};

fn write_vertex<W: Write + ?Sized>(output: &mut W, position: Vec3) -> io::Result<()> {
    writeln!(output, "v {} {} {}", position.x, position.y, position.z)
}

fn chunk_to_world(node: &TrackSkeletonNode, position_ms: Vec3) -> Vec3 {
    node.center_ws + node.orientation_ms_to_ws * position_ms
}

fn check_lengths(what: &str, expected: usize, actual: usize) -> io::Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{actual} {what} for {expected} skeleton nodes"),
        ))
    }
}

/// Write chunk centers as one polyline
pub fn write_track_skeleton_as_obj<W: Write + ?Sized>(
    output: &mut W,
    skeleton_nodes: &[TrackSkeletonNode],
) -> io::Result<()> {
    writeln!(output, "o Skeleton")?;

    for node in skeleton_nodes {
        write_vertex(output, node.center_ws)?;
    }

    // OBJ indices are 1-based
    for i in 1..skeleton_nodes.len() {
        writeln!(output, "l {} {}", i, i + 1)?;
    }

    Ok(())
}

/// Write each chunk spline sampled at `tesselation + 1` points
pub fn write_track_splines_as_obj<W: Write + ?Sized>(
    output: &mut W,
    skeleton_nodes: &[TrackSkeletonNode],
    splines: &[Spline],
    tesselation: u32,
) -> io::Result<()> {
    check_lengths("splines", skeleton_nodes.len(), splines.len())?;

    let tesselation = tesselation.max(1) as usize;

    writeln!(output, "o Splines")?;

    for (node, spline) in skeleton_nodes.iter().zip(splines) {
        for j in 0..=tesselation {
            let param = j as f32 / tesselation as f32;
            write_vertex(output, chunk_to_world(node, eval_spline(spline, param)))?;
        }
    }

    for chunk in 0..splines.len() {
        let first = chunk * (tesselation + 1) + 1;
        for j in 0..tesselation {
            writeln!(output, "l {} {}", first + j, first + j + 1)?;
        }
    }

    Ok(())
}

/// Write every bone as a two-point line
pub fn write_track_bones_as_obj<W: Write + ?Sized>(
    output: &mut W,
    skeleton_nodes: &[TrackSkeletonNode],
    skinning: &[TrackSkinning],
) -> io::Result<()> {
    check_lengths("skinning entries", skeleton_nodes.len(), skinning.len())?;

    writeln!(output, "o Bones")?;

    let mut bone_count = 0usize;
    for (node, chunk_skinning) in skeleton_nodes.iter().zip(skinning) {
        for bone in &chunk_skinning.bones {
            write_vertex(output, chunk_to_world(node, bone.root))?;
            write_vertex(output, chunk_to_world(node, bone.end))?;
            bone_count += 1;
        }
    }

    for bone in 0..bone_count {
        writeln!(output, "l {} {}", bone * 2 + 1, bone * 2 + 2)?;
    }

    Ok(())
}

/// Write meshes as separate objects named `chunk_<index>`
///
/// UVs and normals are written when a mesh has one per vertex.
pub fn write_meshes_as_obj<W: Write + ?Sized>(output: &mut W, meshes: &[Mesh]) -> io::Result<()> {
    let mut position_offset = 0usize;
    let mut uv_offset = 0usize;
    let mut normal_offset = 0usize;

    for (index, mesh) in meshes.iter().enumerate() {
        let has_uvs = mesh.uvs.len() == mesh.positions.len();
        let has_normals = mesh.normals.len() == mesh.positions.len();

        writeln!(output, "o chunk_{index}")?;

        for p in &mesh.positions {
            writeln!(output, "v {} {} {}", p[0], p[1], p[2])?;
        }
        if has_uvs {
            for uv in &mesh.uvs {
                writeln!(output, "vt {} {}", uv[0], uv[1])?;
            }
        }
        if has_normals {
            for n in &mesh.normals {
                writeln!(output, "vn {} {} {}", n[0], n[1], n[2])?;
            }
        }

        for triangle in mesh.indices.chunks_exact(3) {
            write!(output, "f")?;
            for &i in triangle {
                let i = i as usize;
                let v = position_offset + i + 1;
                match (has_uvs, has_normals) {
                    (true, true) => write!(output, " {v}/{}/{}", uv_offset + i + 1, normal_offset + i + 1)?,
                    (true, false) => write!(output, " {v}/{}", uv_offset + i + 1)?,
                    (false, true) => write!(output, " {v}//{}", normal_offset + i + 1)?,
                    (false, false) => write!(output, " {v}")?,
                }
            }
            writeln!(output)?;
        }

        position_offset += mesh.positions.len();
        if has_uvs {
            uv_offset += mesh.uvs.len();
        }
        if has_normals {
            normal_offset += mesh.normals.len();
        }
    }

    Ok(())
}
