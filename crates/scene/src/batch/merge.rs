//! Offset-rebasing concatenation of local geometries into one static
//! buffer.

use glam::{Mat4, Vec3};

use super::error::{BosBatchError, Result};
use crate::geometry::MeshGeometry;

/// One singleton's contribution: shared local geometry plus the placement
/// to bake into it.
pub struct MergeInput<'a> {
    pub geometry: &'a MeshGeometry,
    pub matrix: Mat4,
}

#[derive(Debug)]
pub struct MergedGeometry {
    pub geometry: MeshGeometry,
    /// Index-buffer start offset per input, strictly increasing, in
    /// index counts.
    pub sub_mesh_offsets: Vec<u32>,
}

/// Concatenates the inputs in order into a single placed-space geometry.
///
/// Two passes: size the destination exactly, then copy. Positions are
/// transformed through each input's matrix on the way in (the shared
/// source geometry is never written to); copied indices are rebased by
/// the running vertex offset so they stay valid against the combined
/// vertex array.
pub fn merge(material: i32, inputs: &[MergeInput]) -> Result<MergedGeometry> {
    let mut vertex_total: u64 = 0;
    let mut index_total: u64 = 0;

    for input in inputs {
        if input.geometry.positions.len() % 3 != 0 {
            return Err(BosBatchError::MergeAttributeMismatch {
                material,
                len: input.geometry.positions.len(),
            });
        }
        vertex_total += input.geometry.vertex_count() as u64;
        index_total += input.geometry.index_count() as u64;
    }

    if vertex_total > u32::MAX as u64 || index_total > u32::MAX as u64 {
        return Err(BosBatchError::CapacityExceeded {
            material,
            vertices: vertex_total,
            indices: index_total,
        });
    }

    let mut positions = Vec::with_capacity(vertex_total as usize * 3);
    let mut indices = Vec::with_capacity(index_total as usize);
    let mut sub_mesh_offsets = Vec::with_capacity(inputs.len());

    let mut vertex_offset: u32 = 0;
    for input in inputs {
        sub_mesh_offsets.push(indices.len() as u32);

        for p in input.geometry.positions.chunks_exact(3) {
            let placed = input.matrix.transform_point3(Vec3::new(p[0], p[1], p[2]));
            positions.extend_from_slice(&[placed.x, placed.y, placed.z]);
        }

        indices.extend(input.geometry.indices.iter().map(|i| i + vertex_offset));

        vertex_offset += input.geometry.vertex_count() as u32;
    }

    Ok(MergedGeometry {
        geometry: MeshGeometry::new(positions, indices),
        sub_mesh_offsets,
    })
}
