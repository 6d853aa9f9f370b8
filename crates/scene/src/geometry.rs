//! Per-mesh local geometry sliced out of the shared vertex/index tables.

use std::sync::Arc;

use bos_tables::GeometryTables;
use glam::Vec3;

use crate::bounds::Aabb;

/// Fixed-point divisor recovering floating-point local units.
pub const VERTEX_DIVISOR: f32 = 10_000.0;

/// Indexed triangle geometry in mesh-local space.
///
/// Immutable after creation: instanced primitives share it behind an
/// `Arc`, and the merge engine only ever reads from it while writing
/// into its own destination buffers.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    /// xyz triplets, stride 3.
    pub positions: Vec<f32>,
    /// Zero-based against this mesh's own vertex range.
    pub indices: Vec<u32>,
    pub local_aabb: Aabb,
}

impl MeshGeometry {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        let local_aabb = Aabb::from_points(
            positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        )
        .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));

        Self {
            positions,
            indices,
            local_aabb,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Slices the shared buffers into one local geometry per mesh id.
///
/// A mesh whose slice has zero vertices or zero indices yields `None`;
/// buckets referencing it are dropped later.
pub fn build_mesh_geometries(tables: &GeometryTables) -> Vec<Option<Arc<MeshGeometry>>> {
    let mesh_count = tables.meshes.len();
    let mut geometries = Vec::with_capacity(mesh_count);
    let mut skipped = 0usize;

    for m in 0..mesh_count {
        let vertex_range = tables.mesh_vertex_range(m);
        let index_range = tables.mesh_index_range(m);

        if vertex_range.is_empty() || index_range.is_empty() {
            skipped += 1;
            geometries.push(None);
            continue;
        }

        let mut positions = Vec::with_capacity(vertex_range.len() * 3);
        for v in vertex_range {
            positions.push(tables.vertices.x[v] as f32 / VERTEX_DIVISOR);
            positions.push(tables.vertices.y[v] as f32 / VERTEX_DIVISOR);
            positions.push(tables.vertices.z[v] as f32 / VERTEX_DIVISOR);
        }

        let indices = tables.indices.indices[index_range].to_vec();

        geometries.push(Some(Arc::new(MeshGeometry::new(positions, indices))));
    }

    if skipped > 0 {
        tracing::debug!("[geometry] skipped {skipped} meshes with empty slices");
    }

    geometries
}

#[cfg(test)]
mod tests {
    use super::*;
    use bos_tables::{IndexTable, MeshTable, VertexTable};

    fn tables() -> GeometryTables {
        // mesh 0: triangle, mesh 1: empty index slice, mesh 2: one segment of 4 verts
        GeometryTables {
            vertices: VertexTable {
                x: vec![0, 10_000, 0, 5_000, 0, 0, 0],
                y: vec![0, 0, 10_000, 0, 0, 0, 0],
                z: vec![0; 7],
            },
            indices: IndexTable {
                indices: vec![0, 1, 2, 0, 1, 2, 1, 2, 3],
            },
            meshes: MeshTable {
                vertex_offset: vec![0, 3, 3],
                index_offset: vec![0, 3, 3],
            },
            ..Default::default()
        }
    }

    #[test]
    fn slices_and_decodes_fixed_point() {
        let geometries = build_mesh_geometries(&tables());
        assert_eq!(geometries.len(), 3);

        let first = geometries[0].as_ref().unwrap();
        assert_eq!(first.vertex_count(), 3);
        assert_eq!(first.indices, vec![0, 1, 2]);
        assert_eq!(&first.positions[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(first.local_aabb.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn empty_slice_produces_no_geometry() {
        let geometries = build_mesh_geometries(&tables());
        // mesh 1 has a zero-length index range
        assert!(geometries[1].is_none());
        assert!(geometries[2].is_some());
    }

    #[test]
    fn last_mesh_extends_to_table_end() {
        let geometries = build_mesh_geometries(&tables());
        let last = geometries[2].as_ref().unwrap();
        assert_eq!(last.vertex_count(), 4);
        assert_eq!(last.index_count(), 6);
    }
}
