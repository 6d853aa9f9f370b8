//! Buckets instances by (mesh, material) and turns each bucket into a
//! render-ready primitive: instanced for repeated placements, merged
//! into one static buffer for one-off placements.

mod error;
mod merge;


use std::sync::Arc;

use bos_tables::{checked_index, GeometryTables};
use glam::Mat4;
use indexmap::IndexMap;

pub use error::BosBatchError;
pub use merge::{merge, MergeInput, MergedGeometry};

use error::Result;

use crate::geometry::MeshGeometry;
use crate::material::MaterialCache;
use crate::scene::Mesh;

/// Raw (meshIndex, materialIndex) column values; both validated by the
/// time a bucket exists.
type BucketKey = (i32, i32);

pub(crate) struct Buckets {
    /// First-seen key order, instance rows in input order.
    pub map: IndexMap<BucketKey, Vec<usize>>,
    /// Instances dropped for out-of-range or absent indices.
    pub skipped: usize,
}

/// Single pass over the instance rows.
///
/// Rows with an absent or out-of-range mesh/material/transform index, or
/// whose mesh produced no geometry, are skipped and counted; this is a
/// recoverable condition, not a failure.
pub(crate) fn bucket_instances(
    tables: &GeometryTables,
    geometries: &[Option<Arc<MeshGeometry>>],
) -> Buckets {
    let instances = &tables.instances;
    let mut map: IndexMap<BucketKey, Vec<usize>> = IndexMap::new();
    let mut skipped = 0usize;

    for row in 0..instances.len() {
        let mesh_ok = checked_index(instances.mesh_index[row], geometries.len())
            .is_some_and(|m| geometries[m].is_some());
        let material_ok =
            checked_index(instances.material_index[row], tables.materials.len()).is_some();
        let transform_ok =
            checked_index(instances.transform_index[row], tables.transforms.len()).is_some();

        if !mesh_ok || !material_ok || !transform_ok {
            skipped += 1;
            continue;
        }

        map.entry((instances.mesh_index[row], instances.material_index[row]))
            .or_default()
            .push(row);
    }

    if skipped > 0 {
        tracing::warn!("[batch] skipped {skipped} instances with invalid indices");
    }

    Buckets { map, skipped }
}

struct Singleton {
    geometry: Arc<MeshGeometry>,
    matrix: Mat4,
    entity: i32,
}

/// Builds one primitive per multi-instance bucket plus one merged
/// primitive per material that had singleton buckets.
///
/// A material with a single singleton still takes the merge path, so the
/// reverse index always has exactly two representations to deal with.
pub fn build_batches(
    tables: &GeometryTables,
    matrices: &[Mat4],
    geometries: &[Option<Arc<MeshGeometry>>],
    materials: &mut MaterialCache,
) -> Result<Vec<Mesh>> {
    let buckets = bucket_instances(tables, geometries);

    let mut meshes = Vec::new();
    let mut staging: IndexMap<i32, Vec<Singleton>> = IndexMap::new();

    for ((mesh_id, material_id), rows) in &buckets.map {
        let Some(geometry) = geometries[*mesh_id as usize].clone() else {
            continue;
        };

        if rows.len() == 1 {
            let row = rows[0];
            staging.entry(*material_id).or_default().push(Singleton {
                geometry,
                matrix: instance_matrix(tables, matrices, row)?,
                entity: tables.instances.entity_index[row],
            });
            continue;
        }

        let mut instance_matrices = Vec::with_capacity(rows.len());
        let mut instances = Vec::with_capacity(rows.len());
        let mut boxes = Vec::with_capacity(rows.len());
        for &row in rows {
            let matrix = instance_matrix(tables, matrices, row)?;
            instances.push(tables.instances.entity_index[row]);
            boxes.push(geometry.local_aabb.transformed(&matrix));
            instance_matrices.push(matrix);
        }

        meshes.push(Mesh::instanced(
            geometry,
            materials.get(*material_id as usize),
            instances,
            instance_matrices,
            boxes,
        ));
    }

    for (material_id, singletons) in staging {
        let inputs: Vec<MergeInput> = singletons
            .iter()
            .map(|s| MergeInput {
                geometry: &s.geometry,
                matrix: s.matrix,
            })
            .collect();
        let merged = merge(material_id, &inputs)?;

        let instances = singletons.iter().map(|s| s.entity).collect();
        let boxes = singletons
            .iter()
            .map(|s| s.geometry.local_aabb.transformed(&s.matrix))
            .collect();

        meshes.push(Mesh::merged(
            Arc::new(merged.geometry),
            materials.get(material_id as usize),
            instances,
            merged.sub_mesh_offsets,
            boxes,
        ));
    }

    tracing::debug!(
        meshes = meshes.len(),
        skipped = buckets.skipped,
        "built batches"
    );

    Ok(meshes)
}

fn instance_matrix(tables: &GeometryTables, matrices: &[Mat4], row: usize) -> Result<Mat4> {
    let index = tables.instances.transform_index[row] as usize;
    matrices
        .get(index)
        .copied()
        .ok_or(BosBatchError::TransformIndexOutOfRange {
            index,
            len: matrices.len(),
        })
}
