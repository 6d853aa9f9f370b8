//! End-to-end scene construction from a validated table bundle.

use bos_tables::GeometryTables;

use crate::batch::build_batches;
use crate::error::Result;
use crate::geometry::build_mesh_geometries;
use crate::material::MaterialCache;
use crate::scene::Scene;
use crate::transform::compose_matrices;

/// Runs the full pipeline: transforms, geometries, materials, buckets,
/// batches, then a single commit into a fresh [`Scene`].
///
/// All-or-nothing: every bucket must batch successfully before any mesh
/// is registered, so a failed build leaves no partial scene behind.
pub fn build_scene(tables: &GeometryTables) -> Result<Scene> {
    tables.validate()?;

    let matrices = compose_matrices(&tables.transforms);
    let geometries = build_mesh_geometries(tables);
    let mut materials = MaterialCache::new(&tables.materials);

    let meshes = build_batches(tables, &matrices, &geometries, &mut materials)?;

    let mut scene = Scene::new();
    for mesh in meshes {
        scene.add_mesh(mesh);
    }

    tracing::debug!(
        meshes = scene.mesh_count(),
        "scene built from {} instances",
        tables.instances.len()
    );

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BosError;
    use crate::fixtures::{fixture_tables, Row};

    #[test]
    fn builds_a_complete_scene() {
        let rows = [
            Row::new(10, 0, 0, 0),
            Row::new(11, 0, 0, 1),
            Row::new(12, 1, 1, 0),
        ];
        let tables = fixture_tables(&rows, &[[0.0; 3], [2.0, 0.0, 0.0]]);

        let scene = build_scene(&tables).unwrap();
        assert_eq!(scene.mesh_count(), 2);
        assert!(scene.bounding_box().is_some());
        for entity in [10, 11, 12] {
            assert_eq!(scene.meshes_from_instance(entity).len(), 1);
        }
    }

    #[test]
    fn malformed_tables_produce_no_scene() {
        let mut tables = fixture_tables(&[Row::new(0, 0, 0, 0)], &[[0.0; 3]]);
        tables.vertices.y.pop();

        assert!(matches!(
            build_scene(&tables).unwrap_err(),
            BosError::Table(_)
        ));
    }
}
