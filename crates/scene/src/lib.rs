//! Batching and object-index engine for BIM Open Schema geometry.
//!
//! Takes the flat columnar model description (instances referencing
//! shared meshes, materials and transforms) and produces a minimal set
//! of render-ready primitives — GPU-instanced batches for repeated
//! placements, merged static batches for one-off placements — plus a
//! reverse index mapping any rendered face or instance slot back to the
//! originating entity.

pub mod batch;
pub mod bounds;
pub mod build;
pub mod error;
pub mod geometry;
pub mod ghost;
pub mod material;
pub mod scene;
pub mod transform;

#[cfg(test)]
pub(crate) mod fixtures;

pub mod tables {
    pub use bos_tables::*;
}

pub use batch::BosBatchError;
pub use bounds::Aabb;
pub use build::build_scene;
pub use error::{BosError, Result};
pub use geometry::MeshGeometry;
pub use ghost::GhostController;
pub use material::Material;
pub use scene::{BosSceneError, Mesh, MeshKey, Repr, Scene, SubMesh};
pub use transform::Transform;

use tables::{ColumnSource, GeometryTables};

/// Gathers the columns, builds the scene, and wires up the ghost
/// controller — the one-call entry point for loaders.
pub async fn load_scene<S: ColumnSource + ?Sized>(
    source: &S,
) -> Result<(Scene, GhostController)> {
    let tables = GeometryTables::gather(source).await?;
    let scene = build_scene(&tables)?;
    let ghost = GhostController::new(&tables.instances);
    Ok((scene, ghost))
}
