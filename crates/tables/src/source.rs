//! Async column gathering.
//!
//! The columnar reader is an external collaborator and may deliver
//! columns out of order; [`GeometryTables::gather`] is the barrier that
//! joins every pending column before any batching can begin.

use futures::future::BoxFuture;
use futures::try_join;

use crate::columns::{
    GeometryTables, IndexTable, InstanceTable, MaterialTable, MeshTable, TransformTable,
    VertexTable,
};
use crate::error::{BosTableError, Result};

pub const TABLE_INSTANCES: &str = "Instances";
pub const TABLE_VERTICES: &str = "VertexBuffer";
pub const TABLE_INDICES: &str = "IndexBuffer";
pub const TABLE_MESHES: &str = "Meshes";
pub const TABLE_MATERIALS: &str = "Materials";
pub const TABLE_TRANSFORMS: &str = "Transforms";

/// Column access into an external columnar reader.
///
/// Each method resolves to `Ok(None)` when the column does not exist in
/// the source; reader failures surface as `anyhow` errors. Futures for
/// different columns are polled concurrently, so implementations are
/// free to resolve them in any order.
pub trait ColumnSource {
    fn read_i32(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<i32>>>>;

    fn read_u32(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<u32>>>>;

    fn read_u8(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<u8>>>>;

    fn read_f32(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<f32>>>>;

    fn read_string(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> BoxFuture<'_, anyhow::Result<Option<Vec<String>>>>;
}

async fn required_i32<S: ColumnSource + ?Sized>(
    source: &S,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<i32>> {
    source
        .read_i32(table, column)
        .await?
        .ok_or(BosTableError::MissingColumn { table, column })
}

async fn required_u32<S: ColumnSource + ?Sized>(
    source: &S,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<u32>> {
    source
        .read_u32(table, column)
        .await?
        .ok_or(BosTableError::MissingColumn { table, column })
}

async fn required_u8<S: ColumnSource + ?Sized>(
    source: &S,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<u8>> {
    source
        .read_u8(table, column)
        .await?
        .ok_or(BosTableError::MissingColumn { table, column })
}

async fn required_f32<S: ColumnSource + ?Sized>(
    source: &S,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<f32>> {
    source
        .read_f32(table, column)
        .await?
        .ok_or(BosTableError::MissingColumn { table, column })
}

impl GeometryTables {
    /// Joins every required column future, then validates the bundle.
    ///
    /// Nothing downstream runs until the last column has arrived; on any
    /// failure no tables are produced at all.
    pub async fn gather<S: ColumnSource + ?Sized>(source: &S) -> Result<Self> {
        let instances = async {
            let (entity_index, material_index, mesh_index, transform_index, global_id) = try_join!(
                required_i32(source, TABLE_INSTANCES, "ElementEntityIndex"),
                required_i32(source, TABLE_INSTANCES, "ElementMaterialIndex"),
                required_i32(source, TABLE_INSTANCES, "ElementMeshIndex"),
                required_i32(source, TABLE_INSTANCES, "ElementTransformIndex"),
                async {
                    // GlobalId is the one optional column.
                    source
                        .read_string(TABLE_INSTANCES, "GlobalId")
                        .await
                        .map_err(BosTableError::from)
                },
            )?;
            Ok::<_, BosTableError>(InstanceTable {
                entity_index,
                material_index,
                mesh_index,
                transform_index,
                global_id,
            })
        };

        let vertices = async {
            let (x, y, z) = try_join!(
                required_i32(source, TABLE_VERTICES, "VertexX"),
                required_i32(source, TABLE_VERTICES, "VertexY"),
                required_i32(source, TABLE_VERTICES, "VertexZ"),
            )?;
            Ok::<_, BosTableError>(VertexTable { x, y, z })
        };

        let indices = async {
            let indices = required_u32(source, TABLE_INDICES, "IndexBuffer").await?;
            Ok::<_, BosTableError>(IndexTable { indices })
        };

        let meshes = async {
            let (vertex_offset, index_offset) = try_join!(
                required_i32(source, TABLE_MESHES, "MeshVertexOffset"),
                required_i32(source, TABLE_MESHES, "MeshIndexOffset"),
            )?;
            Ok::<_, BosTableError>(MeshTable {
                vertex_offset,
                index_offset,
            })
        };

        let materials = async {
            let (red, green, blue, alpha, roughness, metallic) = try_join!(
                required_u8(source, TABLE_MATERIALS, "MaterialRed"),
                required_u8(source, TABLE_MATERIALS, "MaterialGreen"),
                required_u8(source, TABLE_MATERIALS, "MaterialBlue"),
                required_u8(source, TABLE_MATERIALS, "MaterialAlpha"),
                required_u8(source, TABLE_MATERIALS, "MaterialRoughness"),
                required_u8(source, TABLE_MATERIALS, "MaterialMetallic"),
            )?;
            Ok::<_, BosTableError>(MaterialTable {
                red,
                green,
                blue,
                alpha,
                roughness,
                metallic,
            })
        };

        let transforms = async {
            let (tx, ty, tz, qx, qy, qz, qw, sx, sy, sz) = try_join!(
                required_f32(source, TABLE_TRANSFORMS, "TransformTX"),
                required_f32(source, TABLE_TRANSFORMS, "TransformTY"),
                required_f32(source, TABLE_TRANSFORMS, "TransformTZ"),
                required_f32(source, TABLE_TRANSFORMS, "TransformQX"),
                required_f32(source, TABLE_TRANSFORMS, "TransformQY"),
                required_f32(source, TABLE_TRANSFORMS, "TransformQZ"),
                required_f32(source, TABLE_TRANSFORMS, "TransformQW"),
                required_f32(source, TABLE_TRANSFORMS, "TransformSX"),
                required_f32(source, TABLE_TRANSFORMS, "TransformSY"),
                required_f32(source, TABLE_TRANSFORMS, "TransformSZ"),
            )?;
            Ok::<_, BosTableError>(TransformTable {
                tx,
                ty,
                tz,
                qx,
                qy,
                qz,
                qw,
                sx,
                sy,
                sz,
            })
        };

        let (instances, vertices, indices, meshes, materials, transforms) =
            try_join!(instances, vertices, indices, meshes, materials, transforms)?;

        let tables = GeometryTables {
            instances,
            vertices,
            indices,
            meshes,
            materials,
            transforms,
        };

        tables.validate()?;

        tracing::debug!(
            instances = tables.instances.len(),
            vertices = tables.vertices.len(),
            indices = tables.indices.len(),
            meshes = tables.meshes.len(),
            materials = tables.materials.len(),
            transforms = tables.transforms.len(),
            "gathered geometry tables"
        );

        Ok(tables)
    }
}
