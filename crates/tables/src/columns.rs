//! Decoded column tables and cross-table validation.

use std::ops::Range;

use crate::error::{BosTableError, Result};

/// One row per placed entity.
///
/// All index columns refer into their respective table; a negative value
/// is the "absent" sentinel and excludes the row from batching.
#[derive(Debug, Default, Clone)]
pub struct InstanceTable {
    pub entity_index: Vec<i32>,
    pub material_index: Vec<i32>,
    pub mesh_index: Vec<i32>,
    pub transform_index: Vec<i32>,
    pub global_id: Option<Vec<String>>,
}

impl InstanceTable {
    pub fn len(&self) -> usize {
        self.entity_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_index.is_empty()
    }
}

/// Fixed-point vertex coordinates, shared across all meshes.
#[derive(Debug, Default, Clone)]
pub struct VertexTable {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
}

impl VertexTable {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Global index buffer; values are local to their owning mesh.
#[derive(Debug, Default, Clone)]
pub struct IndexTable {
    pub indices: Vec<u32>,
}

impl IndexTable {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Per-mesh start offsets into the vertex and index tables.
///
/// A mesh's extent runs to the next mesh's offset, or the table end for
/// the last mesh.
#[derive(Debug, Default, Clone)]
pub struct MeshTable {
    pub vertex_offset: Vec<i32>,
    pub index_offset: Vec<i32>,
}

impl MeshTable {
    pub fn len(&self) -> usize {
        self.vertex_offset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_offset.is_empty()
    }
}

/// Byte-valued material channels (0..=255).
#[derive(Debug, Default, Clone)]
pub struct MaterialTable {
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
    pub alpha: Vec<u8>,
    pub roughness: Vec<u8>,
    pub metallic: Vec<u8>,
}

impl MaterialTable {
    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

/// One TRS placement per row.
#[derive(Debug, Default, Clone)]
pub struct TransformTable {
    pub tx: Vec<f32>,
    pub ty: Vec<f32>,
    pub tz: Vec<f32>,
    pub qx: Vec<f32>,
    pub qy: Vec<f32>,
    pub qz: Vec<f32>,
    pub qw: Vec<f32>,
    pub sx: Vec<f32>,
    pub sy: Vec<f32>,
    pub sz: Vec<f32>,
}

impl TransformTable {
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Converts a raw index column value into a checked `usize` index.
///
/// Returns `None` for the negative "absent" sentinel and for values past
/// the end of the referenced table.
pub fn checked_index(value: i32, len: usize) -> Option<usize> {
    if value < 0 {
        return None;
    }
    let index = value as usize;
    (index < len).then_some(index)
}

/// The full decoded table bundle.
#[derive(Debug, Default, Clone)]
pub struct GeometryTables {
    pub instances: InstanceTable,
    pub vertices: VertexTable,
    pub indices: IndexTable,
    pub meshes: MeshTable,
    pub materials: MaterialTable,
    pub transforms: TransformTable,
}

impl GeometryTables {
    /// Fails fast on malformed tables: mismatched parallel-array lengths,
    /// non-monotonic mesh offsets, or offsets past their table's end.
    pub fn validate(&self) -> Result<()> {
        let i = &self.instances;
        check_lengths(
            "Instances",
            i.len(),
            &[
                ("ElementMaterialIndex", i.material_index.len()),
                ("ElementMeshIndex", i.mesh_index.len()),
                ("ElementTransformIndex", i.transform_index.len()),
            ],
        )?;
        if let Some(global_id) = &i.global_id {
            check_lengths("Instances", i.len(), &[("GlobalId", global_id.len())])?;
        }

        let v = &self.vertices;
        check_lengths(
            "VertexBuffer",
            v.len(),
            &[("VertexY", v.y.len()), ("VertexZ", v.z.len())],
        )?;

        let m = &self.meshes;
        check_lengths(
            "Meshes",
            m.len(),
            &[("MeshIndexOffset", m.index_offset.len())],
        )?;
        check_offsets("MeshVertexOffset", &m.vertex_offset, v.len())?;
        check_offsets("MeshIndexOffset", &m.index_offset, self.indices.len())?;

        let mat = &self.materials;
        check_lengths(
            "Materials",
            mat.len(),
            &[
                ("MaterialGreen", mat.green.len()),
                ("MaterialBlue", mat.blue.len()),
                ("MaterialAlpha", mat.alpha.len()),
                ("MaterialRoughness", mat.roughness.len()),
                ("MaterialMetallic", mat.metallic.len()),
            ],
        )?;

        let t = &self.transforms;
        check_lengths(
            "Transforms",
            t.len(),
            &[
                ("TransformTY", t.ty.len()),
                ("TransformTZ", t.tz.len()),
                ("TransformQX", t.qx.len()),
                ("TransformQY", t.qy.len()),
                ("TransformQZ", t.qz.len()),
                ("TransformQW", t.qw.len()),
                ("TransformSX", t.sx.len()),
                ("TransformSY", t.sy.len()),
                ("TransformSZ", t.sz.len()),
            ],
        )?;

        Ok(())
    }

    /// Vertex slice for mesh `m`, running to the next mesh's offset or
    /// the vertex table end.
    ///
    /// Offsets were range-checked by [`Self::validate`].
    pub fn mesh_vertex_range(&self, m: usize) -> Range<usize> {
        let start = self.meshes.vertex_offset[m] as usize;
        let end = match self.meshes.vertex_offset.get(m + 1) {
            Some(next) => *next as usize,
            None => self.vertices.len(),
        };
        start..end
    }

    /// Index slice for mesh `m`, running to the next mesh's offset or
    /// the index table end.
    pub fn mesh_index_range(&self, m: usize) -> Range<usize> {
        let start = self.meshes.index_offset[m] as usize;
        let end = match self.meshes.index_offset.get(m + 1) {
            Some(next) => *next as usize,
            None => self.indices.len(),
        };
        start..end
    }
}

fn check_lengths(
    table: &'static str,
    expected: usize,
    columns: &[(&'static str, usize)],
) -> Result<()> {
    for (column, actual) in columns {
        if *actual != expected {
            return Err(BosTableError::LengthMismatch {
                table,
                column,
                expected,
                actual: *actual,
            });
        }
    }
    Ok(())
}

fn check_offsets(column: &'static str, offsets: &[i32], table_len: usize) -> Result<()> {
    let mut prev = 0i32;
    for (row, offset) in offsets.iter().copied().enumerate() {
        if offset < 0 || offset as usize > table_len {
            return Err(BosTableError::OffsetOutOfRange {
                column,
                row,
                offset,
                len: table_len,
            });
        }
        if offset < prev {
            return Err(BosTableError::OffsetNotMonotonic {
                column,
                row,
                prev,
                next: offset,
            });
        }
        prev = offset;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_mesh_tables() -> GeometryTables {
        // mesh 0: vertices [0, 3), indices [0, 3)
        // mesh 1: vertices [3, 7), indices [3, 9)
        GeometryTables {
            vertices: VertexTable {
                x: vec![0; 7],
                y: vec![0; 7],
                z: vec![0; 7],
            },
            indices: IndexTable {
                indices: vec![0, 1, 2, 0, 1, 2, 1, 2, 3],
            },
            meshes: MeshTable {
                vertex_offset: vec![0, 3],
                index_offset: vec![0, 3],
            },
            ..Default::default()
        }
    }

    #[test]
    fn mesh_ranges_end_at_next_offset_or_table_end() {
        let tables = two_mesh_tables();
        assert_eq!(tables.mesh_vertex_range(0), 0..3);
        assert_eq!(tables.mesh_vertex_range(1), 3..7);
        assert_eq!(tables.mesh_index_range(0), 0..3);
        assert_eq!(tables.mesh_index_range(1), 3..9);
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        let mut tables = two_mesh_tables();
        tables.vertices.z.pop();
        let err = tables.validate().unwrap_err();
        assert!(matches!(
            err,
            BosTableError::LengthMismatch {
                table: "VertexBuffer",
                column: "VertexZ",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_non_monotonic_offsets() {
        let mut tables = two_mesh_tables();
        tables.meshes.index_offset = vec![3, 0];
        assert!(matches!(
            tables.validate().unwrap_err(),
            BosTableError::OffsetNotMonotonic { .. }
        ));
    }

    #[test]
    fn validate_rejects_offset_past_table_end() {
        let mut tables = two_mesh_tables();
        tables.meshes.vertex_offset = vec![0, 99];
        assert!(matches!(
            tables.validate().unwrap_err(),
            BosTableError::OffsetOutOfRange { .. }
        ));
    }

    #[test]
    fn checked_index_handles_sentinel_and_range() {
        assert_eq!(checked_index(-1, 10), None);
        assert_eq!(checked_index(10, 10), None);
        assert_eq!(checked_index(9, 10), Some(9));
    }
}
