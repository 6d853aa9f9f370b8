//! Small in-memory table bundles shared across test modules.

use bos_tables::{
    GeometryTables, IndexTable, InstanceTable, MaterialTable, MeshTable, TransformTable,
    VertexTable,
};

pub(crate) struct Row {
    pub entity: i32,
    pub mesh: i32,
    pub material: i32,
    pub transform: i32,
}

impl Row {
    pub fn new(entity: i32, mesh: i32, material: i32, transform: i32) -> Self {
        Self {
            entity,
            mesh,
            material,
            transform,
        }
    }
}

/// Three meshes (1, 2 and 3 triangles), two materials (opaque white,
/// semi-transparent), transforms from pure translations, and a GlobalId
/// per row derived from its entity id.
pub(crate) fn fixture_tables(rows: &[Row], translations: &[[f32; 3]]) -> GeometryTables {
    let scale = |v: f32| (v * 10_000.0) as i32;

    // mesh 0: triangle; mesh 1: quad (2 tris); mesh 2: fan (3 tris)
    let xs = [0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, -1.0];
    let ys = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];

    GeometryTables {
        instances: InstanceTable {
            entity_index: rows.iter().map(|r| r.entity).collect(),
            material_index: rows.iter().map(|r| r.material).collect(),
            mesh_index: rows.iter().map(|r| r.mesh).collect(),
            transform_index: rows.iter().map(|r| r.transform).collect(),
            global_id: Some(rows.iter().map(|r| format!("GID{}", r.entity)).collect()),
        },
        vertices: VertexTable {
            x: xs.iter().map(|v| scale(*v)).collect(),
            y: ys.iter().map(|v| scale(*v)).collect(),
            z: vec![0; 12],
        },
        indices: IndexTable {
            indices: vec![
                0, 1, 2, // mesh 0
                0, 1, 2, 0, 2, 3, // mesh 1
                0, 1, 2, 0, 2, 3, 0, 3, 4, // mesh 2
            ],
        },
        meshes: MeshTable {
            vertex_offset: vec![0, 3, 7],
            index_offset: vec![0, 3, 9],
        },
        materials: MaterialTable {
            red: vec![255, 204],
            green: vec![255, 0],
            blue: vec![255, 0],
            alpha: vec![255, 127],
            roughness: vec![128, 128],
            metallic: vec![0, 0],
        },
        transforms: TransformTable {
            tx: translations.iter().map(|t| t[0]).collect(),
            ty: translations.iter().map(|t| t[1]).collect(),
            tz: translations.iter().map(|t| t[2]).collect(),
            qx: vec![0.0; translations.len()],
            qy: vec![0.0; translations.len()],
            qz: vec![0.0; translations.len()],
            qw: vec![1.0; translations.len()],
            sx: vec![1.0; translations.len()],
            sy: vec![1.0; translations.len()],
            sz: vec![1.0; translations.len()],
        },
    }
}
