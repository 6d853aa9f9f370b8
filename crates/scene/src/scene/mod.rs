//! The object index: owns the primitives, maps instances back to them,
//! and tracks the aggregate bounding volume.

mod error;
mod mesh;

use std::collections::HashMap;
use std::sync::Arc;

use glam::Mat4;
use slotmap::SlotMap;

pub use error::BosSceneError;
pub use mesh::{Mesh, MeshKey, Repr, SubMesh, INDICES_PER_FACE};

use error::Result;

use crate::bounds::Aabb;
use crate::material::Material;

/// A Scene regroups many meshes.
///
/// It tracks the global bounding box as meshes are added and keeps a map
/// from entity ids to their sub-mesh views. Meshes are owned in an arena;
/// every back-reference is a [`MeshKey`] plus slot index.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: SlotMap<MeshKey, Mesh>,
    instance_to_sub_meshes: HashMap<i32, Vec<SubMesh>>,
    bounding_box: Option<Aabb>,
    matrix: Mat4,
    material_override: Option<Arc<Material>>,
    outline_count: usize,
    updated: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            ..Default::default()
        }
    }

    /// Adds a mesh, indexing every sub-mesh view it exposes and unioning
    /// its bounding box into the scene's.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        let key = self.meshes.insert(mesh);

        let mesh = &self.meshes[key];
        for (index, entity) in mesh.instances.iter().enumerate() {
            self.instance_to_sub_meshes
                .entry(*entity)
                .or_default()
                .push(SubMesh { mesh: key, index });
        }

        let placed = mesh.bounding_box().transformed(&self.matrix);
        self.union_box(placed);
        self.updated = true;
        key
    }

    pub fn mesh(&self, key: MeshKey) -> Result<&Mesh> {
        self.meshes.get(key).ok_or(BosSceneError::MeshNotFound(key))
    }

    pub fn mesh_mut(&mut self, key: MeshKey) -> Result<&mut Mesh> {
        self.updated = true;
        self.meshes
            .get_mut(key)
            .ok_or(BosSceneError::MeshNotFound(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshKey, &Mesh)> {
        self.meshes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (MeshKey, &mut Mesh)> {
        self.meshes.iter_mut()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Scene bounding box; `None` while the scene is empty.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.bounding_box
    }

    /// Sub-mesh views representing `entity`, across all meshes.
    pub fn meshes_from_instance(&self, entity: i32) -> &[SubMesh] {
        self.instance_to_sub_meshes
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bounds-checked sub-mesh view at an instance slot.
    pub fn sub_mesh(&self, key: MeshKey, index: usize) -> Result<SubMesh> {
        let mesh = self.mesh(key)?;
        if index >= mesh.instance_count() {
            return Err(BosSceneError::SlotOutOfRange {
                slot: index,
                count: mesh.instance_count(),
            });
        }
        Ok(SubMesh { mesh: key, index })
    }

    /// Resolves a picked face on a merged mesh back to its sub-mesh.
    pub fn sub_mesh_from_face(&self, key: MeshKey, face: u32) -> Result<SubMesh> {
        let index = self.mesh(key)?.slot_from_face(face)?;
        Ok(SubMesh { mesh: key, index })
    }

    /// Current root transform for all owned meshes.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Re-parents every mesh under a new root transform.
    ///
    /// The cached box is rebased by undoing the previous matrix and
    /// applying the new one, instead of recomputing from all instance
    /// boxes.
    pub fn apply_matrix4(&mut self, matrix: Mat4) {
        if let Some(aabb) = &mut self.bounding_box {
            *aabb = aabb.transformed(&(matrix * self.matrix.inverse()));
        }
        self.matrix = matrix;
        self.updated = true;
    }

    /// Absorbs another scene: meshes, instance map, bounding box.
    ///
    /// The other scene's keys are remapped into this arena; its sub-mesh
    /// views stay valid through the new keys.
    pub fn merge(&mut self, mut other: Scene) -> &mut Self {
        let mut remapped: HashMap<MeshKey, MeshKey> = HashMap::new();
        for (old_key, mesh) in other.meshes.drain() {
            remapped.insert(old_key, self.meshes.insert(mesh));
        }

        for (entity, sub_meshes) in other.instance_to_sub_meshes.drain() {
            let list = self.instance_to_sub_meshes.entry(entity).or_default();
            for sub in sub_meshes {
                list.push(SubMesh {
                    mesh: remapped[&sub.mesh],
                    index: sub.index,
                });
            }
        }

        if let Some(aabb) = other.bounding_box {
            self.union_box(aabb);
        }

        self.updated = true;
        self
    }

    pub fn material_override(&self) -> Option<&Arc<Material>> {
        self.material_override.as_ref()
    }

    /// Sets or clears the scene-wide override material, applying it to
    /// every mesh that participates in overrides.
    pub fn set_material_override(&mut self, value: Option<Arc<Material>>) {
        let unchanged = match (&self.material_override, &value) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.material_override = value.clone();
        for mesh in self.meshes.values_mut() {
            mesh.set_override_material(value.clone());
        }
        self.updated = true;
    }

    pub fn has_outline(&self) -> bool {
        self.outline_count > 0
    }

    pub fn add_outline(&mut self) {
        self.outline_count += 1;
        self.updated = true;
    }

    pub fn remove_outline(&mut self) {
        self.outline_count = self.outline_count.saturating_sub(1);
        self.updated = true;
    }

    /// True when anything changed since the last render sync.
    pub fn updated(&self) -> bool {
        self.updated
    }

    pub fn clear_update_flag(&mut self) {
        self.updated = false;
    }

    pub(crate) fn mark_updated(&mut self) {
        self.updated = true;
    }

    /// Releases all owned geometry.
    pub fn dispose(&mut self) {
        self.meshes.clear();
        self.instance_to_sub_meshes.clear();
        self.bounding_box = None;
        self.updated = true;
    }

    fn union_box(&mut self, aabb: Aabb) {
        self.bounding_box = Some(match self.bounding_box {
            Some(current) => current.union(&aabb),
            None => aabb,
        });
    }
}
