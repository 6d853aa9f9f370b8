//! The render-ready primitive: one instanced or merged draw batch.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use glam::Mat4;
use slotmap::new_key_type;

use super::error::{BosSceneError, Result};
use crate::bounds::Aabb;
use crate::geometry::MeshGeometry;
use crate::material::Material;

new_key_type! {
    pub struct MeshKey;
}

/// Indices per triangle face.
pub const INDICES_PER_FACE: u32 = 3;

/// View onto one instance's contribution within a mesh: an instance slot
/// for instanced meshes, a position in the sub-mesh offsets for merged
/// meshes. Never owns anything; resolve through the owning [`Scene`].
///
/// [`Scene`]: super::Scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub mesh: MeshKey,
    pub index: usize,
}

/// Which representation the batch builder chose for this mesh.
#[derive(Debug)]
pub enum Repr {
    /// One shared geometry drawn N times with per-instance matrices.
    Instanced {
        matrices: Vec<Mat4>,
        /// Per-instance ghost factor, allocated on first isolation.
        opacity: Option<Vec<f32>>,
    },
    /// One concatenated geometry with transforms baked into vertices.
    Merged {
        /// Strictly increasing index-buffer start offsets, one per
        /// constituent instance, in index counts.
        sub_mesh_offsets: Vec<u32>,
        /// Primitive-level ghost factor (merged batches cannot carry a
        /// per-instance channel).
        ghost_opacity: f32,
    },
}

#[derive(Debug)]
pub struct Mesh {
    geometry: Arc<MeshGeometry>,
    material: Arc<Material>,
    original_material: Option<Arc<Material>>,
    /// Entity ids in slot order; slot <-> instance correspondence is fixed.
    pub instances: Vec<i32>,
    /// One placed-space box per instance, in slot order.
    pub instance_boxes: Vec<Aabb>,
    bounding_box: Aabb,
    /// Opts this mesh out of scene-wide material overrides.
    pub ignore_scene_material: bool,
    repr: Repr,
}

impl Mesh {
    pub fn instanced(
        geometry: Arc<MeshGeometry>,
        material: Arc<Material>,
        instances: Vec<i32>,
        matrices: Vec<Mat4>,
        instance_boxes: Vec<Aabb>,
    ) -> Self {
        Self::new(
            geometry,
            material,
            instances,
            instance_boxes,
            Repr::Instanced {
                matrices,
                opacity: None,
            },
        )
    }

    pub fn merged(
        geometry: Arc<MeshGeometry>,
        material: Arc<Material>,
        instances: Vec<i32>,
        sub_mesh_offsets: Vec<u32>,
        instance_boxes: Vec<Aabb>,
    ) -> Self {
        Self::new(
            geometry,
            material,
            instances,
            instance_boxes,
            Repr::Merged {
                sub_mesh_offsets,
                ghost_opacity: 1.0,
            },
        )
    }

    fn new(
        geometry: Arc<MeshGeometry>,
        material: Arc<Material>,
        instances: Vec<i32>,
        instance_boxes: Vec<Aabb>,
        repr: Repr,
    ) -> Self {
        let bounding_box =
            Aabb::union_all(instance_boxes.iter()).unwrap_or(geometry.local_aabb);

        Self {
            geometry,
            material,
            original_material: None,
            instances,
            instance_boxes,
            bounding_box,
            ignore_scene_material: false,
            repr,
        }
    }

    pub fn geometry(&self) -> &Arc<MeshGeometry> {
        &self.geometry
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn repr(&self) -> &Repr {
        &self.repr
    }

    pub fn is_merged(&self) -> bool {
        matches!(self.repr, Repr::Merged { .. })
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Union of all instance boxes.
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// Entity id at `slot`.
    pub fn entity(&self, slot: usize) -> Result<i32> {
        self.instances
            .get(slot)
            .copied()
            .ok_or(BosSceneError::SlotOutOfRange {
                slot,
                count: self.instances.len(),
            })
    }

    /// Placed-space bounding box for `slot`.
    pub fn instance_box(&self, slot: usize) -> Result<Aabb> {
        self.instance_boxes
            .get(slot)
            .copied()
            .ok_or(BosSceneError::SlotOutOfRange {
                slot,
                count: self.instance_boxes.len(),
            })
    }

    /// Resolves a face index into the owning sub-mesh slot.
    ///
    /// Merged meshes only; the sub-mesh offsets are strictly increasing
    /// by construction, so the greatest offset at or below
    /// `face * INDICES_PER_FACE` identifies the owner.
    pub fn slot_from_face(&self, face: u32) -> Result<usize> {
        let Repr::Merged {
            sub_mesh_offsets, ..
        } = &self.repr
        else {
            return Err(BosSceneError::NotMerged);
        };

        let target = face * INDICES_PER_FACE;
        if target as usize >= self.geometry.index_count() {
            return Err(BosSceneError::FaceOutOfRange {
                face,
                index_count: self.geometry.index_count(),
            });
        }

        // partition_point returns the first offset beyond the target;
        // the owner is the slot before it.
        sub_mesh_offsets
            .partition_point(|&offset| offset <= target)
            .checked_sub(1)
            .ok_or(BosSceneError::FaceOutOfRange {
                face,
                index_count: self.geometry.index_count(),
            })
    }

    /// Index-buffer sub-range owned by `slot` of a merged mesh.
    pub fn index_range(&self, slot: usize) -> Result<Range<u32>> {
        let Repr::Merged {
            sub_mesh_offsets, ..
        } = &self.repr
        else {
            return Err(BosSceneError::NotMerged);
        };

        let start = *sub_mesh_offsets
            .get(slot)
            .ok_or(BosSceneError::SlotOutOfRange {
                slot,
                count: sub_mesh_offsets.len(),
            })?;
        let end = match sub_mesh_offsets.get(slot + 1) {
            Some(next) => *next,
            None => self.geometry.index_count() as u32,
        };
        Ok(start..end)
    }

    /// Swaps in an override material; `None` restores the exact original.
    pub fn set_override_material(&mut self, value: Option<Arc<Material>>) {
        if self.ignore_scene_material {
            return;
        }

        match value {
            Some(material) => {
                if Arc::ptr_eq(&material, &self.material) {
                    return;
                }
                if self.original_material.is_none() {
                    self.original_material = Some(self.material.clone());
                }
                self.material = material;
            }
            None => {
                if let Some(original) = self.original_material.take() {
                    self.material = original;
                }
            }
        }
    }

    /// Ghost factor for `slot`: the per-instance channel for instanced
    /// meshes, the primitive-level factor for merged ones. Multiplies
    /// the material's final alpha in the shading stage.
    pub fn slot_opacity(&self, slot: usize) -> f32 {
        match &self.repr {
            Repr::Instanced { opacity, .. } => opacity
                .as_ref()
                .and_then(|channel| channel.get(slot).copied())
                .unwrap_or(1.0),
            Repr::Merged { ghost_opacity, .. } => *ghost_opacity,
        }
    }

    /// Ghosts every slot whose entity is outside the focus set.
    ///
    /// For merged meshes a single focused entity keeps the whole
    /// primitive at full opacity.
    pub(crate) fn apply_isolation(&mut self, focused: &HashSet<i32>, ghost_opacity: f32) {
        match &mut self.repr {
            Repr::Instanced { opacity, .. } => {
                let channel =
                    opacity.get_or_insert_with(|| vec![1.0; self.instances.len()]);
                for (slot, entity) in self.instances.iter().enumerate() {
                    channel[slot] = if focused.contains(entity) {
                        1.0
                    } else {
                        ghost_opacity
                    };
                }
            }
            Repr::Merged { ghost_opacity: factor, .. } => {
                let any_focused = self.instances.iter().any(|e| focused.contains(e));
                *factor = if any_focused { 1.0 } else { ghost_opacity };
            }
        }
    }

    /// Restores full opacity everywhere; keeps an allocated channel.
    pub(crate) fn clear_isolation(&mut self) {
        match &mut self.repr {
            Repr::Instanced { opacity, .. } => {
                if let Some(channel) = opacity {
                    channel.fill(1.0);
                }
            }
            Repr::Merged { ghost_opacity, .. } => {
                *ghost_opacity = 1.0;
            }
        }
    }
}
