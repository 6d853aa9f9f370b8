//! Isolation ("ghosting"): fade every entity except a focus set without
//! removing anything from the scene.

use std::collections::{HashMap, HashSet};

use bos_tables::InstanceTable;

use crate::scene::Scene;

/// Default opacity for ghosted entities.
pub const DEFAULT_GHOST_OPACITY: f32 = 0.1;

/// Resolves external global ids to entity indices and drives the
/// per-slot opacity channels of a [`Scene`].
///
/// The ghost factors it writes reach the shading stage as a single
/// multiplicative factor on the final alpha.
pub struct GhostController {
    global_id_to_entity: HashMap<String, i32>,
}

impl GhostController {
    /// Builds the reverse global-id index; empty when the optional
    /// `GlobalId` column was not delivered.
    pub fn new(instances: &InstanceTable) -> Self {
        let global_id_to_entity = match &instances.global_id {
            Some(global_ids) => global_ids
                .iter()
                .zip(&instances.entity_index)
                .map(|(id, entity)| (id.clone(), *entity))
                .collect(),
            None => HashMap::new(),
        };

        Self {
            global_id_to_entity,
        }
    }

    pub fn entity_from_global_id(&self, global_id: &str) -> Option<i32> {
        self.global_id_to_entity.get(global_id).copied()
    }

    /// Shows the given global ids at full opacity and ghosts everything
    /// else. Unknown ids are ignored.
    pub fn isolate<S: AsRef<str>>(&self, scene: &mut Scene, global_ids: &[S], ghost_opacity: f32) {
        let focused: HashSet<i32> = global_ids
            .iter()
            .filter_map(|id| self.entity_from_global_id(id.as_ref()))
            .collect();
        self.isolate_entities(scene, &focused, ghost_opacity);
    }

    /// Same as [`Self::isolate`], with already-resolved entity indices.
    pub fn isolate_entities(&self, scene: &mut Scene, focused: &HashSet<i32>, ghost_opacity: f32) {
        for (_, mesh) in scene.iter_mut() {
            mesh.apply_isolation(focused, ghost_opacity);
        }
        scene.mark_updated();
    }

    /// Restores full opacity on every entity.
    pub fn clear_isolation(&self, scene: &mut Scene) {
        for (_, mesh) in scene.iter_mut() {
            mesh.clear_isolation();
        }
        scene.mark_updated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_scene;
    use crate::fixtures::{fixture_tables, Row};
    use crate::scene::SubMesh;

    /// Entities 1 and 2 share an instanced batch; entity 3 is a merged
    /// singleton.
    fn scene_and_ghost() -> (Scene, GhostController) {
        let rows = [
            Row::new(1, 0, 0, 0),
            Row::new(2, 0, 0, 1),
            Row::new(3, 1, 1, 0),
        ];
        let tables = fixture_tables(&rows, &[[0.0; 3], [5.0, 0.0, 0.0]]);
        let scene = build_scene(&tables).unwrap();
        let ghost = GhostController::new(&tables.instances);
        (scene, ghost)
    }

    fn opacity_of(scene: &Scene, entity: i32) -> f32 {
        let views: &[SubMesh] = scene.meshes_from_instance(entity);
        assert_eq!(views.len(), 1);
        let sub = views[0];
        scene.mesh(sub.mesh).unwrap().slot_opacity(sub.index)
    }

    #[test]
    fn resolves_global_ids() {
        let (_, ghost) = scene_and_ghost();
        assert_eq!(ghost.entity_from_global_id("GID2"), Some(2));
        assert_eq!(ghost.entity_from_global_id("nope"), None);
    }

    #[test]
    fn isolate_round_trip() {
        let (mut scene, ghost) = scene_and_ghost();

        ghost.isolate(&mut scene, &["GID1"], 0.2);
        assert_eq!(opacity_of(&scene, 1), 1.0);
        assert_eq!(opacity_of(&scene, 2), 0.2);
        assert_eq!(opacity_of(&scene, 3), 0.2);

        ghost.clear_isolation(&mut scene);
        for entity in 1..=3 {
            assert_eq!(opacity_of(&scene, entity), 1.0);
        }
    }

    #[test]
    fn focused_entity_keeps_merged_primitive_visible() {
        let (mut scene, ghost) = scene_and_ghost();

        ghost.isolate(&mut scene, &["GID3"], 0.1);
        assert_eq!(opacity_of(&scene, 3), 1.0);
        assert_eq!(opacity_of(&scene, 1), 0.1);
        assert_eq!(opacity_of(&scene, 2), 0.1);
    }

    #[test]
    fn unknown_ids_ghost_everything() {
        let (mut scene, ghost) = scene_and_ghost();

        ghost.isolate(&mut scene, &["missing"], 0.3);
        for entity in 1..=3 {
            assert_eq!(opacity_of(&scene, entity), 0.3);
        }
    }

    #[test]
    fn isolation_marks_the_scene_updated() {
        let (mut scene, ghost) = scene_and_ghost();
        scene.clear_update_flag();

        ghost.isolate_entities(&mut scene, &HashSet::from([1]), 0.5);
        assert!(scene.updated());
    }
}
