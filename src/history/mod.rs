use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::scene::{Mesh, Vertex};

pub const DEFAULT_UNDO_LEVELS: usize = 20;

/// Full copy of a mesh's geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshState {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshState {
    pub fn capture(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh.vertices.clone(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn restore(self, mesh: &mut Mesh) {
        mesh.vertices = self.vertices;
        mesh.indices = self.indices;
    }
}

/// Snapshot-based undo/redo history.
///
/// Each entry is the complete geometry as it was before an edit. Both stacks
/// hold at most `max_levels` entries; the oldest undo entry is dropped first.
pub struct UndoManager {
    undo_stack: VecDeque<MeshState>,
    redo_stack: VecDeque<MeshState>,
    max_levels: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LEVELS)
    }
}

impl UndoManager {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_levels: max_levels.max(1),
        }
    }

    /// Record the mesh as it is now, before an edit is applied.
    pub fn save_state(&mut self, mesh: &Mesh) {
        self.push_state(MeshState::capture(mesh));
    }

    /// Record a snapshot captured earlier, e.g. at the start of a drag.
    /// Any new edit invalidates the redo history.
    pub fn push_state(&mut self, state: MeshState) {
        self.undo_stack.push_back(state);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
    }

    /// Restore the most recent snapshot. Returns false if there was none.
    pub fn undo(&mut self, mesh: &mut Mesh) -> bool {
        let Some(state) = self.undo_stack.pop_back() else {
            return false;
        };
        push_capped(&mut self.redo_stack, MeshState::capture(mesh), self.max_levels);
        state.restore(mesh);
        true
    }

    pub fn redo(&mut self, mesh: &mut Mesh) -> bool {
        let Some(state) = self.redo_stack.pop_back() else {
            return false;
        };
        push_capped(&mut self.undo_stack, MeshState::capture(mesh), self.max_levels);
        state.restore(mesh);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Change the history depth, dropping the oldest entries that no longer fit.
    pub fn set_max_levels(&mut self, levels: usize) {
        self.max_levels = levels.max(1);
        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        while self.redo_stack.len() > self.max_levels {
            self.redo_stack.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn push_capped(stack: &mut VecDeque<MeshState>, state: MeshState, cap: usize) {
    stack.push_back(state);
    while stack.len() > cap {
        stack.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives;
    use glam::Vec3;

    fn nudge(mesh: &mut Mesh, dx: f32) {
        let p = mesh.vertices[0].pos();
        mesh.vertices[0].set_pos(p + Vec3::new(dx, 0.0, 0.0));
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut mesh = primitives::unit_quad();
        let original = mesh.clone();
        let mut history = UndoManager::default();

        history.save_state(&mesh);
        nudge(&mut mesh, 1.0);
        let edited = mesh.clone();

        assert!(history.undo(&mut mesh));
        assert_eq!(mesh, original);
        assert!(history.can_redo());
        assert!(history.redo(&mut mesh));
        assert_eq!(mesh, edited);
        assert_eq!((history.undo_count(), history.redo_count()), (1, 0));
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut mesh = primitives::unit_quad();
        let mut history = UndoManager::new(5);
        history.save_state(&mesh);
        nudge(&mut mesh, 1.0);
        history.undo(&mut mesh);
        assert_eq!(history.redo_count(), 1);
        history.save_state(&mesh);
        assert!(!history.can_redo());
    }

    #[test]
    fn oldest_entries_fall_off() {
        let mut mesh = primitives::unit_quad();
        let mut history = UndoManager::new(3);
        for step in 0..5 {
            history.save_state(&mesh);
            nudge(&mut mesh, 1.0);
            assert!(history.undo_count() <= 3, "step {step}");
        }
        assert_eq!(history.undo_count(), 3);
        while history.undo(&mut mesh) {}
        // The first two snapshots were trimmed, so x is back to 2, not 0.
        assert_eq!(mesh.vertices[0].pos().x, 2.0);

        history.set_max_levels(1);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut mesh = primitives::unit_quad();
        let before = mesh.clone();
        let mut history = UndoManager::default();
        assert!(!history.undo(&mut mesh));
        assert!(!history.redo(&mut mesh));
        assert_eq!(mesh, before);
        history.save_state(&mesh);
        history.clear();
        assert!(!history.can_undo());
    }

    #[test]
    fn full_depth_undo_then_redo_restores_every_state() {
        const DEPTH: usize = 4;
        let mut mesh = primitives::unit_quad();
        let mut history = UndoManager::new(DEPTH);
        let mut states = vec![mesh.clone()];
        for step in 1..=DEPTH {
            history.save_state(&mesh);
            nudge(&mut mesh, step as f32);
            mesh.indices.extend_from_slice(&[0, 1, 2]);
            states.push(mesh.clone());
        }
        assert_eq!(history.undo_count(), DEPTH);

        for expected in states[..DEPTH].iter().rev() {
            assert!(history.undo(&mut mesh));
            assert_eq!(&mesh, expected);
        }
        assert!(!history.can_undo());
        assert_eq!(history.redo_count(), DEPTH);

        for expected in &states[1..] {
            assert!(history.redo(&mut mesh));
            assert_eq!(&mesh, expected);
        }
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), DEPTH);
    }
}
