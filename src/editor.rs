use std::collections::BTreeSet;

use glam::{Vec2, Vec3};

use crate::history::{MeshState, UndoManager};
use crate::ops;
use crate::scene::{Mesh, QuadTopology};
use crate::settings::Settings;
use crate::tools::edit::{Gizmo, GizmoMode, SelectionMode, SelectionState};
use crate::util::picking::CameraView;

/// What a click ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The cursor grabbed a gizmo arm; a drag is in progress.
    GizmoDrag,
    /// The click went to picking and selected something.
    Selected,
    /// The click missed everything.
    Missed,
}

/// A gizmo drag in progress.
struct ActiveEdit {
    /// Geometry before the drag (and before any armed extrusion).
    before: MeshState,
    vertices: BTreeSet<u32>,
    /// Pivot for scale and rotate.
    pivot: Vec3,
    changed: bool,
}

/// Edit-mode session over one mesh.
///
/// Owns the live mesh together with its quad topology cache, selection,
/// gizmo and undo history, and routes pointer input between them. Whenever
/// the vertex or index arrays change a rebuild request is raised, which the
/// host collects with `take_rebuild_request` to re-upload its GPU buffers.
pub struct Editor {
    mesh: Mesh,
    topology: QuadTopology,
    selection: SelectionState,
    gizmo: Gizmo,
    history: UndoManager,
    settings: Settings,
    extrude_armed: bool,
    active: Option<ActiveEdit>,
    needs_rebuild: bool,
}

impl Editor {
    pub fn new(mesh: Mesh, settings: Settings) -> Self {
        let settings = settings.validated();
        let topology = QuadTopology::build(&mesh, settings.edit.position_epsilon);
        Self {
            mesh,
            topology,
            selection: SelectionState::new(),
            gizmo: Gizmo::new(settings.gizmo.clone()),
            history: UndoManager::new(settings.history.undo_levels),
            settings,
            extrude_armed: false,
            active: None,
            needs_rebuild: true,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn topology(&self) -> &QuadTopology {
        &self.topology
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn gizmo(&self) -> &Gizmo {
        &self.gizmo
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_extrude_armed(&self) -> bool {
        self.extrude_armed
    }

    fn epsilon(&self) -> f32 {
        self.settings.edit.position_epsilon
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        if self.active.is_some() {
            log::warn!("ignoring gizmo mode change during a drag");
            return;
        }
        self.gizmo.set_mode(mode);
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.selection.mode() != mode {
            self.extrude_armed = false;
        }
        self.selection.set_mode(mode);
        self.sync_gizmo();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_all();
        self.extrude_armed = false;
    }

    /// Swap in a different mesh. Selection and history do not carry over.
    pub fn replace_mesh(&mut self, mesh: Mesh) {
        self.gizmo.end_drag();
        self.active = None;
        self.mesh = mesh;
        self.rebuild_topology();
        self.selection.clear_all();
        self.history.clear();
        self.extrude_armed = false;
        self.needs_rebuild = true;
        log::info!(
            "loaded mesh: {} vertices, {} triangles",
            self.mesh.vertices.len(),
            self.mesh.triangle_count()
        );
    }

    /// Re-centre the gizmo on the live selection. Returns whether the gizmo
    /// should be shown.
    pub fn sync_gizmo(&mut self) -> bool {
        if self.active.is_some() {
            return true;
        }
        if !self.selection.has_selection() {
            return false;
        }
        self.gizmo.set_position(self.selection.center(&self.mesh, &self.topology));
        true
    }

    /// Whether GPU buffers need re-uploading. Clears the request.
    pub fn take_rebuild_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_rebuild)
    }

    /// Primary button press. A hit on a gizmo arm starts a drag, anything else
    /// goes to picking at the current selection mode.
    pub fn click(&mut self, mouse: Vec2, camera: &CameraView, multi_select: bool) -> ClickOutcome {
        if self.active.is_some() {
            log::warn!("click while dragging, committing the previous drag");
            self.release();
        }

        if self.sync_gizmo() {
            let axis = self.gizmo.hit_test(mouse, camera);
            if self.gizmo.begin_drag(axis, mouse, camera) {
                self.start_edit();
                return ClickOutcome::GizmoDrag;
            }
        }

        let hit = self.selection.pick(
            &self.mesh,
            &self.topology,
            camera,
            mouse,
            multi_select,
            &self.settings.picking,
        );
        self.sync_gizmo();
        if hit { ClickOutcome::Selected } else { ClickOutcome::Missed }
    }

    fn start_edit(&mut self) {
        let before = MeshState::capture(&self.mesh);
        let extruded = if self.extrude_armed {
            self.extrude_armed = false;
            self.run_extrusion(0.0)
        } else {
            Vec::new()
        };

        // Fresh extrusion vertices are dragged alone; the old rim stays put.
        let vertices = if extruded.is_empty() {
            let affected = self.selection.affected_vertices(&self.mesh, &self.topology);
            ops::expand_coincident(&self.mesh.vertices, &affected, self.epsilon())
        } else {
            extruded.iter().copied().collect()
        };

        self.active = Some(ActiveEdit {
            before,
            vertices,
            pivot: self.gizmo.position(),
            changed: !extruded.is_empty(),
        });
    }

    /// Cursor motion. Applies the gizmo delta to the dragged vertices and
    /// returns whether geometry moved.
    pub fn pointer_moved(&mut self, mouse: Vec2) -> bool {
        let Some(edit) = self.active.as_mut() else {
            return false;
        };
        let delta = self.gizmo.continue_drag(mouse);
        if delta == 0.0 {
            return false;
        }
        let axis = self.gizmo.drag_axis();
        let vertices = &mut self.mesh.vertices;
        let moved = match self.gizmo.mode() {
            GizmoMode::Translate => {
                let offset = axis.direction() * delta;
                self.gizmo.set_position(self.gizmo.position() + offset);
                ops::move_vertices(vertices, &edit.vertices, offset)
            }
            GizmoMode::Scale => ops::scale_vertices(vertices, &edit.vertices, edit.pivot, 1.0 + delta, axis),
            GizmoMode::Rotate => ops::rotate_vertices(vertices, &edit.vertices, edit.pivot, delta, axis),
        };
        if moved > 0 {
            edit.changed = true;
            self.needs_rebuild = true;
        }
        moved > 0
    }

    /// Primary button release. Ends the drag and commits it to history if it
    /// changed the mesh. Returns whether a history entry was added.
    pub fn release(&mut self) -> bool {
        self.gizmo.end_drag();
        let Some(edit) = self.active.take() else {
            return false;
        };
        if !edit.changed {
            return false;
        }

        let touched = triangles_touching(&self.mesh, &edit.vertices);
        ops::recalculate_normals(&mut self.mesh, &touched);
        self.history.push_state(edit.before);
        self.rebuild_topology();
        self.needs_rebuild = true;
        log::info!("committed gizmo edit of {} vertices", edit.vertices.len());
        true
    }

    /// Arm extrusion: the next gizmo drag in quad or face mode extrudes the
    /// selection first and then drags the new vertices.
    pub fn arm_extrude(&mut self) -> bool {
        let mode = self.selection.mode();
        self.extrude_armed =
            matches!(mode, SelectionMode::Quad | SelectionMode::Face) && self.selection.has_selection();
        self.extrude_armed
    }

    /// Extrude the selection right away by the configured distance.
    pub fn extrude(&mut self) -> Vec<u32> {
        if self.active.is_some() {
            return Vec::new();
        }
        let before = MeshState::capture(&self.mesh);
        let created = self.run_extrusion(self.settings.edit.extrude_distance);
        if !created.is_empty() {
            self.history.push_state(before);
            log::info!("extruded selection: {} new vertices", created.len());
        }
        created
    }

    fn run_extrusion(&mut self, distance: f32) -> Vec<u32> {
        let eps = self.epsilon();
        let created = match self.selection.mode() {
            SelectionMode::Quad => ops::extrude_quads(
                &mut self.mesh,
                self.selection.active(),
                &self.topology.quads,
                distance,
                eps,
            ),
            SelectionMode::Face => {
                let faces: Vec<usize> = self.selection.active().iter().copied().collect();
                faces
                    .into_iter()
                    .flat_map(|face| ops::extrude_face(&mut self.mesh, face, distance))
                    .collect()
            }
            mode => {
                log::warn!("extrude needs quad or face selection, not {mode:?}");
                Vec::new()
            }
        };
        if created.is_empty() {
            return created;
        }

        self.rebuild_topology();
        if self.selection.mode() == SelectionMode::Quad {
            // Keep the moved caps selected.
            let caps: Vec<usize> = self
                .topology
                .quads
                .iter()
                .enumerate()
                .filter(|(_, q)| q.verts.iter().all(|v| created.contains(v)))
                .map(|(i, _)| i)
                .collect();
            self.selection.select(SelectionMode::Quad, caps);
        }
        self.needs_rebuild = true;
        created
    }

    /// Cut an edge loop through the first selected edge.
    /// Returns the number of vertices created.
    pub fn insert_edge_loop(&mut self) -> usize {
        if self.active.is_some() || self.selection.mode() != SelectionMode::Edge {
            return 0;
        }
        let Some(&edge) = self.selection.active().first() else {
            return 0;
        };
        let before = MeshState::capture(&self.mesh);
        let created = ops::insert_edge_loop(&mut self.mesh, edge, &self.topology.edges, &self.topology.quads);
        if created == 0 {
            return 0;
        }
        self.history.push_state(before);
        self.rebuild_topology();
        self.selection.clear_mode(SelectionMode::Edge);
        self.needs_rebuild = true;
        log::info!("inserted edge loop: {created} new vertices");
        created
    }

    pub fn undo(&mut self) -> bool {
        self.release();
        if !self.history.undo(&mut self.mesh) {
            return false;
        }
        self.after_history_step();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.release();
        if !self.history.redo(&mut self.mesh) {
            return false;
        }
        self.after_history_step();
        true
    }

    fn after_history_step(&mut self) {
        self.rebuild_topology();
        self.extrude_armed = false;
        self.needs_rebuild = true;
        self.sync_gizmo();
    }

    fn rebuild_topology(&mut self) {
        let topology = QuadTopology::build(&self.mesh, self.epsilon());
        self.selection.remap(&self.topology, &topology);
        self.topology = topology;
        self.selection.prune(&self.mesh, &self.topology);
    }
}

/// Every vertex sharing a triangle with one of `vertices`.
fn triangles_touching(mesh: &Mesh, vertices: &BTreeSet<u32>) -> BTreeSet<u32> {
    let mut out = vertices.clone();
    for tri in 0..mesh.triangle_count() {
        if let Some(corners) = mesh.triangle(tri)
            && corners.iter().any(|c| vertices.contains(c))
        {
            out.extend(corners);
        }
    }
    out
}
