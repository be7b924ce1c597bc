pub mod gizmo;

use std::collections::{BTreeSet, HashMap};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{Mesh, QuadTopology};
use crate::settings::PickingSettings;
use crate::util::picking::{self, CameraView, Ray};

pub use gizmo::{DragScope, Gizmo, GizmoAxis, GizmoDrag, GizmoMode};

/// Selection granularity for edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    #[default]
    Vertex,
    Edge,
    Face,
    Quad,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 4] = [
        SelectionMode::Vertex,
        SelectionMode::Edge,
        SelectionMode::Face,
        SelectionMode::Quad,
    ];

    fn slot(self) -> usize {
        match self {
            SelectionMode::Vertex => 0,
            SelectionMode::Edge => 1,
            SelectionMode::Face => 2,
            SelectionMode::Quad => 3,
        }
    }
}

/// Selected indices per granularity.
///
/// Vertex entries index the vertex array, edge entries `QuadTopology::edges`,
/// face entries triangles and quad entries `QuadTopology::quads`. Every mode
/// keeps its own set, so switching modes and back restores the old selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    mode: SelectionMode,
    sets: [BTreeSet<usize>; 4],
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn selected(&self, mode: SelectionMode) -> &BTreeSet<usize> {
        &self.sets[mode.slot()]
    }

    /// Selection of the active mode.
    pub fn active(&self) -> &BTreeSet<usize> {
        self.selected(self.mode)
    }

    pub fn has_selection(&self) -> bool {
        !self.active().is_empty()
    }

    pub fn clear_mode(&mut self, mode: SelectionMode) {
        self.sets[mode.slot()].clear();
    }

    pub fn clear_all(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }

    /// Replace the selection of `mode` with `indices`.
    pub fn select(&mut self, mode: SelectionMode, indices: impl IntoIterator<Item = usize>) {
        let set = &mut self.sets[mode.slot()];
        set.clear();
        set.extend(indices);
    }

    /// Fold a pick result into the selection of `mode`.
    ///
    /// Without multi-select a hit replaces the selection and a miss clears
    /// it. With multi-select a hit toggles membership and a miss changes
    /// nothing. Returns whether the pick hit something.
    pub fn apply_pick(&mut self, mode: SelectionMode, hit: Option<usize>, multi_select: bool) -> bool {
        let set = &mut self.sets[mode.slot()];
        match (hit, multi_select) {
            (Some(index), true) => {
                if !set.remove(&index) {
                    set.insert(index);
                }
                true
            }
            (Some(index), false) => {
                set.clear();
                set.insert(index);
                true
            }
            (None, true) => false,
            (None, false) => {
                set.clear();
                false
            }
        }
    }

    /// Pick under the cursor at the active granularity and fold the result in.
    pub fn pick(
        &mut self,
        mesh: &Mesh,
        topology: &QuadTopology,
        camera: &CameraView,
        mouse: Vec2,
        multi_select: bool,
        settings: &PickingSettings,
    ) -> bool {
        let hit = match self.mode {
            SelectionMode::Vertex => {
                picking::pick_vertex(&mesh.vertices, camera, mouse, settings.vertex_pick_threshold)
            }
            SelectionMode::Edge => picking::pick_edge(
                &topology.edges,
                &mesh.vertices,
                camera,
                mouse,
                settings.edge_pick_threshold,
            ),
            SelectionMode::Face => picking::pick_face(mesh, &Ray::from_camera(mouse, camera)),
            SelectionMode::Quad => {
                picking::pick_quad(&topology.quads, &mesh.vertices, &Ray::from_camera(mouse, camera))
            }
        };
        if let Some(h) = &hit {
            log::debug!("picked {:?} {} at {:.3}", self.mode, h.index, h.distance);
        }
        self.apply_pick(self.mode, hit.map(|h| h.index), multi_select)
    }

    /// Vertex indices a transform of the active selection must move.
    pub fn affected_vertices(&self, mesh: &Mesh, topology: &QuadTopology) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        let count = mesh.vertices.len();
        for &i in self.active() {
            match self.mode {
                SelectionMode::Vertex => {
                    if i < count {
                        out.insert(i as u32);
                    }
                }
                SelectionMode::Edge => {
                    if let Some(edge) = topology.edges.get(i) {
                        out.extend([edge.v0, edge.v1].into_iter().filter(|&v| (v as usize) < count));
                    }
                }
                SelectionMode::Face => {
                    if let Some(corners) = mesh.triangle(i) {
                        out.extend(corners);
                    }
                }
                SelectionMode::Quad => {
                    if let Some(quad) = topology.quads.get(i)
                        && quad.positions(&mesh.vertices).is_some()
                    {
                        out.extend(quad.verts);
                    }
                }
            }
        }
        out
    }

    /// Mean position of every vertex the active selection references.
    /// Zero for an empty selection; check `has_selection` first.
    pub fn center(&self, mesh: &Mesh, topology: &QuadTopology) -> Vec3 {
        let affected = self.affected_vertices(mesh, topology);
        if affected.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = affected.iter().map(|&i| mesh.vertices[i as usize].pos()).sum();
        sum / affected.len() as f32
    }

    /// Carry quad and edge selections over to a rebuilt topology.
    ///
    /// Quads and edges are matched by the vertex indices they span, so a
    /// selection follows its element when the rebuild reorders the lists.
    /// Entries without a counterpart in `new` are dropped.
    pub fn remap(&mut self, old: &QuadTopology, new: &QuadTopology) {
        let quad_key = |verts: [u32; 4]| {
            let mut key = verts;
            key.sort_unstable();
            key
        };
        let edge_key = |a: u32, b: u32| if a < b { (a, b) } else { (b, a) };

        let mut new_quads: HashMap<[u32; 4], usize> = HashMap::new();
        for (i, quad) in new.quads.iter().enumerate() {
            new_quads.entry(quad_key(quad.verts)).or_insert(i);
        }
        let quads = &mut self.sets[SelectionMode::Quad.slot()];
        *quads = quads
            .iter()
            .filter_map(|&i| old.quads.get(i))
            .filter_map(|q| new_quads.get(&quad_key(q.verts)).copied())
            .collect();

        let mut new_edges: HashMap<(u32, u32), usize> = HashMap::new();
        for (i, edge) in new.edges.iter().enumerate() {
            new_edges.entry(edge_key(edge.v0, edge.v1)).or_insert(i);
        }
        let edges = &mut self.sets[SelectionMode::Edge.slot()];
        *edges = edges
            .iter()
            .filter_map(|&i| old.edges.get(i))
            .filter_map(|e| new_edges.get(&edge_key(e.v0, e.v1)).copied())
            .collect();
    }

    /// Drop indices that no longer exist after the mesh or topology changed.
    pub fn prune(&mut self, mesh: &Mesh, topology: &QuadTopology) {
        let limits = [
            mesh.vertices.len(),
            topology.edges.len(),
            mesh.triangle_count(),
            topology.quads.len(),
        ];
        for (set, limit) in self.sets.iter_mut().zip(limits) {
            set.retain(|&i| i < limit);
        }
    }
}
