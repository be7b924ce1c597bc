use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ops;
use crate::scene::{Mesh, Vertex};

/// Two triangles sharing a diagonal, edited as one 4-vertex face.
///
/// `verts` walks the perimeter counter-clockwise seen from the face normal;
/// the diagonal runs from `verts[0]` to `verts[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub verts: [u32; 4],
    /// The two source triangles in the index buffer.
    pub triangles: [usize; 2],
}

impl Quad {
    pub fn positions(&self, vertices: &[Vertex]) -> Option<[Vec3; 4]> {
        let mut out = [Vec3::ZERO; 4];
        for (slot, &v) in out.iter_mut().zip(&self.verts) {
            *slot = vertices.get(v as usize)?.pos();
        }
        Some(out)
    }

    /// Perimeter edge `side` (0..4) as a vertex index pair.
    pub fn edge(&self, side: usize) -> (u32, u32) {
        (self.verts[side % 4], self.verts[(side + 1) % 4])
    }

    pub fn normal(&self, vertices: &[Vertex]) -> Vec3 {
        match self.positions(vertices) {
            Some(p) => ops::calculate_face_normal(p[0], p[1], p[2]),
            None => Vec3::ZERO,
        }
    }
}

/// Which side of which quad an edge borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadSide {
    pub quad: usize,
    pub side: usize,
}

/// A quad perimeter edge and the quads on either side of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadEdge {
    pub v0: u32,
    pub v1: u32,
    /// One entry for boundary edges, two for interior ones.
    pub borders: Vec<QuadSide>,
}

impl QuadEdge {
    pub fn is_boundary(&self) -> bool {
        self.borders.len() < 2
    }

    /// The border on the far side from `quad`, if any.
    pub fn other_side(&self, quad: usize) -> Option<QuadSide> {
        self.borders.iter().copied().find(|b| b.quad != quad)
    }
}

/// Derived quad view of a triangle mesh. Rebuilt whenever topology changes.
#[derive(Debug, Clone, Default)]
pub struct QuadTopology {
    pub quads: Vec<Quad>,
    pub edges: Vec<QuadEdge>,
    /// Triangles that could not be paired into a quad.
    pub loose_triangles: Vec<usize>,
}

impl QuadTopology {
    pub fn build(mesh: &Mesh, epsilon: f32) -> Self {
        let reconstruction = ops::reconstruct_quads(mesh, epsilon);
        let edges = ops::build_quad_edges(&mesh.vertices, &reconstruction.quads, epsilon);
        log::debug!(
            "quad topology: {} quads, {} edges, {} loose triangles",
            reconstruction.quads.len(),
            edges.len(),
            reconstruction.loose_triangles.len()
        );
        Self {
            quads: reconstruction.quads,
            edges,
            loose_triangles: reconstruction.loose_triangles,
        }
    }

    /// Index of the edge record bordering `side` of `quad`.
    pub fn edge_at(&self, quad: usize, side: usize) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.borders.iter().any(|b| b.quad == quad && b.side == side))
    }
}
