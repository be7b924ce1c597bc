use std::collections::HashMap;

use glam::Vec3;

use crate::scene::{Mesh, Quad, QuadEdge, QuadSide, Vertex};
use crate::util::spatial::{same_position, EdgeKey};

/// Minimum cosine between the two triangle normals of a quad.
const PLANAR_COS: f32 = 0.95;

/// Result of pairing a triangle list into quads.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub quads: Vec<Quad>,
    /// Valid triangles left without a partner, ascending.
    pub loose_triangles: Vec<usize>,
}

struct TriInfo {
    corners: [u32; 3],
    positions: [Vec3; 3],
    normal: Vec3,
}

impl TriInfo {
    fn edge_len_sq(&self, edge: usize) -> f32 {
        self.positions[edge].distance_squared(self.positions[(edge + 1) % 3])
    }

    /// Local edges ordered longest first. Ties keep the lower edge.
    fn edges_by_length(&self) -> [usize; 3] {
        let mut order = [0, 1, 2];
        order.sort_by(|&a, &b| self.edge_len_sq(b).total_cmp(&self.edge_len_sq(a)));
        order
    }
}

/// Greedily pair adjacent triangles into quads.
///
/// Edges are matched by quantized position, so triangles that do not share
/// vertex indices still pair. The first pass only joins triangles across an
/// edge that is the longest of both (the usual split diagonal); the second
/// pass joins what is left across any shared coplanar edge. Triangles are
/// visited in index order, so the result is deterministic.
pub fn reconstruct_quads(mesh: &Mesh, epsilon: f32) -> Reconstruction {
    let tri_count = mesh.triangle_count();
    let mut tris: Vec<Option<TriInfo>> = Vec::with_capacity(tri_count);
    let mut adjacency: HashMap<EdgeKey, Vec<(usize, usize)>> = HashMap::new();

    for tri in 0..tri_count {
        let info = mesh.triangle(tri).zip(mesh.triangle_positions(tri)).and_then(|(corners, positions)| {
            let normal = super::calculate_face_normal(positions[0], positions[1], positions[2]);
            (normal != Vec3::ZERO).then_some(TriInfo { corners, positions, normal })
        });
        if let Some(info) = &info {
            for edge in 0..3 {
                let key = EdgeKey::new(info.positions[edge], info.positions[(edge + 1) % 3], epsilon);
                adjacency.entry(key).or_default().push((tri, edge));
            }
        } else {
            log::debug!("skipping malformed or degenerate triangle {tri}");
        }
        tris.push(info);
    }

    let mut paired = vec![false; tri_count];
    let mut quads = Vec::new();

    for strict in [true, false] {
        for tri in 0..tri_count {
            if paired[tri] {
                continue;
            }
            let Some(info) = &tris[tri] else {
                continue;
            };
            let edges = info.edges_by_length();
            let candidates: &[usize] = if strict { &edges[..1] } else { &edges[..] };

            'edges: for &edge in candidates {
                let key = EdgeKey::new(info.positions[edge], info.positions[(edge + 1) % 3], epsilon);
                let Some(neighbours) = adjacency.get(&key) else {
                    continue;
                };
                for &(other, other_edge) in neighbours {
                    if other == tri || paired[other] {
                        continue;
                    }
                    let Some(other_info) = &tris[other] else {
                        continue;
                    };
                    if strict && other_info.edges_by_length()[0] != other_edge {
                        continue;
                    }
                    if let Some(quad) = pair(tri, info, edge, other, other_info, other_edge, epsilon) {
                        paired[tri] = true;
                        paired[other] = true;
                        quads.push(quad);
                        break 'edges;
                    }
                }
            }
        }
    }

    let loose_triangles = (0..tri_count)
        .filter(|&t| !paired[t] && tris[t].is_some())
        .collect();

    Reconstruction { quads, loose_triangles }
}

/// Join two triangles across their shared edge, or `None` when they do not
/// form a valid quad (folded, opposite winding, repeated vertices).
fn pair(
    tri: usize,
    a: &TriInfo,
    edge: usize,
    other: usize,
    b: &TriInfo,
    other_edge: usize,
    epsilon: f32,
) -> Option<Quad> {
    if a.normal.dot(b.normal) < PLANAR_COS {
        return None;
    }
    // Consistent winding walks the shared edge in opposite directions.
    if !same_position(a.positions[edge], b.positions[(other_edge + 1) % 3], epsilon) {
        return None;
    }
    let opposite_a = a.positions[(edge + 2) % 3];
    let opposite_b = b.positions[(other_edge + 2) % 3];
    if same_position(opposite_a, opposite_b, epsilon) {
        return None;
    }

    let s0 = a.corners[edge];
    let s1 = a.corners[(edge + 1) % 3];
    let o = a.corners[(edge + 2) % 3];
    let o2 = b.corners[(other_edge + 2) % 3];
    let verts = [s1, o, s0, o2];
    for i in 0..4 {
        for j in i + 1..4 {
            if verts[i] == verts[j] {
                return None;
            }
        }
    }
    Some(Quad { verts, triangles: [tri, other] })
}

/// Collect the perimeter edges of `quads`, merging edges that coincide in
/// position. Edges appear in the order they are first met.
pub fn build_quad_edges(vertices: &[Vertex], quads: &[Quad], epsilon: f32) -> Vec<QuadEdge> {
    let mut edges: Vec<QuadEdge> = Vec::new();
    let mut lookup: HashMap<EdgeKey, usize> = HashMap::new();

    for (qi, quad) in quads.iter().enumerate() {
        let Some(positions) = quad.positions(vertices) else {
            continue;
        };
        for side in 0..4 {
            let key = EdgeKey::new(positions[side], positions[(side + 1) % 4], epsilon);
            let border = QuadSide { quad: qi, side };
            match lookup.get(&key) {
                Some(&ei) => edges[ei].borders.push(border),
                None => {
                    let (v0, v1) = quad.edge(side);
                    lookup.insert(key, edges.len());
                    edges.push(QuadEdge { v0, v1, borders: vec![border] });
                }
            }
        }
    }

    edges
}

/// An edge two quads have in common, as vertex indices of the first quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedEdge {
    pub v0: u32,
    pub v1: u32,
    pub side_a: usize,
    pub side_b: usize,
}

/// Find the perimeter edge shared by quads `a` and `b`, matching by position.
///
/// Pairwise query for hosts that hold two quads without a topology cache.
/// The edge loop walk reads the same adjacency from `QuadEdge::borders`,
/// which `build_quad_edges` derives with identical position matching.
pub fn find_shared_edge(vertices: &[Vertex], a: &Quad, b: &Quad, epsilon: f32) -> Option<SharedEdge> {
    let pa = a.positions(vertices)?;
    let pb = b.positions(vertices)?;
    for side_a in 0..4 {
        let (a0, a1) = (pa[side_a], pa[(side_a + 1) % 4]);
        for side_b in 0..4 {
            let (b0, b1) = (pb[side_b], pb[(side_b + 1) % 4]);
            let forward = same_position(a0, b0, epsilon) && same_position(a1, b1, epsilon);
            let backward = same_position(a0, b1, epsilon) && same_position(a1, b0, epsilon);
            if forward || backward {
                let (v0, v1) = a.edge(side_a);
                return Some(SharedEdge { v0, v1, side_a, side_b });
            }
        }
    }
    None
}
