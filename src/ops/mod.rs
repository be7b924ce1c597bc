//! Stateless mesh edits over caller-owned vertex and index arrays.
//!
//! Every operation either mutates in place and reports what it touched, or
//! returns a count. Malformed input (out-of-range indices, zero-area
//! triangles) is skipped element by element rather than failing the batch.

mod edge_loop;
mod extrude;
mod quads;
mod transform;

use std::collections::BTreeSet;

use glam::Vec3;

use crate::scene::{Mesh, Vertex};
use crate::util::spatial::{same_position, SpatialHash};

pub use edge_loop::insert_edge_loop;
pub use extrude::{extrude_face, extrude_quads};
pub use quads::{build_quad_edges, find_shared_edge, reconstruct_quads, Reconstruction, SharedEdge};
pub use transform::{move_vertices, rotate_vertices, scale_vertices};

/// Unit normal of a counter-clockwise triangle, or zero when degenerate.
pub fn calculate_face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

/// Every vertex within `epsilon` of `source`, including `source` itself.
pub fn find_coincident_vertices(vertices: &[Vertex], source: u32, epsilon: f32) -> BTreeSet<u32> {
    let Some(origin) = vertices.get(source as usize).map(Vertex::pos) else {
        return BTreeSet::new();
    };
    vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| same_position(v.pos(), origin, epsilon))
        .map(|(i, _)| i as u32)
        .collect()
}

/// Grow `indices` with every vertex sharing a position with one of them.
pub fn expand_coincident(vertices: &[Vertex], indices: &BTreeSet<u32>, epsilon: f32) -> BTreeSet<u32> {
    let hash = SpatialHash::build(vertices, epsilon);
    let mut out = BTreeSet::new();
    for &i in indices {
        if let Some(v) = vertices.get(i as usize) {
            out.extend(hash.query(vertices, v.pos()));
        }
    }
    out
}

/// Recompute the normals of `affected` as the average of the unit normals of
/// every triangle they belong to. Other vertices are left untouched.
///
/// Returns the number of vertices whose normal was rewritten.
pub fn recalculate_normals(mesh: &mut Mesh, affected: &BTreeSet<u32>) -> usize {
    if affected.is_empty() {
        return 0;
    }
    let mut sums: Vec<(u32, Vec3)> = affected
        .iter()
        .filter(|&&i| (i as usize) < mesh.vertices.len())
        .map(|&i| (i, Vec3::ZERO))
        .collect();

    for tri in 0..mesh.triangle_count() {
        let (Some(corners), Some([a, b, c])) = (mesh.triangle(tri), mesh.triangle_positions(tri)) else {
            continue;
        };
        if !corners.iter().any(|i| affected.contains(i)) {
            continue;
        }
        let normal = calculate_face_normal(a, b, c);
        if normal == Vec3::ZERO {
            continue;
        }
        for corner in corners {
            if let Ok(slot) = sums.binary_search_by_key(&corner, |(i, _)| *i) {
                sums[slot].1 += normal;
            }
        }
    }

    let mut updated = 0;
    for (i, sum) in sums {
        if let Some(n) = sum.try_normalize() {
            mesh.vertices[i as usize].normal = n.into();
            updated += 1;
        }
    }
    updated
}

/// Append the two triangles of quad `v0 v1 v2 v3`, split along `v0-v2`.
pub(crate) fn add_quad_triangles(indices: &mut Vec<u32>, quad: [u32; 4], flip_normal: bool) {
    let [v0, v1, v2, v3] = quad;
    if flip_normal {
        indices.extend_from_slice(&[v0, v2, v1, v0, v3, v2]);
    } else {
        indices.extend_from_slice(&[v0, v1, v2, v0, v2, v3]);
    }
}
