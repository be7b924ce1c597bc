use std::collections::{HashMap, HashSet};

use crate::scene::{Mesh, Quad, QuadEdge, QuadSide};

/// Cut a loop across the quad strip that `edge_index` belongs to.
///
/// Starting from the quads bordering the edge, the walk steps through the
/// opposite side of each quad into its neighbour until it reaches a boundary
/// or comes back around. Every crossed edge gets a midpoint vertex and each
/// visited quad is re-triangulated into two quads joined by the new loop.
/// Returns the number of vertices created; 0 when the edge is not a quad
/// perimeter edge.
pub fn insert_edge_loop(mesh: &mut Mesh, edge_index: usize, edges: &[QuadEdge], quads: &[Quad]) -> usize {
    let Some(start) = edges.get(edge_index) else {
        return 0;
    };

    let mut side_to_edge: HashMap<(usize, usize), usize> = HashMap::new();
    for (ei, edge) in edges.iter().enumerate() {
        for border in &edge.borders {
            side_to_edge.insert((border.quad, border.side), ei);
        }
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut cuts: Vec<(Quad, usize)> = Vec::new();
    for &entry in &start.borders {
        let mut current = Some(entry);
        while let Some(QuadSide { quad, side }) = current {
            if !visited.insert(quad) {
                break;
            }
            let Some(q) = quads.get(quad).copied().filter(|q| is_editable(mesh, q)) else {
                break;
            };
            cuts.push((q, side));
            let opposite = (side + 2) % 4;
            current = side_to_edge
                .get(&(quad, opposite))
                .and_then(|&ei| edges[ei].other_side(quad));
        }
    }
    if cuts.is_empty() {
        return 0;
    }

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    for (quad, side) in &cuts {
        let [a, b, c, d] = std::array::from_fn(|i| quad.verts[(side + i) % 4]);
        let m1 = midpoint(mesh, &mut midpoints, a, b);
        let m2 = midpoint(mesh, &mut midpoints, c, d);

        let [t0, t1] = quad.triangles;
        mesh.indices[t0 * 3..t0 * 3 + 3].copy_from_slice(&[a, m1, m2]);
        mesh.indices[t1 * 3..t1 * 3 + 3].copy_from_slice(&[a, m2, d]);
        super::add_quad_triangles(&mut mesh.indices, [m1, b, c, m2], false);
    }

    log::debug!(
        "edge loop across {} quad(s): {} new vertices",
        cuts.len(),
        midpoints.len()
    );
    midpoints.len()
}

fn is_editable(mesh: &Mesh, quad: &Quad) -> bool {
    quad.positions(&mesh.vertices).is_some()
        && quad.triangles[0] != quad.triangles[1]
        && quad.triangles.iter().all(|&t| mesh.triangle(t).is_some())
}

/// Midpoint vertex of edge `a-b`, shared by every quad cut across the same
/// index pair.
fn midpoint(mesh: &mut Mesh, cache: &mut HashMap<(u32, u32), u32>, a: u32, b: u32) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        let vertex = mesh.vertices[a as usize].lerp(&mesh.vertices[b as usize], 0.5);
        mesh.vertices.push(vertex);
        (mesh.vertices.len() - 1) as u32
    })
}
