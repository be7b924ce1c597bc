use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use crate::scene::{Mesh, Quad};
use crate::util::spatial::{EdgeKey, PositionKey};

use super::{add_quad_triangles, calculate_face_normal};

/// Extrude the selected quads as one region.
///
/// Each distinct corner position of the region gets one new vertex, offset
/// by `distance` along the averaged normal of the selected quads touching
/// it. The quads' own triangles are re-pointed at the new vertices (the cap
/// moves out) and a wall quad is stitched along every rim edge, that is every
/// edge not shared by two selected quads. Returns the new vertex indices so
/// the caller can keep dragging them; empty when nothing valid is selected.
pub fn extrude_quads(
    mesh: &mut Mesh,
    selected: &BTreeSet<usize>,
    quads: &[Quad],
    distance: f32,
    epsilon: f32,
) -> Vec<u32> {
    let region: Vec<(Quad, [Vec3; 4], Vec3)> = selected
        .iter()
        .filter_map(|&qi| {
            let quad = *quads.get(qi)?;
            let positions = quad.positions(&mesh.vertices)?;
            if quad.triangles.iter().any(|&t| mesh.triangle(t).is_none()) {
                return None;
            }
            let normal = calculate_face_normal(positions[0], positions[1], positions[2]);
            (normal != Vec3::ZERO).then_some((quad, positions, normal))
        })
        .collect();
    if region.is_empty() {
        return Vec::new();
    }

    let mut edge_use: HashMap<EdgeKey, usize> = HashMap::new();
    let mut corner_normals: HashMap<PositionKey, Vec3> = HashMap::new();
    for (_, positions, normal) in &region {
        for side in 0..4 {
            *edge_use
                .entry(EdgeKey::new(positions[side], positions[(side + 1) % 4], epsilon))
                .or_default() += 1;
            *corner_normals
                .entry(PositionKey::new(positions[side], epsilon))
                .or_default() += *normal;
        }
    }

    // One new vertex per distinct corner, created in selection order.
    let mut new_of: HashMap<PositionKey, u32> = HashMap::new();
    let mut created = Vec::new();
    for (quad, positions, _) in &region {
        for corner in 0..4 {
            let key = PositionKey::new(positions[corner], epsilon);
            if new_of.contains_key(&key) {
                continue;
            }
            let normal = corner_normals[&key].normalize_or_zero();
            let mut vertex = mesh.vertices[quad.verts[corner] as usize];
            vertex.set_pos(positions[corner] + normal * distance);
            vertex.normal = normal.into();
            let index = mesh.vertices.len() as u32;
            mesh.vertices.push(vertex);
            new_of.insert(key, index);
            created.push(index);
        }
    }

    for (quad, _, _) in &region {
        for &tri in &quad.triangles {
            for corner in 0..3 {
                let slot = tri * 3 + corner;
                let pos = mesh.vertices[mesh.indices[slot] as usize].pos();
                if let Some(&new) = new_of.get(&PositionKey::new(pos, epsilon)) {
                    mesh.indices[slot] = new;
                }
            }
        }
    }

    let mut walls = 0;
    for (quad, positions, _) in &region {
        for side in 0..4 {
            let next = (side + 1) % 4;
            if edge_use[&EdgeKey::new(positions[side], positions[next], epsilon)] > 1 {
                continue;
            }
            let a = quad.verts[side];
            let b = quad.verts[next];
            let a_new = new_of[&PositionKey::new(positions[side], epsilon)];
            let b_new = new_of[&PositionKey::new(positions[next], epsilon)];
            add_quad_triangles(&mut mesh.indices, [a, b, b_new, a_new], false);
            walls += 1;
        }
    }

    log::debug!(
        "extruded {} quad(s): {} new vertices, {} wall quads",
        region.len(),
        created.len(),
        walls
    );
    created
}

/// Extrude a single triangle: three new vertices offset along its normal,
/// the triangle re-pointed at them, and three wall quads around the rim.
pub fn extrude_face(mesh: &mut Mesh, face: usize, distance: f32) -> Vec<u32> {
    let (Some(corners), Some(positions)) = (mesh.triangle(face), mesh.triangle_positions(face)) else {
        return Vec::new();
    };
    let normal = calculate_face_normal(positions[0], positions[1], positions[2]);
    if normal == Vec3::ZERO {
        return Vec::new();
    }

    let mut created = [0u32; 3];
    for (slot, (&old, pos)) in created.iter_mut().zip(corners.iter().zip(positions)) {
        let mut vertex = mesh.vertices[old as usize];
        vertex.set_pos(pos + normal * distance);
        vertex.normal = normal.into();
        *slot = mesh.vertices.len() as u32;
        mesh.vertices.push(vertex);
    }
    mesh.indices[face * 3..face * 3 + 3].copy_from_slice(&created);

    for side in 0..3 {
        let next = (side + 1) % 3;
        add_quad_triangles(
            &mut mesh.indices,
            [corners[side], corners[next], created[next], created[side]],
            false,
        );
    }

    log::debug!("extruded face {face}: 3 new vertices");
    created.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reconstruct_quads;
    use crate::scene::primitives;
    use crate::util::spatial::POSITION_EPSILON;

    #[test]
    fn single_quad_gains_cap_and_four_walls() {
        let mut mesh = primitives::unit_quad();
        let quads = reconstruct_quads(&mesh, POSITION_EPSILON).quads;
        let (verts_before, tris_before) = (mesh.vertices.len(), mesh.triangle_count());

        let created = extrude_quads(&mut mesh, &BTreeSet::from([0]), &quads, 1.0, POSITION_EPSILON);

        assert_eq!(created, vec![4, 5, 6, 7]);
        assert_eq!(mesh.vertices.len(), verts_before + 4);
        assert_eq!(mesh.triangle_count(), tris_before + 8);
        assert!(mesh.is_valid());
        for &v in &created {
            assert!((mesh.vertices[v as usize].pos().z - 1.0).abs() < 1e-6);
        }
        // Cap triangles now reference only the new vertices.
        assert!(mesh.indices[..6].iter().all(|i| created.contains(i)));

        let rebuilt = reconstruct_quads(&mesh, POSITION_EPSILON);
        assert_eq!(rebuilt.quads.len(), 5);
        assert!(rebuilt.loose_triangles.is_empty());
    }

    #[test]
    fn walls_face_outward() {
        let mut mesh = primitives::unit_quad();
        let quads = reconstruct_quads(&mesh, POSITION_EPSILON).quads;
        extrude_quads(&mut mesh, &BTreeSet::from([0]), &quads, 1.0, POSITION_EPSILON);
        let center = Vec3::new(0.5, 0.5, 0.5);
        for tri in 2..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(tri).unwrap_or_default();
            let n = calculate_face_normal(a, b, c);
            assert!(n.dot((a + b + c) / 3.0 - center) > 0.0, "wall triangle {tri} faces inward");
        }
    }

    #[test]
    fn adjacent_quads_extrude_as_region() {
        let mut mesh = primitives::quad_grid(2, 1, 1.0);
        let quads = reconstruct_quads(&mesh, POSITION_EPSILON).quads;
        let created = extrude_quads(&mut mesh, &BTreeSet::from([0, 1]), &quads, 0.5, POSITION_EPSILON);
        // Six distinct corners, six rim edges.
        assert_eq!(created.len(), 6);
        assert_eq!(mesh.triangle_count(), 4 + 12);
    }

    #[test]
    fn invalid_selection_leaves_mesh_untouched() {
        let mut mesh = primitives::unit_quad();
        let quads = reconstruct_quads(&mesh, POSITION_EPSILON).quads;
        let before = mesh.clone();
        assert!(extrude_quads(&mut mesh, &BTreeSet::from([3]), &quads, 1.0, POSITION_EPSILON).is_empty());
        assert!(extrude_face(&mut mesh, 7, 1.0).is_empty());
        assert_eq!(mesh, before);
    }

    #[test]
    fn triangle_extrusion_adds_three_walls() {
        let mut mesh = primitives::unit_quad();
        let created = extrude_face(&mut mesh, 0, 0.25);
        assert_eq!(created.len(), 3);
        assert_eq!(mesh.vertices.len(), 7);
        assert_eq!(mesh.triangle_count(), 2 + 6);
        assert!(mesh.is_valid());
    }
}
