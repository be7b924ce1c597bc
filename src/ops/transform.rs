use std::collections::BTreeSet;

use glam::{Quat, Vec3};

use crate::scene::Vertex;
use crate::tools::edit::GizmoAxis;

/// Translate every listed vertex by `delta`. Returns how many moved.
pub fn move_vertices(vertices: &mut [Vertex], indices: &BTreeSet<u32>, delta: Vec3) -> usize {
    let mut moved = 0;
    for &i in indices {
        if let Some(v) = vertices.get_mut(i as usize) {
            v.set_pos(v.pos() + delta);
            moved += 1;
        }
    }
    moved
}

/// Scale the distance of every listed vertex from `center` by `factor`.
///
/// With an axis only that coordinate is scaled; `GizmoAxis::None` scales
/// uniformly.
pub fn scale_vertices(
    vertices: &mut [Vertex],
    indices: &BTreeSet<u32>,
    center: Vec3,
    factor: f32,
    axis: GizmoAxis,
) -> usize {
    let scale = match axis.index() {
        Some(i) => {
            let mut s = Vec3::ONE;
            s[i] = factor;
            s
        }
        None => Vec3::splat(factor),
    };
    let mut moved = 0;
    for &i in indices {
        if let Some(v) = vertices.get_mut(i as usize) {
            v.set_pos(center + (v.pos() - center) * scale);
            moved += 1;
        }
    }
    moved
}

/// Rotate every listed vertex by `angle_degrees` around `axis` through
/// `center`. Normals rotate with their vertices. Without an axis nothing moves.
pub fn rotate_vertices(
    vertices: &mut [Vertex],
    indices: &BTreeSet<u32>,
    center: Vec3,
    angle_degrees: f32,
    axis: GizmoAxis,
) -> usize {
    if axis == GizmoAxis::None {
        return 0;
    }
    let quat = Quat::from_axis_angle(axis.direction(), angle_degrees.to_radians());
    let mut moved = 0;
    for &i in indices {
        if let Some(v) = vertices.get_mut(i as usize) {
            v.set_pos(quat * (v.pos() - center) + center);
            v.normal = (quat * v.normal()).into();
            moved += 1;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn move_skips_out_of_range() {
        let mut mesh = primitives::unit_quad();
        let moved = move_vertices(&mut mesh.vertices, &BTreeSet::from([0, 1, 42]), Vec3::Z);
        assert_eq!(moved, 2);
        assert_eq!(mesh.vertices[0].pos(), Vec3::Z);
        assert_eq!(mesh.vertices[2].pos(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn scale_uniform_and_single_axis() {
        let mut mesh = primitives::unit_quad();
        let all = BTreeSet::from([0, 1, 2, 3]);
        let center = Vec3::new(0.5, 0.5, 0.0);

        scale_vertices(&mut mesh.vertices, &all, center, 2.0, GizmoAxis::None);
        assert!(close(mesh.vertices[2].pos(), Vec3::new(1.5, 1.5, 0.0)));

        scale_vertices(&mut mesh.vertices, &all, center, 0.5, GizmoAxis::X);
        assert!(close(mesh.vertices[2].pos(), Vec3::new(1.0, 1.5, 0.0)));
        assert!(close(mesh.vertices[0].pos(), Vec3::new(0.0, -0.5, 0.0)));
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let mut mesh = primitives::unit_quad();
        let moved = rotate_vertices(&mut mesh.vertices, &BTreeSet::from([1]), Vec3::ZERO, 90.0, GizmoAxis::Z);
        assert_eq!(moved, 1);
        assert!(close(mesh.vertices[1].pos(), Vec3::Y));
        assert!(close(mesh.vertices[1].normal(), Vec3::Z));

        assert_eq!(rotate_vertices(&mut mesh.vertices, &BTreeSet::from([1]), Vec3::ZERO, 90.0, GizmoAxis::None), 0);
    }
}
