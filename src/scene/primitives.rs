use glam::{Vec2, Vec3};

use crate::scene::{Mesh, Vertex};

const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
];

/// Append one quad face with its own 4 vertices, split along the 0-2 diagonal.
/// Positions must be counter-clockwise seen from `normal`.
pub fn push_face(mesh: &mut Mesh, positions: [Vec3; 4], normal: Vec3) {
    let base = mesh.vertices.len() as u32;
    for (pos, uv) in positions.into_iter().zip(QUAD_UVS) {
        mesh.vertices.push(Vertex::new(pos, normal, uv));
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Unit square on the XY plane facing +Z, corners at (0,0,0) and (1,1,0).
pub fn unit_quad() -> Mesh {
    let mut mesh = Mesh::default();
    push_face(
        &mut mesh,
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        Vec3::Z,
    );
    mesh
}

/// `cols` x `rows` grid of quads on the XY plane facing +Z, starting at the origin.
pub fn quad_grid(cols: usize, rows: usize, size: f32) -> Mesh {
    let mut mesh = Mesh::default();
    for row in 0..rows {
        for col in 0..cols {
            let x0 = col as f32 * size;
            let y0 = row as f32 * size;
            push_face(
                &mut mesh,
                [
                    Vec3::new(x0, y0, 0.0),
                    Vec3::new(x0 + size, y0, 0.0),
                    Vec3::new(x0 + size, y0 + size, 0.0),
                    Vec3::new(x0, y0 + size, 0.0),
                ],
                Vec3::Z,
            );
        }
    }
    mesh
}

/// Axis-aligned cube centered at the origin, one 4-vertex face per side.
pub fn cube(half_size: f32) -> Mesh {
    let mut mesh = Mesh::default();
    for normal in [Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z, Vec3::X, -Vec3::X] {
        let (right, up) = tangent_basis(normal);
        let center = normal * half_size;
        let r = right * half_size;
        let u = up * half_size;
        push_face(
            &mut mesh,
            [center - r - u, center + r - u, center + r + u, center - r + u],
            normal,
        );
    }
    mesh
}

/// Re-emit every triangle with its own three vertices, the way OBJ-style
/// loaders hand meshes over.
pub fn unweld(mesh: &Mesh) -> Mesh {
    let mut out = Mesh::default();
    for tri in 0..mesh.triangle_count() {
        let Some(corners) = mesh.triangle(tri) else {
            continue;
        };
        for i in corners {
            out.indices.push(out.vertices.len() as u32);
            out.vertices.push(mesh.vertices[i as usize]);
        }
    }
    out
}

/// Compute a tangent basis (right, up) for a given normal direction.
fn tangent_basis(normal: Vec3) -> (Vec3, Vec3) {
    let n = normal.normalize();
    let reference = if n.y.abs() > 0.9 { Vec3::Z } else { Vec3::Y };
    let right = reference.cross(n).normalize();
    let up = n.cross(right).normalize();
    (right, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::calculate_face_normal;

    #[test]
    fn cube_faces_wind_outward() {
        let mesh = cube(0.5);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(tri).unwrap_or_default();
            let n = calculate_face_normal(a, b, c);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0, "triangle {tri} faces inward");
        }
    }

    #[test]
    fn unweld_gives_every_corner_its_own_vertex() {
        let mesh = unweld(&quad_grid(2, 1, 1.0));
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices, (0..12).collect::<Vec<u32>>());
    }
}
