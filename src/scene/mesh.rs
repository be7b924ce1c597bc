use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Per-vertex data as laid out in the GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            uv: uv.into(),
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    pub fn set_pos(&mut self, pos: Vec3) {
        self.position = pos.into();
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from(self.uv)
    }

    /// Linear blend of two vertices. The normal is renormalized when possible.
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        let normal = self.normal().lerp(other.normal(), t);
        Vertex::new(
            self.pos().lerp(other.pos(), t),
            normal.try_normalize().unwrap_or(normal),
            self.uv().lerp(other.uv(), t),
        )
    }
}

/// Triangle mesh in the form the editor uploads it: a vertex array plus a
/// triangle list (stride 3) indexing into it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Indices of triangle `tri`, or `None` when it is out of range or
    /// references a vertex that does not exist.
    pub fn triangle(&self, tri: usize) -> Option<[u32; 3]> {
        let base = tri.checked_mul(3)?;
        let slice = self.indices.get(base..base + 3)?;
        let corners = [slice[0], slice[1], slice[2]];
        let count = self.vertices.len();
        if corners.iter().all(|&i| (i as usize) < count) {
            Some(corners)
        } else {
            None
        }
    }

    /// Corner positions of triangle `tri`.
    pub fn triangle_positions(&self, tri: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle(tri)?;
        Some([
            self.vertices[a as usize].pos(),
            self.vertices[b as usize].pos(),
            self.vertices[c as usize].pos(),
        ])
    }

    pub fn position(&self, index: u32) -> Option<Vec3> {
        self.vertices.get(index as usize).map(Vertex::pos)
    }

    /// Axis-aligned bounds of every vertex, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.pos();
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            let p = v.pos();
            (lo.min(p), hi.max(p))
        }))
    }

    /// Checks the index invariants: stride 3 and every index in range.
    pub fn is_valid(&self) -> bool {
        let count = self.vertices.len();
        self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| (i as usize) < count)
    }

    /// Raw vertex bytes for re-uploading the GPU vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for re-uploading the GPU index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
