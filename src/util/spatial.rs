use std::collections::HashMap;

use glam::Vec3;

use crate::scene::Vertex;

/// Default tolerance for treating two positions as the same point.
pub const POSITION_EPSILON: f32 = 0.0001;

/// Fixed-precision quantization of a position.
///
/// Each coordinate is divided by the epsilon and rounded to the nearest
/// integer, so two positions with equal keys differ by less than epsilon on
/// every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(pub [i64; 3]);

/// `epsilon` if it is usable as a grid cell size, otherwise the default.
pub fn valid_epsilon(epsilon: f32) -> f32 {
    if epsilon.is_finite() && epsilon > 0.0 { epsilon } else { POSITION_EPSILON }
}

impl PositionKey {
    /// Coordinates too large for the grid saturate to the outermost cell.
    pub fn new(pos: Vec3, epsilon: f32) -> Self {
        let inv = 1.0 / valid_epsilon(epsilon) as f64;
        let q = |c: f32| (c as f64 * inv).round() as i64;
        Self([q(pos.x), q(pos.y), q(pos.z)])
    }

    fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        let [x, y, z] = self.0;
        Self([x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)])
    }
}

/// Unordered pair of position keys, used to match edges between triangles
/// that do not share vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(PositionKey, PositionKey);

impl EdgeKey {
    pub fn new(a: Vec3, b: Vec3, epsilon: f32) -> Self {
        let ka = PositionKey::new(a, epsilon);
        let kb = PositionKey::new(b, epsilon);
        if ka <= kb { Self(ka, kb) } else { Self(kb, ka) }
    }

    pub fn is_degenerate(&self) -> bool {
        self.0 == self.1
    }
}

/// Per-axis epsilon test shared by every coincidence check in the crate.
pub fn same_position(a: Vec3, b: Vec3, epsilon: f32) -> bool {
    (a - b).abs().max_element() < epsilon
}

/// Grid of vertex indices bucketed by `PositionKey`.
pub struct SpatialHash {
    epsilon: f32,
    buckets: HashMap<PositionKey, Vec<u32>>,
}

impl SpatialHash {
    pub fn build(vertices: &[Vertex], epsilon: f32) -> Self {
        let mut buckets: HashMap<PositionKey, Vec<u32>> = HashMap::new();
        for (i, v) in vertices.iter().enumerate() {
            buckets
                .entry(PositionKey::new(v.pos(), epsilon))
                .or_default()
                .push(i as u32);
        }
        Self {
            epsilon: valid_epsilon(epsilon),
            buckets,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// All indices within epsilon of `pos`, ascending.
    ///
    /// Neighbouring cells are scanned too because two points closer than
    /// epsilon can still round to adjacent keys.
    pub fn query(&self, vertices: &[Vertex], pos: Vec3) -> Vec<u32> {
        let center = PositionKey::new(pos, self.epsilon);
        let mut found = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&center.offset(dx, dy, dz)) else {
                        continue;
                    };
                    found.extend(bucket.iter().copied().filter(|&i| {
                        vertices
                            .get(i as usize)
                            .is_some_and(|v| same_position(v.pos(), pos, self.epsilon))
                    }));
                }
            }
        }
        // Saturated keys can make neighbouring offsets land on the same cell.
        found.sort_unstable();
        found.dedup();
        found
    }
}
