use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::scene::{Mesh, Quad, QuadEdge, Vertex};

/// Möller–Trumbore rejection tolerance.
const RAY_EPSILON: f32 = 1e-6;

/// Camera matrices and viewport the editor renders with this frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub view: Mat4,
    pub proj: Mat4,
    /// Viewport width/height in pixels.
    pub viewport: Vec2,
}

impl CameraView {
    pub fn new(view: Mat4, proj: Mat4, viewport: Vec2) -> Self {
        Self { view, proj, viewport }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }

    /// Camera position, recovered from the inverse view matrix.
    pub fn eye(&self) -> Vec3 {
        self.view.inverse().w_axis.xyz()
    }

    pub fn project(&self, pos: Vec3) -> ScreenPoint {
        project_to_screen(pos, self.view_projection(), self.viewport)
    }
}

/// A world point mapped to viewport pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub position: Vec2,
    /// Clip-space w > 0. Points behind the camera are excluded from hit tests.
    pub in_front: bool,
}

impl ScreenPoint {
    pub fn visible(self) -> Option<Vec2> {
        self.in_front.then_some(self.position)
    }
}

/// A ray in 3D space with origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Ray parameter and barycentric coordinates of a triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Nearest element hit by a pick, with the ray distance when ray-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub index: usize,
    pub distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Build a world-space ray through the pixel `screen_pos`.
    ///
    /// The near and far frustum points under the cursor are unprojected; the
    /// direction is far minus near and the origin is the camera position.
    pub fn from_camera(screen_pos: Vec2, camera: &CameraView) -> Self {
        let ndc_x = (2.0 * screen_pos.x / camera.viewport.x) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_pos.y / camera.viewport.y); // Y is flipped

        let inv_vp = camera.view_projection().inverse();
        let near_point = inv_vp.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far_point = inv_vp.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        let eye = camera.eye();

        let direction = (far_point - near_point)
            .try_normalize()
            .or_else(|| (far_point - eye).try_normalize())
            .unwrap_or(Vec3::NEG_Z);

        Self { origin: eye, direction }
    }

    /// Intersect ray with a triangle (Möller–Trumbore algorithm).
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < RAY_EPSILON {
            return None; // Parallel to triangle
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > RAY_EPSILON).then_some(TriangleHit { t, u, v })
    }

    /// Intersect ray with an infinite plane defined by a point and normal.
    pub fn intersect_plane(&self, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
        let denom = plane_normal.dot(self.direction);
        if denom.abs() < RAY_EPSILON {
            return None;
        }
        let t = (plane_point - self.origin).dot(plane_normal) / denom;
        if t >= 0.0 { Some(t) } else { None }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Project a 3D point to 2D screen coordinates (pixels from the top-left).
pub fn project_to_screen(pos: Vec3, view_proj: Mat4, screen_size: Vec2) -> ScreenPoint {
    let clip = view_proj * pos.extend(1.0);
    let in_front = clip.w > 0.0;
    if clip.w.abs() < RAY_EPSILON {
        return ScreenPoint { position: Vec2::splat(-1000.0), in_front };
    }
    let ndc = clip.xyz() / clip.w;
    ScreenPoint {
        position: Vec2::new(
            (ndc.x + 1.0) * 0.5 * screen_size.x,
            (1.0 - ndc.y) * 0.5 * screen_size.y,
        ),
        in_front,
    }
}

/// Distance from a point to a line segment in 2D.
pub fn point_to_segment_dist(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-6 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Nearest vertex whose screen projection lies within `threshold` pixels of
/// the cursor. Ties keep the lowest index.
pub fn pick_vertex(
    vertices: &[Vertex],
    camera: &CameraView,
    mouse: Vec2,
    threshold: f32,
) -> Option<PickHit> {
    let view_proj = camera.view_projection();
    let mut best: Option<PickHit> = None;
    for (i, v) in vertices.iter().enumerate() {
        let Some(sp) = project_to_screen(v.pos(), view_proj, camera.viewport).visible() else {
            continue;
        };
        let d = sp.distance(mouse);
        if d <= threshold && best.is_none_or(|b| d < b.distance) {
            best = Some(PickHit { index: i, distance: d });
        }
    }
    best
}

/// Nearest quad edge whose projected segment lies within `threshold` pixels.
/// Edges with an endpoint behind the camera are skipped.
pub fn pick_edge(
    edges: &[QuadEdge],
    vertices: &[Vertex],
    camera: &CameraView,
    mouse: Vec2,
    threshold: f32,
) -> Option<PickHit> {
    let view_proj = camera.view_projection();
    let mut best: Option<PickHit> = None;
    for (i, edge) in edges.iter().enumerate() {
        let (Some(a), Some(b)) = (vertices.get(edge.v0 as usize), vertices.get(edge.v1 as usize)) else {
            continue;
        };
        let (Some(sa), Some(sb)) = (
            project_to_screen(a.pos(), view_proj, camera.viewport).visible(),
            project_to_screen(b.pos(), view_proj, camera.viewport).visible(),
        ) else {
            continue;
        };
        let d = point_to_segment_dist(mouse, sa, sb);
        if d <= threshold && best.is_none_or(|b| d < b.distance) {
            best = Some(PickHit { index: i, distance: d });
        }
    }
    best
}

/// Nearest triangle hit by the ray.
pub fn pick_face(mesh: &Mesh, ray: &Ray) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for tri in 0..mesh.triangle_count() {
        let Some([a, b, c]) = mesh.triangle_positions(tri) else {
            continue;
        };
        if let Some(hit) = ray.intersect_triangle(a, b, c)
            && best.is_none_or(|b| hit.t < b.distance)
        {
            best = Some(PickHit { index: tri, distance: hit.t });
        }
    }
    best
}

/// Nearest quad hit by the ray; each quad is tested as its two triangles.
pub fn pick_quad(quads: &[Quad], vertices: &[Vertex], ray: &Ray) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for (qi, quad) in quads.iter().enumerate() {
        let Some(p) = quad.positions(vertices) else {
            continue;
        };
        let t1 = ray.intersect_triangle(p[0], p[1], p[2]).map(|h| h.t);
        let t2 = ray.intersect_triangle(p[0], p[2], p[3]).map(|h| h.t);
        let t = match (t1, t2) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => continue,
        };
        if best.is_none_or(|b| t < b.distance) {
            best = Some(PickHit { index: qi, distance: t });
        }
    }
    best
}
