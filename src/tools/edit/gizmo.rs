use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::settings::GizmoSettings;
use crate::util::picking::{point_to_segment_dist, CameraView};

/// Which transform gizmo is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoMode {
    #[default]
    Translate,
    Scale,
    Rotate,
}

/// Which gizmo axis the user is interacting with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GizmoAxis {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// Returns the world-space direction for this axis.
    pub fn direction(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
            GizmoAxis::None => Vec3::ZERO,
        }
    }

    /// Component index (0..3) of the axis.
    pub fn index(self) -> Option<usize> {
        match self {
            GizmoAxis::X => Some(0),
            GizmoAxis::Y => Some(1),
            GizmoAxis::Z => Some(2),
            GizmoAxis::None => None,
        }
    }

    /// Screen direction used when the axis points straight at the camera.
    fn fallback_screen_dir(self) -> Vec2 {
        match self {
            GizmoAxis::Y => Vec2::NEG_Y,
            _ => Vec2::X,
        }
    }
}

/// State of an active gizmo drag.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoDrag {
    pub axis: GizmoAxis,
    /// Cursor position where the drag started.
    pub start: Vec2,
    /// Cursor position at the previous update.
    pub last: Vec2,
    /// Unit screen direction of the dragged world axis.
    pub screen_dir: Vec2,
    /// Sum of every delta handed out so far.
    pub accumulated: f32,
}

/// Transform gizmo: a 3-axis triad placed at the selection center.
///
/// Idle until `begin_drag` succeeds, then dragging until `end_drag`. A drag
/// only produces scalar deltas; applying them to geometry is up to the caller.
#[derive(Debug, Clone)]
pub struct Gizmo {
    mode: GizmoMode,
    position: Vec3,
    settings: GizmoSettings,
    drag: Option<GizmoDrag>,
}

impl Gizmo {
    pub fn new(settings: GizmoSettings) -> Self {
        Self {
            mode: GizmoMode::Translate,
            position: Vec3::ZERO,
            settings,
            drag: None,
        }
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&GizmoDrag> {
        self.drag.as_ref()
    }

    pub fn drag_axis(&self) -> GizmoAxis {
        self.drag.as_ref().map_or(GizmoAxis::None, |d| d.axis)
    }

    /// World length of each axis arm, scaled so it looks constant on screen.
    pub fn axis_length(&self, camera: &CameraView) -> f32 {
        (camera.eye().distance(self.position) * self.settings.screen_scale).max(1e-3)
    }

    /// World position of the tip of `axis`' arm.
    pub fn axis_endpoint(&self, axis: GizmoAxis, camera: &CameraView) -> Vec3 {
        self.position + axis.direction() * self.axis_length(camera)
    }

    /// Delta per pixel of cursor travel for the current mode.
    pub fn sensitivity(&self) -> f32 {
        match self.mode {
            GizmoMode::Translate => self.settings.translate_sensitivity,
            GizmoMode::Scale => self.settings.scale_sensitivity,
            GizmoMode::Rotate => self.settings.rotate_sensitivity,
        }
    }

    /// Hit-test the triad in screen space. Returns the axis whose projected
    /// arm is nearest the cursor within the hit threshold.
    pub fn hit_test(&self, mouse: Vec2, camera: &CameraView) -> GizmoAxis {
        let Some(center_2d) = camera.project(self.position).visible() else {
            return GizmoAxis::None;
        };
        let mut best = GizmoAxis::None;
        let mut best_dist = self.settings.hit_threshold;
        for axis in GizmoAxis::ALL {
            if let Some(tip_2d) = camera.project(self.axis_endpoint(axis, camera)).visible() {
                let d = point_to_segment_dist(mouse, center_2d, tip_2d);
                if d < best_dist {
                    best_dist = d;
                    best = axis;
                }
            }
        }
        best
    }

    /// Start dragging `axis` from cursor position `mouse`.
    ///
    /// A drag left over from an abandoned input stream is replaced.
    pub fn begin_drag(&mut self, axis: GizmoAxis, mouse: Vec2, camera: &CameraView) -> bool {
        if axis == GizmoAxis::None {
            return false;
        }
        if let Some(stale) = self.drag.take() {
            log::warn!("replacing unfinished gizmo drag on {:?}", stale.axis);
        }

        let center = camera.project(self.position).visible();
        let tip = camera.project(self.axis_endpoint(axis, camera)).visible();
        let screen_dir = match (center, tip) {
            (Some(c), Some(t)) => (t - c).try_normalize().filter(|_| c.distance(t) > 1.0),
            _ => None,
        }
        .unwrap_or_else(|| axis.fallback_screen_dir());

        self.drag = Some(GizmoDrag {
            axis,
            start: mouse,
            last: mouse,
            screen_dir,
            accumulated: 0.0,
        });
        true
    }

    /// Scalar delta since the previous update: cursor travel along the
    /// axis' screen direction times the mode sensitivity. 0 when idle.
    pub fn continue_drag(&mut self, mouse: Vec2) -> f32 {
        let sensitivity = self.sensitivity();
        let Some(drag) = self.drag.as_mut() else {
            return 0.0;
        };
        let delta = (mouse - drag.last).dot(drag.screen_dir) * sensitivity;
        drag.last = mouse;
        drag.accumulated += delta;
        delta
    }

    /// Return to idle, handing back the finished drag if there was one.
    pub fn end_drag(&mut self) -> Option<GizmoDrag> {
        self.drag.take()
    }

    /// Begin a drag whose lifetime is tied to the returned guard; dropping
    /// the guard always ends the drag.
    pub fn scoped_drag(&mut self, axis: GizmoAxis, mouse: Vec2, camera: &CameraView) -> Option<DragScope<'_>> {
        if self.begin_drag(axis, mouse, camera) {
            Some(DragScope { gizmo: self })
        } else {
            None
        }
    }
}

/// Guard for a gizmo drag started with `Gizmo::scoped_drag`.
pub struct DragScope<'a> {
    gizmo: &'a mut Gizmo,
}

impl DragScope<'_> {
    pub fn update(&mut self, mouse: Vec2) -> f32 {
        self.gizmo.continue_drag(mouse)
    }

    pub fn axis(&self) -> GizmoAxis {
        self.gizmo.drag_axis()
    }

    pub fn finish(self) -> Option<GizmoDrag> {
        self.gizmo.end_drag()
    }
}

impl Drop for DragScope<'_> {
    fn drop(&mut self) {
        self.gizmo.end_drag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn front_camera() -> CameraView {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(45.0_f32.to_radians(), 800.0 / 600.0, 0.1, 100.0);
        CameraView::new(view, proj, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn hit_test_picks_nearest_arm() {
        let gizmo = Gizmo::new(GizmoSettings::default());
        let cam = front_camera();
        assert_eq!(gizmo.hit_test(Vec2::new(460.0, 302.0), &cam), GizmoAxis::X);
        assert_eq!(gizmo.hit_test(Vec2::new(401.0, 250.0), &cam), GizmoAxis::Y);
        assert_eq!(gizmo.hit_test(Vec2::new(700.0, 100.0), &cam), GizmoAxis::None);
    }

    #[test]
    fn hit_test_ignores_gizmo_behind_camera() {
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        gizmo.set_position(Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(gizmo.hit_test(Vec2::new(400.0, 300.0), &front_camera()), GizmoAxis::None);
    }

    #[test]
    fn drag_deltas_follow_screen_axis() {
        let cam = front_camera();
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        assert!(gizmo.begin_drag(GizmoAxis::X, Vec2::new(460.0, 300.0), &cam));
        assert!(gizmo.is_dragging());

        let d = gizmo.continue_drag(Vec2::new(480.0, 300.0));
        assert!((d - 0.2).abs() < 1e-4);
        // Vertical motion does not move an X drag.
        assert!(gizmo.continue_drag(Vec2::new(480.0, 250.0)).abs() < 1e-4);
        let finished = gizmo.end_drag().expect("drag in progress");
        assert!((finished.accumulated - 0.2).abs() < 1e-4);
        assert!(!gizmo.is_dragging());
        assert_eq!(gizmo.continue_drag(Vec2::new(900.0, 0.0)), 0.0);
    }

    #[test]
    fn upward_motion_grows_y_and_rotation_uses_degrees() {
        let cam = front_camera();
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        gizmo.set_mode(GizmoMode::Rotate);
        gizmo.begin_drag(GizmoAxis::Y, Vec2::new(400.0, 250.0), &cam);
        let d = gizmo.continue_drag(Vec2::new(400.0, 240.0));
        assert!((d - 5.0).abs() < 1e-3);
    }

    #[test]
    fn axis_facing_camera_uses_fallback_direction() {
        let cam = front_camera();
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        gizmo.begin_drag(GizmoAxis::Z, Vec2::new(400.0, 300.0), &cam);
        assert_eq!(gizmo.drag().map(|d| d.screen_dir), Some(Vec2::X));
    }

    #[test]
    fn scoped_drag_always_releases() {
        let cam = front_camera();
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        {
            let mut scope = gizmo
                .scoped_drag(GizmoAxis::X, Vec2::new(460.0, 300.0), &cam)
                .expect("drag starts");
            scope.update(Vec2::new(470.0, 300.0));
            assert_eq!(scope.axis(), GizmoAxis::X);
        }
        assert!(!gizmo.is_dragging());
        assert!(gizmo.scoped_drag(GizmoAxis::None, Vec2::ZERO, &cam).is_none());
    }

    #[test]
    fn stale_drag_is_replaced() {
        let cam = front_camera();
        let mut gizmo = Gizmo::new(GizmoSettings::default());
        gizmo.begin_drag(GizmoAxis::X, Vec2::new(460.0, 300.0), &cam);
        gizmo.continue_drag(Vec2::new(500.0, 300.0));
        gizmo.begin_drag(GizmoAxis::Y, Vec2::new(401.0, 250.0), &cam);
        let drag = gizmo.drag().expect("dragging");
        assert_eq!(drag.axis, GizmoAxis::Y);
        assert_eq!(drag.accumulated, 0.0);
    }
}
