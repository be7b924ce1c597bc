use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::util::picking::CameraView;

/// Orbit camera circling a target point.
///
/// Only supplies the matrices picking needs; input handling lives with the
/// host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: -45.0_f32.to_radians(),
            pitch: 30.0_f32.to_radians(),
            distance: 10.0,
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance: distance.max(0.5),
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    /// Matrices for a viewport of `viewport` pixels.
    pub fn camera_view(&self, viewport: Vec2) -> CameraView {
        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        CameraView::new(self.view_matrix(), self.projection_matrix(aspect), viewport)
    }

    /// Orbit around the target by yaw/pitch deltas (in radians).
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).max(0.5);
    }

    /// Pan the target in the camera's local XY plane.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let cam_up = right.cross(forward).normalize_or_zero();
        self.target += right * delta_x + cam_up * delta_y;
    }

    /// Aim at `center` from far enough away that a sphere of `radius` fits
    /// the vertical field of view.
    pub fn frame_model(&mut self, center: Vec3, radius: f32) {
        self.target = center;
        let half_fov = (self.fov_y * 0.5).sin().max(1e-3);
        self.distance = (radius.max(0.0) / half_fov * 1.1).max(0.5);
    }

    /// Back to the default orientation and distance, keeping lens settings.
    pub fn reset(&mut self) {
        let default = Self::default();
        self.target = default.target;
        self.yaw = default.yaw;
        self.pitch = default.pitch;
        self.distance = default.distance;
    }

    /// Front view: looking along -Z
    pub fn set_view_front(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    pub fn center_on(&mut self, target: Vec3) {
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_view_sits_on_positive_z() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 0.0, 0.0), 4.0);
        cam.set_view_front();
        assert!(cam.position().distance(Vec3::new(1.0, 0.0, 4.0)) < 1e-5);
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.3, -0.2);
        cam.center_on(Vec3::new(2.0, 1.0, -3.0));
        let view = cam.camera_view(Vec2::new(640.0, 480.0));
        let p = view.project(cam.target);
        assert!(p.in_front);
        assert!(p.position.distance(Vec2::new(320.0, 240.0)) < 1e-2);
        assert!(view.eye().distance(cam.position()) < 1e-3);
    }

    #[test]
    fn pitch_and_zoom_are_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10.0);
        assert!(cam.pitch <= 89.0_f32.to_radians());
        cam.zoom(100.0);
        assert_eq!(cam.distance, 0.5);
    }

    #[test]
    fn framed_model_stays_in_view() {
        let mut cam = OrbitCamera::default();
        cam.frame_model(Vec3::new(3.0, -1.0, 2.0), 2.0);
        assert_eq!(cam.target, Vec3::new(3.0, -1.0, 2.0));
        assert!(cam.distance * (cam.fov_y * 0.5).sin() >= 2.0);

        let view = cam.camera_view(Vec2::new(800.0, 600.0));
        let up = (cam.target - cam.position()).cross(Vec3::Y).cross(cam.target - cam.position());
        let top = view.project(cam.target - up.normalize() * 2.0);
        assert!(top.in_front);
        assert!((0.0..=600.0).contains(&top.position.y));
    }

    #[test]
    fn pan_moves_target_across_the_view() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 5.0);
        cam.set_view_front();
        cam.pan(1.0, 2.0);
        assert!(cam.target.distance(Vec3::new(1.0, 2.0, 0.0)) < 1e-5);
        assert_eq!(cam.distance, 5.0);

        cam.fov_y = 1.0;
        cam.reset();
        assert_eq!(cam.target, Vec3::ZERO);
        assert_eq!(cam.distance, OrbitCamera::default().distance);
        assert_eq!(cam.fov_y, 1.0);
    }

    #[test]
    fn camera_state_persists_as_json() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 7.0);
        cam.orbit(0.25, 0.1);
        let json = serde_json::to_string(&cam).expect("serialize");
        let back: OrbitCamera = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cam);

        let partial: OrbitCamera = serde_json::from_str(r#"{ "distance": 3.0 }"#).expect("partial");
        assert_eq!(partial.distance, 3.0);
        assert_eq!(partial.fov_y, OrbitCamera::default().fov_y);
    }
}
