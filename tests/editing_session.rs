use ese_mesh::scene::primitives;
use ese_mesh::{CameraView, ClickOutcome, Editor, GizmoAxis, GizmoMode, OrbitCamera, SelectionMode, Settings};
use glam::{Vec2, Vec3};

fn camera(target: Vec3) -> CameraView {
    let mut cam = OrbitCamera::new(target, 5.0);
    cam.yaw = 30.0_f32.to_radians();
    cam.pitch = 20.0_f32.to_radians();
    cam.camera_view(Vec2::new(800.0, 600.0))
}

fn grab_axis(editor: &mut Editor, view: &CameraView, axis: GizmoAxis) -> (Vec2, Vec2) {
    let origin = editor.gizmo().position();
    let press = view.project(origin.lerp(editor.gizmo().axis_endpoint(axis, view), 0.6)).position;
    assert_eq!(editor.click(press, view, false), ClickOutcome::GizmoDrag);
    let dir = editor.gizmo().drag().map(|d| d.screen_dir).unwrap_or_default();
    (press, dir)
}

#[test]
fn extrude_cut_and_walk_history() {
    let view = camera(Vec3::ZERO);
    let mut editor = Editor::new(primitives::cube(0.5), Settings::default());
    editor.set_selection_mode(SelectionMode::Quad);
    let front = view.project(Vec3::new(0.1, 0.2, 0.5)).position;
    assert_eq!(editor.click(front, &view, false), ClickOutcome::Selected);

    assert!(editor.arm_extrude());
    let (press, dir) = grab_axis(&mut editor, &view, GizmoAxis::Z);
    for step in 1..=4 {
        editor.pointer_moved(press + dir * (step as f32 * 10.0));
    }
    assert!(editor.release());
    assert_eq!(editor.mesh().vertices.len(), 28);
    assert_eq!(editor.topology().quads.len(), 10);
    assert!(editor.topology().loose_triangles.is_empty());
    assert!(editor.mesh().is_valid());

    // Vertex bytes follow the 32-byte layout the renderer uploads.
    assert_eq!(editor.mesh().vertex_bytes().len(), 28 * 32);
    assert!(editor.take_rebuild_request());

    editor.set_selection_mode(SelectionMode::Edge);
    let edge_count = editor.topology().edges.len();
    assert!(edge_count > 0);
    let last = editor.topology().edges[edge_count - 1].clone();
    let a = editor.mesh().position(last.v0).unwrap_or_default();
    let b = editor.mesh().position(last.v1).unwrap_or_default();
    let mid = view.project(a.lerp(b, 0.5)).position;
    assert_eq!(editor.click(mid, &view, false), ClickOutcome::Selected);
    let created = editor.insert_edge_loop();
    assert!(created > 0);
    assert_eq!(editor.history().undo_count(), 2);

    let after_loop = editor.mesh().clone();
    assert!(editor.undo());
    assert_eq!(editor.mesh().vertices.len(), 28);
    assert!(editor.redo());
    assert_eq!(editor.mesh(), &after_loop);

    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.mesh(), &primitives::cube(0.5));
    assert!(!editor.undo());
}

#[test]
fn rotate_drag_turns_quad_about_its_center() {
    let center = Vec3::new(0.5, 0.5, 0.0);
    let view = camera(center);
    let mut editor = Editor::new(primitives::unit_quad(), Settings::default());
    editor.set_selection_mode(SelectionMode::Quad);
    let inside = view.project(Vec3::new(0.3, 0.6, 0.0)).position;
    assert_eq!(editor.click(inside, &view, false), ClickOutcome::Selected);
    editor.set_gizmo_mode(GizmoMode::Rotate);

    let before = editor.mesh().vertices[0].pos() - center;
    let (press, dir) = grab_axis(&mut editor, &view, GizmoAxis::Z);
    assert!(editor.pointer_moved(press + dir * 20.0));
    assert!(editor.release());

    let after = editor.mesh().vertices[0].pos() - center;
    assert!((after.length() - before.length()).abs() < 1e-4);
    assert!(after.z.abs() < 1e-5);
    let degrees = before.normalize().dot(after.normalize()).clamp(-1.0, 1.0).acos().to_degrees();
    assert!((degrees - 10.0).abs() < 0.05, "rotated {degrees} degrees");
}

#[test]
fn undo_depth_comes_from_settings() {
    let mut settings = Settings::default();
    settings.history.undo_levels = 2;
    settings.edit.extrude_distance = 0.1;
    let mut editor = Editor::new(primitives::unit_quad(), settings);
    editor.set_selection_mode(SelectionMode::Quad);
    let view = camera(Vec3::new(0.5, 0.5, 0.0));
    let inside = view.project(Vec3::new(0.3, 0.6, 0.0)).position;
    assert_eq!(editor.click(inside, &view, false), ClickOutcome::Selected);

    for _ in 0..3 {
        assert_eq!(editor.extrude().len(), 4);
    }
    assert_eq!(editor.mesh().vertices.len(), 16);
    assert_eq!(editor.history().undo_count(), 2);

    while editor.undo() {}
    assert_eq!(editor.mesh().vertices.len(), 8);
    assert_eq!(editor.history().redo_count(), 2);
}

#[test]
fn settings_file_configures_editor() {
    let dir = std::env::temp_dir().join(format!("ese-mesh-session-{}", std::process::id()));
    let path = dir.join("settings.json");
    std::fs::create_dir_all(&dir).expect("temp dir");
    std::fs::write(&path, r#"{ "gizmo": { "translate_sensitivity": 0.05 } }"#).expect("write");

    let settings = Settings::load_from(&path).expect("parse");
    let editor = Editor::new(primitives::unit_quad(), settings);
    assert_eq!(editor.gizmo().sensitivity(), 0.05);
    assert_eq!(editor.settings().history.undo_levels, 20);
    let _ = std::fs::remove_dir_all(&dir);
}

fn extrude_three_times(undo_levels: usize) -> (Editor, Vec<ese_mesh::Mesh>) {
    let mut settings = Settings::default();
    settings.history.undo_levels = undo_levels;
    settings.edit.extrude_distance = 0.25;
    let mut editor = Editor::new(primitives::unit_quad(), settings);
    editor.set_selection_mode(SelectionMode::Quad);
    let view = camera(Vec3::new(0.5, 0.5, 0.0));
    let inside = view.project(Vec3::new(0.3, 0.6, 0.0)).position;
    assert_eq!(editor.click(inside, &view, false), ClickOutcome::Selected);

    let mut states = vec![editor.mesh().clone()];
    for _ in 0..3 {
        assert_eq!(editor.extrude().len(), 4);
        states.push(editor.mesh().clone());
    }
    (editor, states)
}

fn walk_back_and_forth(editor: &mut Editor, states: &[ese_mesh::Mesh]) {
    let n = states.len() - 1;
    for expected in states[..n].iter().rev() {
        assert!(editor.undo());
        assert_eq!(editor.mesh(), expected);
    }
    assert!(!editor.undo());
    for expected in &states[1..] {
        assert!(editor.redo());
        assert_eq!(editor.mesh(), expected);
    }
    assert!(!editor.redo());
}

#[test]
fn repeated_undo_and_redo_replay_each_edit() {
    let (mut editor, states) = extrude_three_times(20);
    walk_back_and_forth(&mut editor, &states);
    assert_eq!(editor.history().undo_count(), 3);
}

#[test]
fn history_exactly_as_deep_as_the_edits_round_trips() {
    let (mut editor, states) = extrude_three_times(3);
    assert_eq!(editor.history().undo_count(), 3);
    walk_back_and_forth(&mut editor, &states);
    assert_eq!(editor.mesh(), &states[3]);
}
