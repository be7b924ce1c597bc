use ese_mesh::scene::primitives;
use ese_mesh::{ClickOutcome, Editor, GizmoAxis, OrbitCamera, SelectionMode, Settings};
use glam::{Vec2, Vec3};

/// Scripted edit session on a cube: extrude the front face with the gizmo,
/// cut a loop across the result, then step back and forth through history.
fn main() {
    env_logger::init();
    log::info!("Starting ESE mesh kernel");

    let settings = Settings::load();
    let mut editor = Editor::new(primitives::cube(0.5), settings);
    let mut camera = OrbitCamera::default();
    if let Some((lo, hi)) = editor.mesh().bounds() {
        camera.frame_model((lo + hi) * 0.5, (hi - lo).length() * 0.5);
    }
    camera.orbit(75.0_f32.to_radians(), -10.0_f32.to_radians());
    let view = camera.camera_view(Vec2::new(1280.0, 720.0));
    report("cube", &editor);

    editor.set_selection_mode(SelectionMode::Quad);
    let front = view.project(Vec3::new(0.1, 0.2, 0.5)).position;
    if editor.click(front, &view, false) != ClickOutcome::Selected {
        log::warn!("front face not under the cursor, stopping");
        return;
    }

    editor.arm_extrude();
    let origin = editor.gizmo().position();
    let grab = view.project(origin.lerp(editor.gizmo().axis_endpoint(GizmoAxis::Z, &view), 0.6));
    if editor.click(grab.position, &view, false) == ClickOutcome::GizmoDrag {
        let dir = editor.gizmo().drag().map_or(Vec2::X, |d| d.screen_dir);
        for step in 1..=10 {
            editor.pointer_moved(grab.position + dir * (step as f32 * 5.0));
        }
        editor.release();
    }
    report("extruded", &editor);

    editor.set_selection_mode(SelectionMode::Edge);
    if let Some(edge) = editor.topology().edges.first() {
        let (a, b) = (editor.mesh().position(edge.v0), editor.mesh().position(edge.v1));
        if let (Some(a), Some(b)) = (a, b) {
            editor.click(view.project(a.lerp(b, 0.5)).position, &view, false);
        }
    }
    let created = editor.insert_edge_loop();
    log::info!("edge loop created {created} vertices");
    report("edge loop", &editor);

    editor.undo();
    report("undo", &editor);
    editor.redo();
    report("redo", &editor);

    if editor.take_rebuild_request() {
        log::info!(
            "upload {} vertex bytes, {} index bytes",
            editor.mesh().vertex_bytes().len(),
            editor.mesh().index_bytes().len()
        );
    }
}

fn report(label: &str, editor: &Editor) {
    let topology = editor.topology();
    log::info!(
        "{label}: {} vertices, {} triangles, {} quads, {} loose triangles, undo {} / redo {}",
        editor.mesh().vertices.len(),
        editor.mesh().triangle_count(),
        topology.quads.len(),
        topology.loose_triangles.len(),
        editor.history().undo_count(),
        editor.history().redo_count()
    );
}
