//! Interactive mesh-editing kernel: picking and selection over a triangle
//! mesh, a transform gizmo, topological edits and snapshot undo.
//!
//! The host owns windowing and GPU buffers. It feeds pointer input and camera
//! matrices into an [`Editor`] and re-uploads `Mesh::vertex_bytes` /
//! `Mesh::index_bytes` whenever [`Editor::take_rebuild_request`] fires.

pub mod camera;
pub mod editor;
pub mod history;
pub mod ops;
pub mod scene;
pub mod settings;
pub mod tools;
pub mod util;

pub use camera::OrbitCamera;
pub use editor::{ClickOutcome, Editor};
pub use history::{MeshState, UndoManager};
pub use scene::{Mesh, Quad, QuadEdge, QuadTopology, Vertex};
pub use settings::Settings;
pub use tools::edit::{Gizmo, GizmoAxis, GizmoMode, SelectionMode, SelectionState};
pub use util::picking::{CameraView, Ray};
