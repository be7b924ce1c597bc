use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::spatial::{valid_epsilon, POSITION_EPSILON};

/// All user-configurable settings, persisted to JSON.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub picking: PickingSettings,
    pub gizmo: GizmoSettings,
    pub edit: EditSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PickingSettings {
    /// Pixel radius around the cursor for vertex picks.
    pub vertex_pick_threshold: f32,
    /// Pixel distance from a projected edge for edge picks.
    pub edge_pick_threshold: f32,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            vertex_pick_threshold: 12.0,
            edge_pick_threshold: 8.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GizmoSettings {
    pub hit_threshold: f32,
    /// Axis length as a fraction of the camera distance, so the triad keeps
    /// a constant size on screen.
    pub screen_scale: f32,
    /// World units per pixel.
    pub translate_sensitivity: f32,
    /// Scale factor change per pixel.
    pub scale_sensitivity: f32,
    /// Degrees per pixel.
    pub rotate_sensitivity: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            hit_threshold: 12.0,
            screen_scale: 0.15,
            translate_sensitivity: 0.01,
            scale_sensitivity: 0.01,
            rotate_sensitivity: 0.5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EditSettings {
    pub position_epsilon: f32,
    /// Offset applied by the extrude command; 0 leaves the new cap in place
    /// for the gizmo to drag.
    pub extrude_distance: f32,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            position_epsilon: POSITION_EPSILON,
            extrude_distance: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub undo_levels: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { undo_levels: 20 }
    }
}

impl Settings {
    /// Load settings from the config file. Falls back to defaults on error.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}, using default settings");
            Self::default()
        })
    }

    /// Save settings to the config file.
    pub fn save(&self) {
        if let Err(e) = self.save_to(&config_path()) {
            log::error!("{e}");
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let settings: Self =
            serde_json::from_str(&data).map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
        Ok(settings.validated())
    }

    /// Replace values the editor cannot work with by their defaults.
    pub fn validated(mut self) -> Self {
        let eps = valid_epsilon(self.edit.position_epsilon);
        if eps != self.edit.position_epsilon {
            log::warn!(
                "position_epsilon {} is not a positive number, using {eps}",
                self.edit.position_epsilon
            );
            self.edit.position_epsilon = eps;
        }
        self
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize settings: {e}"))?;
        std::fs::write(path, data).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/ese-mesh/settings.json")
}
