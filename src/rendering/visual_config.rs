//! Visual configuration loaded from an external RON file.
//!
//! Allows tweaking overlay colors without recompilation.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Visual configuration loaded from `<data>/rendering.ron`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    pub clear_color: (f32, f32, f32),
    // Overlays
    pub beam_color: (f32, f32, f32, f32),
    /// Segments used to draw arcs and rings.
    pub arc_resolution: u32,
    // Feedback
    pub hit_flash_color: (f32, f32, f32),
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            clear_color: (0.08, 0.07, 0.09),
            beam_color: (0.5, 0.9, 1.0, 0.9),
            arc_resolution: 24,
            hit_flash_color: (1.0, 1.0, 1.0),
        }
    }
}

impl VisualConfig {
    /// Load visual config from RON, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded visual config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn clear_color(&self) -> Color {
        let (r, g, b) = self.clear_color;
        Color::srgb(r, g, b)
    }

    pub fn beam_color(&self) -> Color {
        let (r, g, b, a) = self.beam_color;
        Color::srgba(r, g, b, a)
    }

    pub fn hit_flash_color(&self) -> Color {
        let (r, g, b) = self.hit_flash_color;
        Color::srgb(r, g, b)
    }
}
