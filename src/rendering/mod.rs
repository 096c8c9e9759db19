//! Rendering module - visual descriptions and the plugin that draws them.

mod plugin;
pub mod visual_config;
mod visuals;

pub use plugin::{arc_points, RenderingPlugin, VisualMeshes};
pub use visual_config::VisualConfig;
pub use visuals::{RingVisual, SectorVisual, VisualShape, VisualSpec};
