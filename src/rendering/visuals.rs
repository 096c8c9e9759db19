//! Visual primitives requested by builders and mechanics.
//!
//! These are plain descriptions. The rendering plugin turns them into sprites,
//! meshes and gizmos; headless apps simply never realize them.

use bevy::prelude::*;

use crate::settings::{normalize, SettingsMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualShape {
    #[default]
    Circle,
    Square,
    /// Image loaded from `VisualSpec::resource`.
    Custom,
}

impl VisualShape {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "square" | "box" | "rect" => VisualShape::Square,
            "custom" | "sprite" | "image" => VisualShape::Custom,
            _ => VisualShape::Circle,
        }
    }
}

/// "Create a visual primitive" for an item entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct VisualSpec {
    pub shape: VisualShape,
    pub color: Color,
    /// Diameter (circle) or edge length (square), world units.
    pub size: f32,
    pub resource: Option<String>,
}

impl VisualSpec {
    pub fn circle(radius: f32, color: Color) -> Self {
        Self {
            shape: VisualShape::Circle,
            color,
            size: radius * 2.0,
            resource: None,
        }
    }

    /// Read `spriteType`, `spriteColor` and `spriteResource` from settings.
    pub fn from_settings(settings: &SettingsMap, radius: f32, default_color: Color) -> Self {
        let s = Some(settings);
        let resource = normalize::string(s, &["spriteResource", "spritePath"], "");
        let mut shape = VisualShape::parse(&normalize::string(s, &["spriteType", "shape"], "circle"));
        if shape == VisualShape::Custom && resource.is_empty() {
            shape = VisualShape::Circle;
        }
        Self {
            shape,
            color: normalize::color(s, &["spriteColor", "color"], default_color),
            size: radius * 2.0,
            resource: (!resource.is_empty()).then_some(resource),
        }
    }
}

/// Annular sector outline or fill (whip window, sword slash).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SectorVisual {
    pub inner: f32,
    pub outer: f32,
    /// Radians, world orientation.
    pub start: f32,
    pub end: f32,
    pub filled: bool,
    pub color: Color,
    pub visible: bool,
}

/// Expanding ring (ripple waves).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RingVisual {
    pub radius: f32,
    pub thickness: f32,
    pub color: Color,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings_map;

    #[test]
    fn custom_without_resource_falls_back_to_circle() {
        let spec = VisualSpec::from_settings(
            &settings_map([("spriteType", "custom".into())]),
            0.5,
            Color::WHITE,
        );
        assert_eq!(spec.shape, VisualShape::Circle);
        assert_eq!(spec.size, 1.0);
    }

    #[test]
    fn square_with_color() {
        let spec = VisualSpec::from_settings(
            &settings_map([("spriteType", "square".into()), ("spriteColor", "red".into())]),
            1.0,
            Color::WHITE,
        );
        assert_eq!(spec.shape, VisualShape::Square);
        assert_eq!(spec.color, Color::srgb(1.0, 0.0, 0.0));
    }
}
