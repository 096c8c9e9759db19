//! Pluggable orbit path shapes.

use bevy::prelude::*;

/// Shape an orbiter follows around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitPath {
    Circular { radius: f32 },
    /// Lemniscate of Gerono: `(w cos a, h sin 2a / 2)`.
    FigureEight { width: f32, height: f32 },
}

impl Default for OrbitPath {
    fn default() -> Self {
        OrbitPath::Circular { radius: 1.5 }
    }
}

impl OrbitPath {
    /// Build a path from its id. Unknown ids fall back to circular.
    pub fn from_id(id: &str, radius: f32) -> Self {
        match id.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "figureeight" | "figure8" | "lemniscate" | "infinity" => OrbitPath::FigureEight {
                width: radius,
                height: radius,
            },
            _ => OrbitPath::Circular { radius },
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            OrbitPath::Circular { .. } => "circular",
            OrbitPath::FigureEight { .. } => "figureEight",
        }
    }

    pub fn resize(&mut self, radius: f32) {
        match self {
            OrbitPath::Circular { radius: r } => *r = radius,
            OrbitPath::FigureEight { width, height } => {
                *width = radius;
                *height = radius;
            }
        }
    }

    pub fn evaluate_position(&self, center: Vec2, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        let offset = match *self {
            OrbitPath::Circular { radius } => Vec2::new(cos, sin) * radius,
            OrbitPath::FigureEight { width, height } => Vec2::new(width * cos, height * sin * cos),
        };
        center + offset
    }

    /// Angle whose position best matches `offset`, or `fallback` when the
    /// offset carries no usable direction.
    pub fn resolve_initial_angle(&self, offset: Vec2, fallback: f32) -> f32 {
        if offset.length_squared() < 1e-6 {
            return fallback;
        }
        match *self {
            OrbitPath::Circular { .. } => offset.y.atan2(offset.x),
            OrbitPath::FigureEight { width, .. } => {
                if width <= f32::EPSILON {
                    return fallback;
                }
                let cos = (offset.x / width).clamp(-1.0, 1.0);
                let sin = (1.0 - cos * cos).sqrt();
                // y = h sin a cos a, so sin a carries the sign of y * cos a
                let sign = if offset.y * cos < 0.0 { -1.0 } else { 1.0 };
                (sign * sin).atan2(cos)
            }
        }
    }
}
