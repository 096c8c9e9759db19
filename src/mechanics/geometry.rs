//! Sector, ring and strip tests used by area mechanics.

use bevy::prelude::*;
use std::f32::consts::TAU;

/// Wrap radians into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + std::f32::consts::PI).rem_euclid(TAU) - std::f32::consts::PI;
    if wrapped <= -std::f32::consts::PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Angle of a vector in radians.
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Whether `angle` lies in the window from `start` to `end` (counter-clockwise).
pub fn angle_in_window(angle: f32, start: f32, end: f32) -> bool {
    let span = (end - start).rem_euclid(TAU);
    if (end - start).abs() >= TAU {
        return true;
    }
    (angle - start).rem_euclid(TAU) <= span
}

/// An annular sector in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnularSector {
    pub center: Vec2,
    pub inner: f32,
    pub outer: f32,
    /// Start and end angles in radians, counter-clockwise.
    pub start: f32,
    pub end: f32,
}

impl AnnularSector {
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = point - self.center;
        let distance = offset.length();
        if distance < self.inner || distance > self.outer {
            return false;
        }
        distance <= f32::EPSILON || angle_in_window(heading(offset), self.start, self.end)
    }

    /// Convex quads covering the sector in local space, for compound colliders.
    pub fn quads(&self, segments: usize) -> Vec<[Vec2; 4]> {
        let segments = segments.max(1);
        let step = (self.end - self.start) / segments as f32;
        (0..segments)
            .map(|i| {
                let a0 = self.start + step * i as f32;
                let a1 = a0 + step;
                let d0 = Vec2::from_angle(a0);
                let d1 = Vec2::from_angle(a1);
                [d0 * self.inner, d0 * self.outer, d1 * self.outer, d1 * self.inner]
            })
            .collect()
    }
}

/// Whether `point` is on a ring band of the given radius and thickness.
pub fn ring_contains(center: Vec2, radius: f32, thickness: f32, point: Vec2) -> bool {
    let distance = point.distance(center);
    (distance - radius).abs() <= thickness * 0.5
}

/// Whether `point` is inside a strip starting at `origin` along `direction`.
pub fn strip_contains(origin: Vec2, direction: Vec2, length: f32, width: f32, point: Vec2) -> bool {
    let Some(direction) = direction.try_normalize() else {
        return false;
    };
    let offset = point - origin;
    let along = offset.dot(direction);
    let across = offset.perp_dot(direction).abs();
    (0.0..=length).contains(&along) && across <= width * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn window_handles_wraparound() {
        assert!(angle_in_window(PI, FRAC_PI_2, 3.0 * FRAC_PI_2));
        assert!(angle_in_window(0.1, -0.5, 0.5));
        assert!(!angle_in_window(1.0, -0.5, 0.5));
        assert!(angle_in_window(-3.1, 3.0, 3.0 + 0.5));
    }

    #[test]
    fn sector_checks_radius_and_angle() {
        let sector = AnnularSector {
            center: Vec2::ZERO,
            inner: 0.5,
            outer: 3.0,
            start: -0.5,
            end: 0.5,
        };
        assert!(sector.contains(Vec2::new(2.0, 0.0)));
        assert!(!sector.contains(Vec2::new(0.2, 0.0)));
        assert!(!sector.contains(Vec2::new(4.0, 0.0)));
        assert!(!sector.contains(Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn quads_span_the_sector() {
        let sector = AnnularSector {
            center: Vec2::ZERO,
            inner: 1.0,
            outer: 2.0,
            start: 0.0,
            end: FRAC_PI_2,
        };
        let quads = sector.quads(4);
        assert_eq!(quads.len(), 4);
        assert!(quads[0][0].abs_diff_eq(Vec2::X, 1e-5));
        assert!(quads[3][2].abs_diff_eq(Vec2::new(0.0, 2.0), 1e-5));
    }

    #[test]
    fn ring_and_strip() {
        assert!(ring_contains(Vec2::ZERO, 2.0, 0.4, Vec2::new(0.0, 2.1)));
        assert!(!ring_contains(Vec2::ZERO, 2.0, 0.4, Vec2::new(0.0, 1.0)));
        assert!(strip_contains(Vec2::ZERO, Vec2::X, 5.0, 1.0, Vec2::new(3.0, 0.4)));
        assert!(!strip_contains(Vec2::ZERO, Vec2::X, 5.0, 1.0, Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn wrap_stays_in_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-5);
    }
}
