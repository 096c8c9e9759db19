//! Combat-related components consumed by mechanics.

use bevy::prelude::*;

// Re-export from core to avoid duplication
pub use crate::core::{DamageEvent, DeathEvent};

/// Component for entities that can take damage.
///
/// Mechanics only ever call `take_damage` (through `DamageEvent`) and
/// `is_alive`; player and enemy code owns everything else.
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
    /// Contact point and normal of the most recent hit
    pub last_hit: Option<(Vec2, Vec2)>,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
            last_hit: None,
        }
    }

    pub fn take_damage(&mut self, amount: f32, hit_point: Vec2, hit_normal: Vec2) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        self.last_hit = Some((hit_point, hit_normal));
        actual
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.maximum - self.current);
        self.current += actual;
        actual
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn percentage(&self) -> f32 {
        self.current / self.maximum
    }
}

/// Marker for hostile mobs. Most damage mechanics require it on the target.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Mob;

/// Free-form tags for rule filters (`targetTag`).
#[derive(Component, Debug, Clone, Default)]
pub struct Tags(pub Vec<String>);

impl Tags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Links a collider entity to the separate body entity it is attached to.
///
/// Damage resolution falls back to the body's parent chain when the collider
/// itself has no damageable ancestor.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttachedBody(pub Entity);

/// Marker component for entities that have died (prevents multiple death events).
#[derive(Component, Debug, Clone, Copy)]
pub struct Dead;

/// Short tint applied to a target when a strike lands.
#[derive(Component, Debug, Clone)]
pub struct HitFlash {
    pub timer: Timer,
    pub color: Color,
}

impl HitFlash {
    pub fn new(duration: f32, color: Color) -> Self {
        Self {
            timer: Timer::from_seconds(duration.max(0.01), TimerMode::Once),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_clamped_to_remaining_health() {
        let mut health = Health::new(10.0);
        assert_eq!(health.take_damage(25.0, Vec2::ZERO, Vec2::X), 10.0);
        assert!(!health.is_alive());
        assert_eq!(health.last_hit, Some((Vec2::ZERO, Vec2::X)));
    }

    #[test]
    fn heal_never_exceeds_maximum() {
        let mut health = Health::new(10.0);
        health.take_damage(4.0, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(health.heal(10.0), 4.0);
        assert_eq!(health.current, 10.0);
    }

    #[test]
    fn tags_match_case_insensitively() {
        let tags = Tags(vec!["Mob".into(), "Boss".into()]);
        assert!(tags.contains("mob"));
        assert!(!tags.contains("player"));
    }
}
