//! Ripple: an expanding ring that damages each mob once per wave.

use bevy::prelude::*;
use std::collections::HashSet;

use super::common::{normal_between, HitEmitter, HitRules};
use super::contract::{Mechanic, MechanicContext};
use super::geometry::ring_contains;
use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::{Lifecycle, PendingDespawn};
use crate::rendering::RingVisual;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct RippleMechanic {
    pub rules: HitRules,
    pub start_radius: f32,
    pub end_radius: f32,
    pub thickness: f32,
    pub grow_duration: f32,
    /// Seconds between wave starts when repeating.
    pub interval: f32,
    pub repeat: bool,
    /// Despawn the payload after a non-repeating wave ends.
    pub despawn_when_done: bool,
    pub color: Color,
    pub elapsed: f32,
    pub waves: u32,
    hit_this_wave: HashSet<Entity>,
    lifecycle: Lifecycle,
}

impl Default for RippleMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(12.0),
            start_radius: 0.2,
            end_radius: 4.0,
            thickness: 0.4,
            grow_duration: 0.8,
            interval: 2.0,
            repeat: true,
            despawn_when_done: false,
            color: Color::srgba(0.6, 0.9, 1.0, 0.8),
            elapsed: 0.0,
            waves: 0,
            hit_this_wave: HashSet::new(),
            lifecycle: Lifecycle::default(),
        }
    }
}

impl RippleMechanic {
    /// A single wave that cleans up after itself.
    pub fn one_shot(damage: f32, end_radius: f32, grow_duration: f32, thickness: f32) -> Self {
        Self {
            rules: HitRules::with_damage(damage),
            end_radius,
            grow_duration,
            thickness,
            repeat: false,
            despawn_when_done: true,
            ..Default::default()
        }
    }

    pub fn current_radius(&self) -> f32 {
        let t = if self.grow_duration > 0.0 {
            (self.elapsed / self.grow_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.start_radius + (self.end_radius - self.start_radius) * t
    }

    pub fn growing(&self) -> bool {
        self.elapsed <= self.grow_duration
    }

    /// Advance the wave clock. Returns `true` when a new wave begins.
    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let period = self.interval.max(self.grow_duration);
        if self.repeat && self.elapsed >= period {
            self.elapsed -= period;
            self.hit_this_wave.clear();
            self.waves += 1;
            return true;
        }
        false
    }

    fn finished(&self) -> bool {
        !self.repeat && !self.growing()
    }
}

impl Mechanic for RippleMechanic {
    const NAME: &'static str = "Ripple";
    const ALIASES: &'static [&'static str] = &["RippleMechanic"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.start_radius = normalize::radius(s, &["startRadius"], self.start_radius);
        self.end_radius = normalize::radius(s, &["endRadius", "radius", "maxRadius"], self.end_radius);
        self.thickness = normalize::radius(s, &["thickness", "ringThickness"], self.thickness);
        self.grow_duration = normalize::interval(s, &["growDuration", "duration"], self.grow_duration);
        self.interval = normalize::interval(s, &["interval", "repeatInterval"], self.interval);
        self.repeat = normalize::bool(s, &["repeat", "loop"], self.repeat);
        self.color = normalize::color(s, &["spriteColor", "color"], self.color);
    }

    fn reset_for_reuse(&mut self) {
        self.elapsed = 0.0;
        self.waves = 0;
        self.hit_this_wave.clear();
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn tick_ripples(
    mut commands: Commands,
    time: Res<Time>,
    mut ripples: Query<(Entity, &mut RippleMechanic, &MechanicContext, &GlobalTransform)>,
    targeting: MobTargeting,
    targets: DamageTargets,
    mut emitter: HitEmitter,
) {
    let dt = time.delta_secs();
    for (entity, mut ripple, ctx, transform) in ripples.iter_mut() {
        if !ripple.lifecycle.is_running() {
            continue;
        }
        ripple.advance(dt);
        if ripple.finished() {
            commands.entity(entity).insert(RingVisual {
                radius: ripple.end_radius,
                thickness: ripple.thickness,
                color: ripple.color,
                visible: false,
            });
            if ripple.despawn_when_done {
                commands.entity(entity).insert(PendingDespawn);
            }
            continue;
        }

        let center = transform.translation().truncate();
        let radius = ripple.current_radius();
        let growing = ripple.growing();
        commands.entity(entity).insert(RingVisual {
            radius,
            thickness: ripple.thickness,
            color: ripple.color,
            visible: growing,
        });
        if !growing {
            continue;
        }

        let filter = ripple.rules.filter(ctx.owner);
        for (mob, position) in targeting.mobs_within(center, radius + ripple.thickness) {
            if !ring_contains(center, radius, ripple.thickness, position) {
                continue;
            }
            let Some(target) = targets.accept(mob, &filter) else {
                continue;
            };
            if !ripple.hit_this_wave.insert(target) {
                continue;
            }
            let normal = normal_between(position, center, Vec2::Y);
            emitter.hit(entity, target, ripple.rules.damage, position, normal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_grows_linearly() {
        let mut ripple = RippleMechanic {
            start_radius: 0.0,
            end_radius: 4.0,
            grow_duration: 1.0,
            ..Default::default()
        };
        ripple.elapsed = 0.5;
        assert!((ripple.current_radius() - 2.0).abs() < 1e-5);
        ripple.elapsed = 3.0;
        assert_eq!(ripple.current_radius(), 4.0);
    }

    #[test]
    fn repeating_wave_restarts_and_forgets_hits() {
        let mut ripple = RippleMechanic {
            interval: 1.0,
            grow_duration: 0.5,
            ..Default::default()
        };
        ripple.hit_this_wave.insert(Entity::from_raw(3));
        assert!(!ripple.advance(0.6));
        assert!(ripple.advance(0.5));
        assert!(ripple.hit_this_wave.is_empty());
        assert_eq!(ripple.waves, 1);
    }

    #[test]
    fn one_shot_finishes_after_growing() {
        let mut ripple = RippleMechanic::one_shot(5.0, 2.0, 0.4, 0.3);
        ripple.advance(0.2);
        assert!(!ripple.finished());
        ripple.advance(0.3);
        assert!(ripple.finished());
    }
}
