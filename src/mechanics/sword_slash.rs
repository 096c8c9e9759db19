//! Sword slash: a periodic arc swing in front of the owner.

use bevy::prelude::*;
use std::time::Duration;

use super::common::{direction_setting, normal_between, HitEmitter, HitRules};
use super::contract::{Mechanic, MechanicContext};
use super::geometry::{heading, AnnularSector};
use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::Lifecycle;
use crate::rendering::SectorVisual;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct SwordSlashMechanic {
    pub rules: HitRules,
    pub radius: f32,
    pub arc_deg: f32,
    pub interval: f32,
    pub slash_duration: f32,
    pub direction: Vec2,
    /// Face the nearest mob when a swing starts.
    pub aim_at_nearest: bool,
    pub color: Color,
    pub timer: Timer,
    /// Seconds left on the current swing's visual.
    pub swing_remaining: f32,
    pub slashes: u32,
    lifecycle: Lifecycle,
}

impl Default for SwordSlashMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(20.0),
            radius: 2.0,
            arc_deg: 90.0,
            interval: 1.0,
            slash_duration: 0.2,
            direction: Vec2::X,
            aim_at_nearest: true,
            color: Color::srgba(1.0, 1.0, 1.0, 0.7),
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
            swing_remaining: 0.0,
            slashes: 0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl SwordSlashMechanic {
    pub fn sector(&self, center: Vec2) -> AnnularSector {
        let half = self.arc_deg.to_radians() * 0.5;
        let facing = heading(self.direction);
        AnnularSector {
            center,
            inner: 0.0,
            outer: self.radius,
            start: facing - half,
            end: facing + half,
        }
    }
}

impl Mechanic for SwordSlashMechanic {
    const NAME: &'static str = "SwordSlash";
    const ALIASES: &'static [&'static str] = &["SwordSlashMechanic", "Slash"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.radius = normalize::radius(s, &["radius", "range", "length"], self.radius);
        self.arc_deg = normalize::float(s, &["arcDeg", "arc"], self.arc_deg).clamp(0.0, 360.0);
        self.interval = normalize::interval(s, &["interval", "slashInterval"], self.interval);
        self.slash_duration = normalize::interval(s, &["slashDuration", "duration"], self.slash_duration);
        self.aim_at_nearest = normalize::bool(s, &["aimAtNearest", "directionFromResolver"], self.aim_at_nearest);
        self.color = normalize::color(s, &["spriteColor", "color"], self.color);
        self.direction = direction_setting(settings, self.direction);
        self.timer.set_duration(Duration::from_secs_f32(self.interval));
    }

    fn reset_for_reuse(&mut self) {
        self.timer.reset();
        self.swing_remaining = 0.0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn tick_sword_slashes(
    mut commands: Commands,
    time: Res<Time>,
    mut slashes: Query<(Entity, &mut SwordSlashMechanic, &MechanicContext, &GlobalTransform)>,
    targeting: MobTargeting,
    targets: DamageTargets,
    mut emitter: HitEmitter,
) {
    let dt = time.delta_secs();
    for (entity, mut slash, ctx, transform) in slashes.iter_mut() {
        if !slash.lifecycle.is_running() {
            continue;
        }
        let center = transform.translation().truncate();
        let filter = slash.rules.filter(ctx.owner);

        slash.swing_remaining = (slash.swing_remaining - dt).max(0.0);
        slash.timer.tick(time.delta());
        let swing = slash.timer.just_finished();

        if swing {
            if slash.aim_at_nearest {
                let accept = |e: Entity| targets.accept(e, &filter).is_some();
                if let Some((_, position)) = targeting.nearest_mob(center, None, &accept) {
                    if let Some(direction) = (position - center).try_normalize() {
                        slash.direction = direction;
                    }
                }
            }
            slash.swing_remaining = slash.slash_duration;
            slash.slashes += 1;

            let sector = slash.sector(center);
            for (mob, position) in targeting.mobs_within(center, slash.radius) {
                if !sector.contains(position) {
                    continue;
                }
                let Some(target) = targets.accept(mob, &filter) else {
                    continue;
                };
                let normal = normal_between(position, center, slash.direction);
                emitter.hit(entity, target, slash.rules.damage, position, normal);
            }
        }

        let sector = slash.sector(center);
        commands.entity(entity).insert(SectorVisual {
            inner: sector.inner,
            outer: sector.outer,
            start: sector.start,
            end: sector.end,
            filled: true,
            color: slash.color,
            visible: slash.swing_remaining > 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_is_centered_on_direction() {
        let slash = SwordSlashMechanic {
            direction: Vec2::Y,
            arc_deg: 90.0,
            radius: 2.0,
            ..Default::default()
        };
        let sector = slash.sector(Vec2::ZERO);
        assert!(sector.contains(Vec2::new(0.0, 1.5)));
        assert!(sector.contains(Vec2::new(0.5, 1.0)));
        assert!(!sector.contains(Vec2::new(1.5, 0.0)));
        assert!(!sector.contains(Vec2::new(0.0, 2.5)));
    }
}
