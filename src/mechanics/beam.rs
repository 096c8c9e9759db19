//! Beam: a strip along a direction that damages its overlaps on an interval.

use bevy::prelude::*;
use std::time::Duration;
use bevy_rapier2d::prelude::Collider;

use super::common::{direction_setting, normal_between, HitEmitter, HitRules};
use super::contract::{Mechanic, MechanicContext};
use super::geometry::{heading, strip_contains};
use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::Lifecycle;
use crate::hits::Overlaps;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct BeamMechanic {
    pub rules: HitRules,
    pub length: f32,
    pub width: f32,
    pub interval: f32,
    pub direction: Vec2,
    /// Re-aim at the nearest mob each tick.
    pub aim_at_nearest: bool,
    pub timer: Timer,
    lifecycle: Lifecycle,
}

impl Default for BeamMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(6.0),
            length: 8.0,
            width: 0.4,
            interval: 0.25,
            direction: Vec2::X,
            aim_at_nearest: true,
            timer: Timer::from_seconds(0.25, TimerMode::Repeating),
            lifecycle: Lifecycle::default(),
        }
    }
}

impl BeamMechanic {
    /// Sensor shape: a box whose near edge sits on the payload origin.
    pub fn collider(&self) -> Collider {
        Collider::compound(vec![(
            Vec2::new(self.length * 0.5, 0.0),
            0.0,
            Collider::cuboid(self.length * 0.5, self.width * 0.5),
        )])
    }
}

impl Mechanic for BeamMechanic {
    const NAME: &'static str = "Beam";
    const ALIASES: &'static [&'static str] = &["BeamMechanic", "Laser"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.length = normalize::radius(s, &["length", "beamLength"], self.length);
        self.width = normalize::radius(s, &["width", "beamWidth"], self.width);
        self.interval = normalize::interval(s, &["interval", "tickInterval"], self.interval);
        self.aim_at_nearest = normalize::bool(s, &["aimAtNearest", "directionFromResolver"], self.aim_at_nearest);
        self.direction = direction_setting(settings, self.direction);
        self.timer.set_duration(Duration::from_secs_f32(self.interval));
    }

    fn reset_for_reuse(&mut self) {
        self.timer.reset();
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn tick_beams(
    time: Res<Time>,
    mut beams: Query<(
        Entity,
        &mut BeamMechanic,
        &MechanicContext,
        &mut Transform,
        &GlobalTransform,
        Option<&Overlaps>,
    )>,
    positions: Query<&GlobalTransform>,
    targeting: MobTargeting,
    targets: DamageTargets,
    mut emitter: HitEmitter,
) {
    for (entity, mut beam, ctx, mut transform, global, overlaps) in beams.iter_mut() {
        if !beam.lifecycle.is_running() {
            continue;
        }
        let origin = global.translation().truncate();
        let filter = beam.rules.filter(ctx.owner);

        if beam.aim_at_nearest {
            let accept = |e: Entity| targets.accept(e, &filter).is_some();
            if let Some((_, position)) = targeting.nearest_mob(origin, Some(beam.length), &accept) {
                if let Some(direction) = (position - origin).try_normalize() {
                    beam.direction = direction;
                }
            }
        }
        let rotation = Quat::from_rotation_z(heading(beam.direction));
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }

        beam.timer.tick(time.delta());
        if !beam.timer.just_finished() {
            continue;
        }

        // Sensor overlaps when physics runs, strip test otherwise
        let candidates: Vec<Entity> = match overlaps {
            Some(overlaps) if !overlaps.0.is_empty() => overlaps.sorted(),
            _ => targeting
                .mobs_within(origin, beam.length + beam.width)
                .into_iter()
                .filter(|(_, p)| strip_contains(origin, beam.direction, beam.length, beam.width, *p))
                .map(|(mob, _)| mob)
                .collect(),
        };

        for other in candidates {
            let Some(target) = targets.accept(other, &filter) else {
                continue;
            };
            let position = positions
                .get(target)
                .map(|t| t.translation().truncate())
                .unwrap_or(origin);
            let normal = normal_between(origin, position, -beam.direction);
            emitter.hit(entity, target, beam.rules.damage, position, normal);
        }
    }
}
