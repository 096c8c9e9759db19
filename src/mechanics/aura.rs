//! Aura: periodic damage to everything inside a circle.
//!
//! The circle is a scaled sensor collider on a helper entity, so overlap
//! tracking comes from the physics broadphase rather than a distance loop.

use bevy::prelude::*;
use std::time::Duration;
use bevy_rapier2d::prelude::{ActiveCollisionTypes, ActiveEvents, Collider, Sensor};

use super::common::{normal_between, HitEmitter, HitRules, MechanicHelper};
use super::contract::{AttachedMechanics, Mechanic, MechanicContext, MechanicInit};
use crate::combat::DamageTargets;
use crate::core::Lifecycle;
use crate::hits::{Overlaps, QueryColliderOf};
use crate::rendering::VisualSpec;
use crate::settings::{normalize, SettingsMap};

/// Total damage an aura dealt in one pulse, for a co-located Drain.
#[derive(Event, Debug, Clone, Copy)]
pub struct DrainReport {
    pub source: Entity,
    pub owner: Entity,
    pub total: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuraCenter {
    #[default]
    Owner,
    Target,
    Payload,
}

impl AuraCenter {
    fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "target" => AuraCenter::Target,
            "self" | "payload" => AuraCenter::Payload,
            _ => AuraCenter::Owner,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct AuraMechanic {
    pub rules: HitRules,
    pub radius: f32,
    pub interval: f32,
    pub center_on: AuraCenter,
    pub show_visual: bool,
    pub color: Color,
    pub timer: Timer,
    pub total_dealt: f32,
    pub query_collider: Option<Entity>,
    pub overlay: Option<Entity>,
    reports_drain: bool,
    lifecycle: Lifecycle,
}

impl Default for AuraMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(4.0),
            radius: 2.0,
            interval: 0.5,
            center_on: AuraCenter::Owner,
            show_visual: true,
            color: Color::srgba(0.5, 0.83, 1.0, 0.33),
            timer: Timer::from_seconds(0.5, TimerMode::Repeating),
            total_dealt: 0.0,
            query_collider: None,
            overlay: None,
            reports_drain: false,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for AuraMechanic {
    const NAME: &'static str = "Aura";
    const ALIASES: &'static [&'static str] = &["AuraMechanic"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.radius = normalize::radius(s, &["radius", "auraRadius"], self.radius);
        self.interval = normalize::interval(s, &["interval", "tickInterval"], self.interval);
        self.show_visual = normalize::bool(s, &["showVisual", "visual"], self.show_visual);
        self.color = normalize::color(s, &["spriteColor", "color"], self.color);
        let center = normalize::string(s, &["centerOn", "center"], "");
        if !center.is_empty() {
            self.center_on = AuraCenter::parse(&center);
        }
        self.timer.set_duration(Duration::from_secs_f32(self.interval));
    }

    fn initialize(&mut self, init: &MechanicInit) {
        self.reports_drain = init.attached.contains("Drain");
    }

    fn reset_for_reuse(&mut self) {
        self.timer.reset();
        self.total_dealt = 0.0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

fn aura_center(aura: &AuraMechanic, ctx: &MechanicContext, transforms: &Query<&GlobalTransform>) -> Vec2 {
    let entity = match aura.center_on {
        AuraCenter::Owner => ctx.owner,
        AuraCenter::Target => ctx.target.unwrap_or(ctx.owner),
        AuraCenter::Payload => ctx.payload,
    };
    transforms
        .get(entity)
        .or_else(|_| transforms.get(ctx.payload))
        .map(|t| t.translation().truncate())
        .unwrap_or(Vec2::ZERO)
}

/// Spawn the query collider and overlay, then keep them on the center.
pub fn sync_aura_helpers(
    mut commands: Commands,
    mut auras: Query<(Entity, &mut AuraMechanic, &MechanicContext, Option<&AttachedMechanics>)>,
    transforms: Query<&GlobalTransform>,
    mut helpers: Query<&mut Transform, With<MechanicHelper>>,
) {
    for (entity, mut aura, ctx, attached) in auras.iter_mut() {
        if !aura.lifecycle.is_running() {
            continue;
        }
        aura.reports_drain = attached.is_some_and(|a| a.contains("Drain"));
        let center = aura_center(&aura, ctx, &transforms);
        let placed = Transform::from_translation(center.extend(0.0)).with_scale(Vec3::splat(aura.radius));

        if aura.query_collider.is_none() {
            let collider = commands
                .spawn((
                    Name::new("AuraQuery"),
                    MechanicHelper { of: entity },
                    QueryColliderOf(entity),
                    Collider::ball(1.0),
                    Sensor,
                    ActiveEvents::COLLISION_EVENTS,
                    ActiveCollisionTypes::all(),
                    placed,
                ))
                .id();
            aura.query_collider = Some(collider);
            commands.entity(entity).insert(Overlaps::default());
        }
        if aura.show_visual && aura.overlay.is_none() {
            let overlay = commands
                .spawn((
                    Name::new("AuraOverlay"),
                    MechanicHelper { of: entity },
                    VisualSpec::circle(1.0, aura.color),
                    placed,
                ))
                .id();
            aura.overlay = Some(overlay);
        }

        for helper in [aura.query_collider, aura.overlay].into_iter().flatten() {
            if let Ok(mut transform) = helpers.get_mut(helper) {
                transform.translation = placed.translation;
                transform.scale = placed.scale;
            }
        }
    }
}

/// Damage every accepted overlap once per interval.
pub fn tick_auras(
    time: Res<Time>,
    mut auras: Query<(Entity, &mut AuraMechanic, &MechanicContext, Option<&Overlaps>)>,
    transforms: Query<&GlobalTransform>,
    targets: DamageTargets,
    mut emitter: HitEmitter,
    mut drains: EventWriter<DrainReport>,
) {
    for (entity, mut aura, ctx, overlaps) in auras.iter_mut() {
        if !aura.lifecycle.is_running() {
            continue;
        }
        aura.timer.tick(time.delta());
        let pulses = aura.timer.times_finished_this_tick();
        if pulses == 0 {
            continue;
        }
        let Some(overlaps) = overlaps else {
            continue;
        };

        let center = aura_center(&aura, ctx, &transforms);
        let filter = aura.rules.filter(ctx.owner);
        let mut total = 0.0;
        for other in overlaps.sorted() {
            let Some(target) = targets.accept(other, &filter) else {
                continue;
            };
            let position = transforms
                .get(target)
                .map(|t| t.translation().truncate())
                .unwrap_or(center);
            let normal = normal_between(position, center, Vec2::Y);
            for _ in 0..pulses {
                emitter.damage(entity, target, aura.rules.damage, position, normal);
                total += aura.rules.damage;
            }
        }

        aura.total_dealt += total;
        if total > 0.0 && aura.reports_drain {
            drains.send(DrainReport {
                source: entity,
                owner: ctx.owner,
                total,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings_map;

    #[test]
    fn settings_resize_the_timer() {
        let mut aura = AuraMechanic::default();
        aura.apply_settings(&settings_map([("interval", 0.25.into()), ("centerOn", "target".into())]));
        assert_eq!(aura.timer.duration().as_secs_f32(), 0.25);
        assert_eq!(aura.center_on, AuraCenter::Target);
    }

    #[test]
    fn single_key_update_keeps_interval_progress() {
        let mut aura = AuraMechanic::default();
        aura.timer.tick(Duration::from_secs_f32(0.3));
        aura.apply_settings(&settings_map([("damage", 9.into())]));
        assert!((aura.timer.elapsed_secs() - 0.3).abs() < 1e-6);
        assert_eq!(aura.timer.duration().as_secs_f32(), 0.5);
    }

    #[test]
    fn bad_interval_keeps_previous() {
        let mut aura = AuraMechanic::default();
        aura.apply_settings(&settings_map([("interval", (-1).into())]));
        assert_eq!(aura.interval, 0.5);
    }
}
