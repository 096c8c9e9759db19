//! Straight-line projectile with contact damage.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{RigidBody, Velocity};
use std::collections::HashSet;

use super::common::{direction_setting, normal_between, HitEmitter, HitRules};
use super::contract::{AttachedMechanics, Mechanic, MechanicContext, MechanicInit};
use super::movement::{DropMovement, ThrowMovement};
use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::{Lifecycle, PendingDespawn};
use crate::hits::TriggerContact;
use crate::settings::{normalize, SettingsMap};

pub const DESTROY_ON_HIT_KEYS: [&str; 3] = ["destroyOnHit", "DestroyOnHit", "destroy_on_hit"];

/// Sent instead of self-destruction when a Bounce modifier is attached.
#[derive(Event, Debug, Clone, Copy)]
pub struct BounceRequest {
    pub payload: Entity,
    pub target: Entity,
    pub hit_point: Vec2,
    pub hit_normal: Vec2,
}

#[derive(Component, Debug, Clone)]
pub struct ProjectileMechanic {
    pub speed: f32,
    pub direction: Vec2,
    pub radius: f32,
    pub rules: HitRules,
    /// Seconds before self-destruction; 0 disables.
    pub lifetime: f32,
    pub age: f32,
    pub destroy_on_hit: bool,
    /// Orbit (or another controller) owns the position.
    pub disable_self_speed: bool,
    pub direction_from_resolver: bool,
    /// Drop/throw movement is attached; only track direction and speed.
    pub external_movement: bool,
    direction_resolved: bool,
    lifecycle: Lifecycle,
}

impl Default for ProjectileMechanic {
    fn default() -> Self {
        Self {
            speed: 6.0,
            direction: Vec2::X,
            radius: 0.25,
            rules: HitRules::with_damage(10.0),
            lifetime: 4.0,
            age: 0.0,
            destroy_on_hit: true,
            disable_self_speed: false,
            direction_from_resolver: false,
            external_movement: false,
            direction_resolved: false,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for ProjectileMechanic {
    const NAME: &'static str = "Projectile";
    const ALIASES: &'static [&'static str] = &["ProjectileMechanic", "Bullet"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.speed = normalize::speed(s, &["speed", "moveSpeed"], self.speed);
        self.radius = normalize::radius(s, &["radius", "colliderRadius"], self.radius);
        self.lifetime = normalize::float(s, &["lifetime", "lifeTime"], self.lifetime).max(0.0);
        self.destroy_on_hit = normalize::bool(s, &DESTROY_ON_HIT_KEYS, self.destroy_on_hit);
        self.disable_self_speed = normalize::bool(s, &["disableSelfSpeed"], self.disable_self_speed);
        self.direction_from_resolver =
            normalize::bool(s, &["directionFromResolver"], self.direction_from_resolver);
        self.direction = direction_setting(settings, self.direction);
        self.rules.apply_settings(settings);
    }

    fn initialize(&mut self, init: &MechanicInit) {
        self.external_movement = has_external_movement(init.attached);
        self.direction_resolved = !self.direction_from_resolver;
    }

    fn reset_for_reuse(&mut self) {
        self.age = 0.0;
        self.direction_resolved = !self.direction_from_resolver;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

fn has_external_movement(attached: &AttachedMechanics) -> bool {
    attached.contains(DropMovement::NAME) || attached.contains(ThrowMovement::NAME)
}

/// Point resolver-driven projectiles at the nearest valid mob.
pub fn resolve_projectile_directions(
    mut projectiles: Query<(&mut ProjectileMechanic, &MechanicContext, &GlobalTransform)>,
    mut targeting: MobTargeting,
    targets: DamageTargets,
) {
    for (mut projectile, ctx, transform) in projectiles.iter_mut() {
        if projectile.direction_resolved || !projectile.lifecycle.is_running() {
            continue;
        }
        projectile.direction_resolved = true;
        let origin = transform.translation().truncate();
        let filter = projectile.rules.filter(ctx.owner);
        let accept = |e: Entity| targets.accept(e, &filter).is_some();
        if let Some((_, position)) = targeting.nearest_mob(origin, None, &accept) {
            if let Some(direction) = (position - origin).try_normalize() {
                projectile.direction = direction;
            }
        }
    }
}

/// Age, expire and move projectiles.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(
        Entity,
        &mut ProjectileMechanic,
        &mut Transform,
        Option<&mut Velocity>,
        Option<&RigidBody>,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile, mut transform, velocity, body) in projectiles.iter_mut() {
        if !projectile.lifecycle.is_running() {
            continue;
        }

        projectile.age += dt;
        if projectile.lifetime > 0.0 && projectile.age >= projectile.lifetime {
            commands.entity(entity).insert(PendingDespawn);
            continue;
        }

        if projectile.disable_self_speed || projectile.external_movement {
            continue;
        }

        let step = projectile.direction * projectile.speed;
        match (velocity, body) {
            (Some(mut velocity), Some(RigidBody::KinematicVelocityBased | RigidBody::Dynamic)) => {
                if velocity.linvel != step {
                    velocity.linvel = step;
                }
            }
            _ => transform.translation += (step * dt).extend(0.0),
        }
    }
}

/// Contact damage, hit dispatch and post-hit policy.
#[allow(clippy::too_many_arguments)]
pub fn projectile_contacts(
    mut commands: Commands,
    mut contacts: EventReader<TriggerContact>,
    projectiles: Query<(
        &ProjectileMechanic,
        &MechanicContext,
        &GlobalTransform,
        Option<&AttachedMechanics>,
        Has<PendingDespawn>,
    )>,
    transforms: Query<&GlobalTransform>,
    targets: DamageTargets,
    mut emitter: HitEmitter,
    mut bounces: EventWriter<BounceRequest>,
) {
    let mut finished = HashSet::new();
    let mut hit_pairs = HashSet::new();

    for contact in contacts.read().filter(|c| c.started) {
        let payload = contact.collider;
        let Ok((projectile, ctx, transform, attached, pending)) = projectiles.get(payload) else {
            continue;
        };
        if pending || finished.contains(&payload) || !projectile.lifecycle.is_running() {
            continue;
        }
        let Some(target) = targets.accept(contact.other, &projectile.rules.filter(ctx.owner)) else {
            continue;
        };
        if !hit_pairs.insert((payload, target)) {
            continue;
        }

        let hit_point = transform.translation().truncate();
        let target_position = transforms
            .get(target)
            .map(|t| t.translation().truncate())
            .unwrap_or(hit_point);
        let hit_normal = normal_between(hit_point, target_position, -projectile.direction);

        emitter.hit(payload, target, projectile.rules.damage, hit_point, hit_normal);

        let bounces_on_hit = attached.is_some_and(|a| a.contains("Bounce"));
        if bounces_on_hit {
            bounces.send(BounceRequest {
                payload,
                target,
                hit_point,
                hit_normal,
            });
        } else if projectile.destroy_on_hit {
            commands.entity(payload).insert(PendingDespawn);
            finished.insert(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings_map;

    #[test]
    fn destroy_on_hit_accepts_every_casing() {
        for key in DESTROY_ON_HIT_KEYS {
            let mut projectile = ProjectileMechanic::default();
            projectile.apply_settings(&settings_map([(key, false.into())]));
            assert!(!projectile.destroy_on_hit, "{key}");
        }
    }

    #[test]
    fn partial_settings_keep_previous_values() {
        let mut projectile = ProjectileMechanic::default();
        projectile.apply_settings(&settings_map([("speed", 9.into()), ("damage", 3.into())]));
        projectile.apply_settings(&settings_map([("disableSelfSpeed", true.into())]));
        assert_eq!(projectile.speed, 9.0);
        assert_eq!(projectile.rules.damage, 3.0);
        assert!(projectile.disable_self_speed);
    }

    #[test]
    fn direction_is_normalized() {
        let mut projectile = ProjectileMechanic::default();
        projectile.apply_settings(&settings_map([("direction", Vec2::new(0.0, 3.0).into())]));
        assert_eq!(projectile.direction, Vec2::Y);
    }
}
