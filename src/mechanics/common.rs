//! Pieces shared by the damage-dealing mechanics.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::TargetFilter;
use crate::core::DamageEvent;
use crate::hits::{HitInfo, PrimaryHit};
use crate::settings::{normalize, SettingsMap};

/// Damage amount and who may receive it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRules {
    pub damage: f32,
    pub require_mob_tag: bool,
    pub exclude_owner: bool,
}

impl HitRules {
    pub fn with_damage(damage: f32) -> Self {
        Self {
            damage,
            require_mob_tag: true,
            exclude_owner: true,
        }
    }

    pub fn apply_settings(&mut self, settings: &SettingsMap) {
        let settings = Some(settings);
        self.damage = normalize::damage(settings, &["damage", "damageAmount"], self.damage);
        self.require_mob_tag = normalize::bool(settings, &["requireMobTag"], self.require_mob_tag);
        self.exclude_owner = normalize::bool(settings, &["excludeOwner"], self.exclude_owner);
    }

    pub fn filter(&self, owner: Entity) -> TargetFilter {
        TargetFilter {
            owner,
            exclude_owner: self.exclude_owner,
            require_mob_tag: self.require_mob_tag,
        }
    }
}

/// Sends damage, and for primaries the follow-up hit notification.
#[derive(SystemParam)]
pub struct HitEmitter<'w> {
    damage: EventWriter<'w, DamageEvent>,
    hits: EventWriter<'w, PrimaryHit>,
    time: Res<'w, Time>,
}

impl HitEmitter<'_> {
    /// Damage without notifying hit modifiers.
    pub fn damage(&mut self, source: Entity, target: Entity, amount: f32, hit_point: Vec2, hit_normal: Vec2) {
        self.damage.send(DamageEvent {
            target,
            source,
            amount,
            hit_point,
            hit_normal,
        });
    }

    /// Damage plus a `PrimaryHit` for every hit modifier on `source`.
    pub fn hit(
        &mut self,
        source: Entity,
        target: Entity,
        amount: f32,
        hit_point: Vec2,
        hit_normal: Vec2,
    ) -> HitInfo {
        self.damage(source, target, amount, hit_point, hit_normal);
        let info = HitInfo {
            target,
            hit_point,
            hit_normal,
            damage: amount,
            time: self.time.elapsed_secs(),
            source,
        };
        self.hits.send(PrimaryHit(info));
        info
    }
}

/// A helper entity (query collider, overlay) spawned by a mechanic.
/// Despawned once the mechanic's entity is gone.
#[derive(Component, Debug, Clone, Copy)]
pub struct MechanicHelper {
    pub of: Entity,
}

pub fn despawn_orphan_helpers(
    mut commands: Commands,
    helpers: Query<(Entity, &MechanicHelper)>,
    entities: Query<Entity>,
) {
    for (helper, link) in helpers.iter() {
        if !entities.contains(link.of) {
            commands.entity(helper).despawn_recursive();
        }
    }
}

/// Unit direction from settings, falling back to `current`.
pub fn direction_setting(settings: &SettingsMap, current: Vec2) -> Vec2 {
    normalize::explicit_vec2(Some(settings), &["direction", "dir"])
        .and_then(|d| d.try_normalize())
        .unwrap_or(current)
}

/// Surface normal pointing from `target` towards `from`.
pub fn normal_between(from: Vec2, target: Vec2, fallback: Vec2) -> Vec2 {
    (from - target).try_normalize().unwrap_or(fallback)
}
