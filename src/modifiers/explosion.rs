//! Explosion: splash damage around every hit point.

use bevy::prelude::*;

use crate::combat::{accept_in_world, mobs_within_world};
use crate::core::{DamageEvent, Lifecycle};
use crate::hits::{HitInfo, HitModifier, HitModifierError};
use crate::mechanics::{normal_between, HitRules, Mechanic, MechanicContext};
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct ExplosionModifier {
    pub radius: f32,
    pub rules: HitRules,
    /// Whether the primary's own target takes splash damage too.
    pub include_primary_target: bool,
    lifecycle: Lifecycle,
}

impl Default for ExplosionModifier {
    fn default() -> Self {
        Self {
            radius: 1.5,
            rules: HitRules::with_damage(8.0),
            include_primary_target: false,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for ExplosionModifier {
    const NAME: &'static str = "Explosion";
    const ALIASES: &'static [&'static str] = &["Explode", "ExplosionModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.radius = normalize::radius(s, &["explosionRadius", "radius"], self.radius);
        self.rules.apply_settings(settings);
        self.rules.damage = normalize::damage(s, &["explosionDamage"], self.rules.damage);
        self.include_primary_target =
            normalize::bool(s, &["includePrimaryTarget"], self.include_primary_target);
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

impl HitModifier for ExplosionModifier {
    fn on_primary_hit(world: &mut World, source: Entity, hit: &HitInfo) -> Result<(), HitModifierError> {
        let explosion = world
            .get::<ExplosionModifier>(source)
            .cloned()
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "ExplosionModifier",
            })?;
        if !explosion.lifecycle.is_running() {
            return Ok(());
        }
        let owner = world
            .get::<MechanicContext>(source)
            .map(|ctx| ctx.owner)
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "MechanicContext",
            })?;

        let filter = explosion.rules.filter(owner);
        let mut splashed: Vec<(Entity, Vec2)> = mobs_within_world(world, hit.hit_point, explosion.radius)
            .into_iter()
            .filter(|(mob, _)| explosion.include_primary_target || *mob != hit.target)
            .filter_map(|(mob, position)| accept_in_world(world, mob, &filter).map(|target| (target, position)))
            .collect();
        splashed.sort_by_key(|(target, _)| *target);
        splashed.dedup_by_key(|(target, _)| *target);

        for (target, position) in &splashed {
            world.send_event(DamageEvent {
                target: *target,
                source,
                amount: explosion.rules.damage,
                hit_point: *position,
                hit_normal: normal_between(*position, hit.hit_point, hit.hit_normal),
            });
        }
        debug!("Explosion at {:?} hit {} mobs", hit.hit_point, splashed.len());
        Ok(())
    }
}
