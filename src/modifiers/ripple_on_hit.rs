//! Ripple on hit: every hit sends a single ring out from the hit point.

use bevy::prelude::*;

use crate::core::Lifecycle;
use crate::hits::{HitInfo, HitModifier, HitModifierError};
use crate::mechanics::{
    run_initialize, AttachedMechanics, Mechanic, MechanicContext, MechanicInit, RippleMechanic,
};
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct RippleOnHitModifier {
    pub damage: f32,
    pub end_radius: f32,
    pub grow_duration: f32,
    pub thickness: f32,
    lifecycle: Lifecycle,
}

impl Default for RippleOnHitModifier {
    fn default() -> Self {
        Self {
            damage: 6.0,
            end_radius: 2.5,
            grow_duration: 0.4,
            thickness: 0.3,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl RippleOnHitModifier {
    pub fn ripple(&self) -> RippleMechanic {
        RippleMechanic::one_shot(self.damage, self.end_radius, self.grow_duration, self.thickness)
    }
}

impl Mechanic for RippleOnHitModifier {
    const NAME: &'static str = "RippleOnHit";
    const ALIASES: &'static [&'static str] = &["RippleOnHitModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.damage = normalize::damage(s, &["rippleDamage", "damage"], self.damage);
        self.end_radius = normalize::radius(s, &["endRadius", "rippleRadius"], self.end_radius);
        self.grow_duration = normalize::interval(s, &["growDuration"], self.grow_duration);
        self.thickness = normalize::radius(s, &["thickness"], self.thickness);
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

impl HitModifier for RippleOnHitModifier {
    fn on_primary_hit(world: &mut World, source: Entity, hit: &HitInfo) -> Result<(), HitModifierError> {
        let modifier = world
            .get::<RippleOnHitModifier>(source)
            .cloned()
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "RippleOnHitModifier",
            })?;
        if !modifier.lifecycle.is_running() {
            return Ok(());
        }
        let source_ctx = world
            .get::<MechanicContext>(source)
            .cloned()
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "MechanicContext",
            })?;

        let ripple_entity = world
            .spawn((
                Name::new("RippleOnHit"),
                Transform::from_translation(hit.hit_point.extend(0.0)),
                Visibility::default(),
            ))
            .id();
        let ctx = MechanicContext {
            payload: ripple_entity,
            payload_body: None,
            target: Some(hit.target),
            ..source_ctx
        };
        let attached = AttachedMechanics(vec![RippleMechanic::NAME]);
        let mut ripple = modifier.ripple();
        run_initialize(
            &mut ripple,
            &MechanicInit {
                ctx: &ctx,
                attached: &attached,
                local_offset: hit.hit_point,
            },
        );
        world.entity_mut(ripple_entity).insert((ripple, ctx, attached));
        Ok(())
    }
}
