//! Modifiers plugin - secondary mechanics and their systems.

use bevy::prelude::*;

use super::bounce::{handle_bounces, BounceModifier};
use super::damage_over_time::{tick_damage_over_time, DamageOverTimeModifier};
use super::drain::{apply_drain, DrainModifier};
use super::explosion::ExplosionModifier;
use super::lock::{steer_locked_projectiles, LockModifier};
use super::ripple_on_hit::RippleOnHitModifier;
use crate::catalog::MechanicAppExt;
use crate::combat::apply_damage;
use crate::core::MechanicSet;
use crate::hits::HitModifierAppExt;

/// Modifiers plugin - must come after `MechanicsPlugin`, whose events the
/// modifier systems read.
pub struct ModifiersPlugin;

impl Plugin for ModifiersPlugin {
    fn build(&self, app: &mut App) {
        app.register_mechanic::<LockModifier>()
            .register_mechanic::<BounceModifier>()
            .register_mechanic::<DrainModifier>()
            .register_hit_modifier::<DamageOverTimeModifier>()
            .register_hit_modifier::<ExplosionModifier>()
            .register_hit_modifier::<RippleOnHitModifier>();

        app.add_systems(Update, steer_locked_projectiles.in_set(MechanicSet::Sync))
            .add_systems(Update, (handle_bounces, apply_drain).in_set(MechanicSet::Hits))
            .add_systems(
                Update,
                tick_damage_over_time
                    .in_set(MechanicSet::Damage)
                    .before(apply_damage),
            );
    }
}
