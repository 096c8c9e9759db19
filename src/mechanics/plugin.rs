//! Mechanics plugin - registers every runtime mechanic and its systems.

use bevy::prelude::*;

use super::aura::{sync_aura_helpers, tick_auras, AuraMechanic, DrainReport};
use super::beam::{tick_beams, BeamMechanic};
use super::common::despawn_orphan_helpers;
use super::movement::{tick_drop_movement, tick_throw_movement, DropMovement, ThrowMovement};
use super::orbit::{redistribute_orbits, tick_orbits, tick_orbits_fixed, OrbitMechanic};
use super::projectile::{
    move_projectiles, projectile_contacts, resolve_projectile_directions, BounceRequest,
    ProjectileMechanic,
};
use super::ripple::{tick_ripples, RippleMechanic};
use super::spawner::{IntervalSpawner, SequenceSpawner};
use super::strike::{tick_strikes, StrikeMechanic};
use super::sub_items::{sub_items_on_contact, SubItemsOnConditionMechanic};
use super::sword_slash::{tick_sword_slashes, SwordSlashMechanic};
use super::whip::{tick_whips, WhipMechanic};
use crate::catalog::MechanicAppExt;
use crate::core::MechanicSet;
use crate::hits::HitModifierAppExt;

/// Mechanics plugin - primaries, movement, spawners and their tick systems.
pub struct MechanicsPlugin;

impl Plugin for MechanicsPlugin {
    fn build(&self, app: &mut App) {
        app.register_mechanic::<ProjectileMechanic>()
            .register_mechanic::<OrbitMechanic>()
            .register_mechanic::<AuraMechanic>()
            .register_mechanic::<StrikeMechanic>()
            .register_mechanic::<WhipMechanic>()
            .register_mechanic::<BeamMechanic>()
            .register_mechanic::<RippleMechanic>()
            .register_mechanic::<SwordSlashMechanic>()
            .register_mechanic::<IntervalSpawner>()
            .register_mechanic::<SequenceSpawner>()
            .register_mechanic::<DropMovement>()
            .register_mechanic::<ThrowMovement>()
            .register_hit_modifier::<SubItemsOnConditionMechanic>();

        app.add_event::<BounceRequest>()
            .add_event::<DrainReport>()
            .add_systems(
                Update,
                (redistribute_orbits, sync_aura_helpers).in_set(MechanicSet::Sync),
            )
            .add_systems(
                Update,
                (
                    (resolve_projectile_directions, move_projectiles, projectile_contacts).chain(),
                    tick_orbits,
                    (tick_drop_movement, tick_throw_movement),
                    (tick_auras, tick_strikes, tick_whips, tick_beams),
                    (tick_ripples, tick_sword_slashes),
                    sub_items_on_contact,
                )
                    .in_set(MechanicSet::Tick),
            )
            .add_systems(FixedUpdate, tick_orbits_fixed)
            .add_systems(Update, despawn_orphan_helpers.in_set(MechanicSet::Cleanup));
    }
}
