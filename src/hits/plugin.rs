//! Hits plugin - contact translation and hit-modifier dispatch.

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;

use super::contacts::{prune_overlaps, track_overlaps, translate_collision_events, TriggerContact};
use super::dispatch::{dispatch_primary_hits, HitModifierRegistry};
use super::info::PrimaryHit;
use crate::core::MechanicSet;

pub struct HitsPlugin;

impl Plugin for HitsPlugin {
    fn build(&self, app: &mut App) {
        app
            // Rapier registers this too; headless apps run without physics
            .add_event::<CollisionEvent>()
            .add_event::<TriggerContact>()
            .add_event::<PrimaryHit>()
            .init_resource::<HitModifierRegistry>()
            .add_systems(
                Update,
                (translate_collision_events, track_overlaps, prune_overlaps)
                    .chain()
                    .in_set(MechanicSet::Sync),
            )
            .add_systems(Update, dispatch_primary_hits.in_set(MechanicSet::Hits));
    }
}
