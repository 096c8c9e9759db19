//! Generator plugin - spawn requests and spawner cadences.

use bevy::prelude::*;

use super::components::SpawnItemRequest;
use super::systems::{process_spawn_requests, run_spawners};
use crate::core::MechanicSet;

pub struct GeneratorPlugin;

impl Plugin for GeneratorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnItemRequest>()
            .add_systems(
                Update,
                (process_spawn_requests, run_spawners)
                    .chain()
                    .in_set(MechanicSet::Spawn),
            );
    }
}
