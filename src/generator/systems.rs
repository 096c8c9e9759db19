//! Exclusive systems that re-enter the generator during play.

use bevy::prelude::*;

use super::components::SpawnItemRequest;
use super::forge::ItemGenerator;
use crate::catalog::ForgeConfig;
use crate::core::ShutdownToken;
use crate::mechanics::{IntervalSpawner, Mechanic, SequenceSpawner};

/// Build every item requested since the last run.
pub fn process_spawn_requests(world: &mut World) {
    let requests: Vec<SpawnItemRequest> = world
        .resource_mut::<Events<SpawnItemRequest>>()
        .drain()
        .collect();
    if requests.is_empty() {
        return;
    }
    if world.resource::<ShutdownToken>().is_cancelled() {
        debug!("Dropping {} spawn requests after shutdown", requests.len());
        return;
    }

    let max_depth = world
        .get_resource::<ForgeConfig>()
        .map(|config| config.max_spawn_depth)
        .unwrap_or_else(|| ForgeConfig::default().max_spawn_depth);

    let mut generator = ItemGenerator::new(world);
    for request in requests {
        if request.params.spawn_depth > max_depth {
            info!(
                "Refusing to spawn '{}' at depth {} (max {})",
                request.instruction.primary, request.params.spawn_depth, max_depth
            );
            continue;
        }
        let Some(root) = generator.create_at(&request.instruction, &request.params, request.owner, request.position)
        else {
            continue;
        };
        if request.target.is_some() {
            generator.set_target(root, request.target);
        }
    }
}

/// Turn due spawner ticks into children.
pub fn run_spawners(world: &mut World) {
    if world.resource::<ShutdownToken>().is_cancelled() {
        return;
    }
    let dt = world.resource::<Time>().delta_secs();
    // (root, local offsets, live cap)
    let mut due: Vec<(Entity, Vec<Vec2>, u32)> = Vec::new();

    let mut intervals = world.query::<(Entity, &mut IntervalSpawner)>();
    for (root, mut spawner) in intervals.iter_mut(world) {
        if !spawner.lifecycle().is_running() {
            continue;
        }
        let count = spawner.advance(dt);
        if count == 0 {
            continue;
        }
        let first = spawner.spawned_total;
        let offsets = (first..first + count).map(|i| spawner.offset(i)).collect();
        spawner.spawned_total += count;
        due.push((root, offsets, spawner.max_alive));
    }

    let mut sequences = world.query::<(Entity, &mut SequenceSpawner)>();
    for (root, mut spawner) in sequences.iter_mut(world) {
        if !spawner.lifecycle().is_running() {
            continue;
        }
        let first = spawner.spawned;
        let count = spawner.advance(dt);
        if count == 0 {
            continue;
        }
        let offsets = (first..first + count).map(|i| spawner.offset(i)).collect();
        due.push((root, offsets, 0));
    }

    if due.is_empty() {
        return;
    }
    let mut generator = ItemGenerator::new(world);
    for (root, offsets, cap) in due {
        let spawned = generator.spawn_or_recycle(root, &offsets, cap);
        trace!("Spawner on {:?} built {} children", root, spawned.len());
    }
}
