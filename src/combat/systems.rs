//! Combat systems - damage application, deaths and hit flashes.

use bevy::prelude::*;
use std::collections::HashSet;

use super::components::*;
use crate::core::MechanicSet;

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app.add_systems(
        Update,
        (apply_damage, log_deaths)
            .chain()
            .in_set(MechanicSet::Damage),
    )
    .add_systems(Update, update_hit_flashes.in_set(MechanicSet::Cleanup));
}

/// Apply damage events to health components.
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<(&mut Health, Option<&Dead>)>,
    mut death_events: EventWriter<DeathEvent>,
) {
    // Track entities that died this frame to avoid duplicate death events
    let mut died_this_frame = HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }

        let Ok((mut health, dead)) = health_query.get_mut(event.target) else {
            continue;
        };

        // Skip if already dead (from previous frames)
        if dead.is_some() {
            continue;
        }

        health.take_damage(event.amount, event.hit_point, event.hit_normal);

        if !health.is_alive() {
            died_this_frame.insert(event.target);
            commands.entity(event.target).insert(Dead);
            death_events.send(DeathEvent {
                entity: event.target,
                killed_by: Some(event.source),
            });
        }
    }
}

/// Deaths are owned by the consumer; the forge only reports them.
fn log_deaths(mut death_events: EventReader<DeathEvent>) {
    for event in death_events.read() {
        debug!("{:?} died (killed by {:?})", event.entity, event.killed_by);
    }
}

/// Expire hit flashes.
fn update_hit_flashes(
    mut commands: Commands,
    time: Res<Time>,
    mut flashes: Query<(Entity, &mut HitFlash)>,
) {
    for (entity, mut flash) in flashes.iter_mut() {
        flash.timer.tick(time.delta());
        if flash.timer.finished() {
            commands.entity(entity).remove::<HitFlash>();
        }
    }
}
