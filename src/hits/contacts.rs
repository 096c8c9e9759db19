//! Rapier collision events translated into per-collider contacts.

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;
use std::collections::HashSet;

/// One side of a collision pair. Every rapier event yields two of these.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerContact {
    pub collider: Entity,
    pub other: Entity,
    pub started: bool,
}

/// A helper sensor whose contacts count for another entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct QueryColliderOf(pub Entity);

/// Entities currently inside a mechanic's sensor.
#[derive(Component, Debug, Clone, Default)]
pub struct Overlaps(pub HashSet<Entity>);

impl Overlaps {
    /// Stable order so iteration does not depend on hashing.
    pub fn sorted(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.0.iter().copied().collect();
        entities.sort();
        entities
    }
}

pub fn translate_collision_events(
    mut collisions: EventReader<CollisionEvent>,
    mut contacts: EventWriter<TriggerContact>,
) {
    for event in collisions.read() {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };
        contacts.send(TriggerContact {
            collider: a,
            other: b,
            started,
        });
        contacts.send(TriggerContact {
            collider: b,
            other: a,
            started,
        });
    }
}

/// Keep `Overlaps` sets in sync, routing helper colliders to their owner.
pub fn track_overlaps(
    mut contacts: EventReader<TriggerContact>,
    helpers: Query<&QueryColliderOf>,
    mut overlaps: Query<&mut Overlaps>,
) {
    for contact in contacts.read() {
        let holder = helpers
            .get(contact.collider)
            .map(|helper| helper.0)
            .unwrap_or(contact.collider);
        let Ok(mut set) = overlaps.get_mut(holder) else {
            continue;
        };
        if contact.started {
            set.0.insert(contact.other);
        } else {
            set.0.remove(&contact.other);
        }
    }
}

/// Forget overlapping entities that no longer exist.
pub fn prune_overlaps(mut overlaps: Query<&mut Overlaps>, entities: Query<Entity>) {
    for mut set in overlaps.iter_mut() {
        if set.0.iter().any(|e| !entities.contains(*e)) {
            set.0.retain(|e| entities.contains(*e));
        }
    }
}
