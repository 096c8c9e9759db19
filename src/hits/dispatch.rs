//! Decoupled hit notification.
//!
//! A primary mechanic sends `PrimaryHit` after dealing damage. The dispatcher
//! walks the source entity's attached mechanic names and runs every one that
//! registered a hit handler. A failing handler is logged and skipped; it can
//! neither stop the remaining handlers nor the primary's own post-hit logic.

use bevy::prelude::*;
use std::collections::HashMap;

use super::info::{HitInfo, HitModifierError, PrimaryHit};
use crate::catalog::MechanicAppExt;
use crate::mechanics::{AttachedMechanics, Mechanic};
use crate::settings::normalize::normalize_key;

pub type HitHandler = fn(&mut World, Entity, &HitInfo) -> Result<(), HitModifierError>;

/// Capability: react to any primary's confirmed hit on the same entity.
pub trait HitModifier: Mechanic {
    fn on_primary_hit(world: &mut World, source: Entity, hit: &HitInfo) -> Result<(), HitModifierError>;
}

/// Mechanic name → hit handler.
#[derive(Resource, Default)]
pub struct HitModifierRegistry {
    handlers: HashMap<String, HitHandler>,
}

impl HitModifierRegistry {
    pub fn register(&mut self, name: &str, handler: HitHandler) {
        self.handlers.insert(normalize_key(name), handler);
    }

    pub fn handler(&self, name: &str) -> Option<HitHandler> {
        self.handlers.get(&normalize_key(name)).copied()
    }

    /// Run every handler attached to `hit.source`. Returns how many succeeded.
    pub fn dispatch(&self, world: &mut World, hit: &HitInfo) -> usize {
        let Some(attached) = world.get::<AttachedMechanics>(hit.source).cloned() else {
            return 0;
        };

        let mut succeeded = 0;
        for name in attached.iter() {
            let Some(handler) = self.handler(name) else {
                continue;
            };
            match handler(world, hit.source, hit) {
                Ok(()) => succeeded += 1,
                Err(e) => error!("Hit modifier '{}' on {:?} failed: {}", name, hit.source, e),
            }
        }
        succeeded
    }
}

/// Drain this frame's hits and dispatch them.
pub fn dispatch_primary_hits(world: &mut World) {
    let hits: Vec<HitInfo> = world
        .resource_mut::<Events<PrimaryHit>>()
        .drain()
        .map(|event| event.0)
        .collect();
    if hits.is_empty() {
        return;
    }

    world.resource_scope(|world, registry: Mut<HitModifierRegistry>| {
        for hit in &hits {
            registry.dispatch(world, hit);
        }
    });
}

/// App extension registering a hit modifier (and its mechanic).
pub trait HitModifierAppExt {
    fn register_hit_modifier<M: HitModifier>(&mut self) -> &mut Self;
}

impl HitModifierAppExt for App {
    fn register_hit_modifier<M: HitModifier>(&mut self) -> &mut Self {
        self.register_mechanic::<M>();
        self.init_resource::<HitModifierRegistry>();
        self.world_mut()
            .resource_mut::<HitModifierRegistry>()
            .register(M::NAME, M::on_primary_hit);
        self
    }
}
