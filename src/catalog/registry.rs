//! Static registration table mapping mechanic names to component operations.
//!
//! Every mechanic type registers itself once at startup through
//! [`MechanicAppExt::register_mechanic`]. The table then lets the generator
//! attach, configure, initialize and recycle mechanics by name without knowing
//! their concrete types.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::{broadcast_game_over, MechanicSet};
use crate::mechanics::{
    initialize_late, run_initialize, stop_on_shutdown, AttachedMechanics, Mechanic, MechanicInit,
};
use crate::settings::normalize::normalize_key;
use crate::settings::SettingsMap;

/// Type-erased operations for one mechanic type.
#[derive(Clone, Copy)]
pub struct MechanicEntry {
    pub name: &'static str,
    pub order: i32,
    attach: fn(&mut EntityWorldMut, &SettingsMap),
    apply: fn(&mut EntityWorldMut, &SettingsMap) -> bool,
    initialize: fn(&mut EntityWorldMut, &MechanicInit) -> bool,
    recycle: fn(&mut EntityWorldMut) -> bool,
    present: fn(&EntityRef) -> bool,
}

impl MechanicEntry {
    fn of<M: Mechanic>() -> Self {
        Self {
            name: M::NAME,
            order: M::INITIALIZE_ORDER,
            attach: attach_mechanic::<M>,
            apply: apply_mechanic::<M>,
            initialize: initialize_mechanic::<M>,
            recycle: recycle_mechanic::<M>,
            present: mechanic_present::<M>,
        }
    }

    /// Insert (or reconfigure) the mechanic and record it as attached.
    pub fn attach(&self, entity: &mut EntityWorldMut, settings: &SettingsMap) {
        (self.attach)(entity, settings)
    }

    /// Apply settings to an existing instance. `false` if absent.
    pub fn apply(&self, entity: &mut EntityWorldMut, settings: &SettingsMap) -> bool {
        (self.apply)(entity, settings)
    }

    /// Initialize an existing instance. `false` if absent or already done.
    pub fn initialize(&self, entity: &mut EntityWorldMut, init: &MechanicInit) -> bool {
        (self.initialize)(entity, init)
    }

    pub fn recycle(&self, entity: &mut EntityWorldMut) -> bool {
        (self.recycle)(entity)
    }

    pub fn is_present(&self, entity: &EntityRef) -> bool {
        (self.present)(entity)
    }
}

fn attach_mechanic<M: Mechanic>(entity: &mut EntityWorldMut, settings: &SettingsMap) {
    if let Some(mut existing) = entity.get_mut::<M>() {
        existing.apply_settings(settings);
    } else {
        let mut mechanic = M::default();
        mechanic.apply_settings(settings);
        entity.insert(mechanic);
    }

    if let Some(mut attached) = entity.get_mut::<AttachedMechanics>() {
        attached.push(M::NAME);
    } else {
        entity.insert(AttachedMechanics(vec![M::NAME]));
    }
}

fn apply_mechanic<M: Mechanic>(entity: &mut EntityWorldMut, settings: &SettingsMap) -> bool {
    match entity.get_mut::<M>() {
        Some(mut mechanic) => {
            mechanic.apply_settings(settings);
            true
        }
        None => false,
    }
}

fn initialize_mechanic<M: Mechanic>(entity: &mut EntityWorldMut, init: &MechanicInit) -> bool {
    match entity.get_mut::<M>() {
        Some(mut mechanic) => run_initialize(&mut *mechanic, init),
        None => false,
    }
}

fn recycle_mechanic<M: Mechanic>(entity: &mut EntityWorldMut) -> bool {
    match entity.get_mut::<M>() {
        Some(mut mechanic) => {
            mechanic.reset_for_reuse();
            true
        }
        None => false,
    }
}

fn mechanic_present<M: Mechanic>(entity: &EntityRef) -> bool {
    entity.contains::<M>()
}

/// Name → mechanic operations.
#[derive(Resource, Default)]
pub struct MechanicCatalog {
    entries: Vec<MechanicEntry>,
    by_name: HashMap<String, usize>,
}

impl MechanicCatalog {
    /// Add a mechanic type. Returns `false` if it was already registered.
    pub fn register<M: Mechanic>(&mut self) -> bool {
        let key = normalize_key(M::NAME);
        if self.by_name.contains_key(&key) {
            return false;
        }
        let index = self.entries.len();
        self.entries.push(MechanicEntry::of::<M>());
        self.by_name.insert(key, index);
        for alias in M::ALIASES {
            self.by_name.entry(normalize_key(alias)).or_insert(index);
        }
        true
    }

    /// Look a mechanic up by name or alias.
    pub fn resolve(&self, name: &str) -> Option<MechanicEntry> {
        self.by_name
            .get(&normalize_key(name))
            .map(|&index| self.entries[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&normalize_key(name))
    }

    /// Entries sorted by initialize order, registration order breaking ties.
    pub fn in_initialize_order(&self) -> Vec<MechanicEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| entry.order);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// App extension registering mechanic types with the catalog.
pub trait MechanicAppExt {
    fn register_mechanic<M: Mechanic>(&mut self) -> &mut Self;
}

impl MechanicAppExt for App {
    fn register_mechanic<M: Mechanic>(&mut self) -> &mut Self {
        self.init_resource::<MechanicCatalog>();
        let added = self
            .world_mut()
            .resource_mut::<MechanicCatalog>()
            .register::<M>();
        if added {
            self.add_systems(
                Update,
                (
                    stop_on_shutdown::<M>
                        .after(broadcast_game_over)
                        .in_set(MechanicSet::Lifecycle),
                    initialize_late::<M>.in_set(MechanicSet::Sync),
                ),
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lifecycle, ShutdownToken};
    use crate::mechanics::MechanicContext;
    use crate::settings::{normalize, settings_map};

    #[derive(Component, Default)]
    struct Dummy {
        value: f32,
        resets: u32,
        lifecycle: Lifecycle,
    }

    impl Mechanic for Dummy {
        const NAME: &'static str = "Dummy";
        const ALIASES: &'static [&'static str] = &["test_dummy"];
        const INITIALIZE_ORDER: i32 = 5;

        fn apply_settings(&mut self, settings: &SettingsMap) {
            self.value = normalize::float(Some(settings), &["value"], self.value);
        }

        fn reset_for_reuse(&mut self) {
            self.resets += 1;
        }

        fn lifecycle(&self) -> Lifecycle {
            self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.lifecycle
        }
    }

    #[test]
    fn aliases_resolve_to_the_same_entry() {
        let mut catalog = MechanicCatalog::default();
        assert!(catalog.register::<Dummy>());
        assert!(!catalog.register::<Dummy>());
        assert_eq!(catalog.resolve("TestDummy").map(|e| e.name), Some("Dummy"));
        assert!(catalog.resolve("nothing").is_none());
    }

    #[test]
    fn attach_then_partial_apply_keeps_other_fields() {
        let mut world = World::new();
        let entry = MechanicEntry::of::<Dummy>();
        let entity = world.spawn_empty().id();
        {
            let mut entity_mut = world.entity_mut(entity);
            entry.attach(&mut entity_mut, &settings_map([("value", 3.into())]));
            assert!(entry.apply(&mut entity_mut, &SettingsMap::new()));
        }
        assert_eq!(world.get::<Dummy>(entity).map(|d| d.value), Some(3.0));
        assert_eq!(
            world.get::<AttachedMechanics>(entity),
            Some(&AttachedMechanics(vec!["Dummy"]))
        );
    }

    #[test]
    fn initialize_runs_exactly_once() {
        let mut world = World::new();
        let entry = MechanicEntry::of::<Dummy>();
        let entity = world.spawn(Dummy::default()).id();
        let ctx = MechanicContext {
            owner: entity,
            payload: entity,
            target: None,
            owner_body: None,
            payload_body: None,
            shutdown: ShutdownToken::default(),
        };
        let attached = AttachedMechanics::default();
        let init = MechanicInit {
            ctx: &ctx,
            attached: &attached,
            local_offset: Vec2::ZERO,
        };
        let mut entity_mut = world.entity_mut(entity);
        assert!(entry.initialize(&mut entity_mut, &init));
        assert!(!entry.initialize(&mut entity_mut, &init));
        assert!(entry.recycle(&mut entity_mut));
        assert_eq!(world.get::<Dummy>(entity).map(|d| d.resets), Some(1));
        assert!(world.get::<Dummy>(entity).is_some_and(|d| d.lifecycle.is_running()));
    }

    #[test]
    fn cancelled_token_initializes_stopped() {
        let mut dummy = Dummy::default();
        let ctx = MechanicContext {
            owner: Entity::PLACEHOLDER,
            payload: Entity::PLACEHOLDER,
            target: None,
            owner_body: None,
            payload_body: None,
            shutdown: ShutdownToken::default(),
        };
        ctx.shutdown.cancel();
        let attached = AttachedMechanics::default();
        let init = MechanicInit {
            ctx: &ctx,
            attached: &attached,
            local_offset: Vec2::ZERO,
        };
        assert!(run_initialize(&mut dummy, &init));
        assert!(dummy.lifecycle.is_stopped());
    }
}
