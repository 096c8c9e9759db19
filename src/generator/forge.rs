//! `ItemGenerator` - the composition root.
//!
//! Holds exclusive world access for the duration of one build so builders,
//! modifier strategies and spawners can create entities, attach mechanics by
//! name and initialize them before anything ticks.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ActiveCollisionTypes, ActiveEvents, RigidBody, Sensor, Velocity};

use super::components::{ItemRoot, SpawnDepth, SubItem};
use super::params::{ItemInstruction, ItemParams};
use crate::builders::{builder_for, BuildPlan, BuildRequest, ChildSpec};
use crate::catalog::{ForgeConfig, MechanicCatalog, MechanicDefinitions, MechanicEntry, MechanicKind, PrimaryKind};
use crate::combat::AttachedBody;
use crate::core::ShutdownToken;
use crate::hits::Overlaps;
use crate::mechanics::{AttachedMechanics, MechanicContext, MechanicInit};
use crate::modifiers::apply_secondaries;
use crate::settings::{
    create_effective_settings, settings_map, SecondarySettings, SettingValue, SettingsMap,
};

pub struct ItemGenerator<'w> {
    world: &'w mut World,
}

impl<'w> ItemGenerator<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    pub fn config(&self) -> ForgeConfig {
        self.world
            .get_resource::<ForgeConfig>()
            .cloned()
            .unwrap_or_default()
    }

    /// Build an item equipped on `owner`. The root follows the owner.
    pub fn create(&mut self, instruction: &ItemInstruction, params: &ItemParams, owner: Entity) -> Option<Entity> {
        if self.world.get_entity(owner).is_err() {
            warn!("Cannot equip '{}' on missing owner {:?}", instruction.primary, owner);
            return None;
        }
        let kind = self.resolve_kind(instruction)?;
        let root = self.spawn_root(kind, params, Some(owner), None, Vec2::ZERO);
        self.world.entity_mut(root).set_parent(owner);
        self.finish_create(kind, root, instruction, params)
    }

    /// Build a free-standing item at a world position.
    pub fn create_at(
        &mut self,
        instruction: &ItemInstruction,
        params: &ItemParams,
        owner: Option<Entity>,
        position: Vec2,
    ) -> Option<Entity> {
        let kind = self.resolve_kind(instruction)?;
        let owner = owner.filter(|owner| self.world.get_entity(*owner).is_ok());
        let root = self.spawn_root(kind, params, owner, None, position);
        self.finish_create(kind, root, instruction, params)
    }

    /// Like [`Self::create`], with every mechanic aimed at `target`.
    pub fn create_with_target(
        &mut self,
        instruction: &ItemInstruction,
        params: &ItemParams,
        owner: Entity,
        target: Entity,
    ) -> Option<Entity> {
        let root = self.create(instruction, params, owner)?;
        self.set_target(root, Some(target));
        Some(root)
    }

    fn resolve_kind(&self, instruction: &ItemInstruction) -> Option<MechanicKind> {
        let kind = MechanicKind::parse(&instruction.primary);
        if kind.is_none() {
            warn!("Unknown primary mechanic '{}', nothing built", instruction.primary);
        }
        kind
    }

    fn spawn_root(
        &mut self,
        kind: MechanicKind,
        params: &ItemParams,
        owner: Option<Entity>,
        target: Option<Entity>,
        position: Vec2,
    ) -> Entity {
        let root = self
            .world
            .spawn((
                Name::new(format!("Item:{kind}")),
                Transform::from_translation(position.extend(0.0)),
                Visibility::default(),
                SpawnDepth(params.spawn_depth),
            ))
            .id();
        self.world.entity_mut(root).insert(ItemRoot {
            owner: owner.unwrap_or(root),
            target,
        });
        root
    }

    fn finish_create(
        &mut self,
        kind: MechanicKind,
        root: Entity,
        instruction: &ItemInstruction,
        params: &ItemParams,
    ) -> Option<Entity> {
        let request = BuildRequest {
            root,
            instruction: instruction.clone(),
            params: params.clone(),
        };
        let mut sub_items = Vec::new();
        builder_for(kind).build(self, &request, &mut sub_items);
        self.initialize_mechanics(root);

        debug!("Built {} as {:?} with {} sub-items", kind, root, sub_items.len());
        Some(root)
    }

    /// Spawn one child of `root` from a spec. Mechanics are attached but not
    /// initialized.
    pub fn create_child(&mut self, root: Entity, kind: MechanicKind, spec: ChildSpec) -> Entity {
        let depth = self.world.get::<SpawnDepth>(root).copied().unwrap_or_default();
        let transform = Transform::from_translation(spec.offset.extend(0.0))
            .with_rotation(Quat::from_rotation_z(spec.rotation));

        let child = self
            .world
            .spawn((
                Name::new(spec.name.clone()),
                transform,
                Visibility::default(),
                PrimaryKind(kind),
                depth,
            ))
            .id();
        self.world.entity_mut(child).set_parent(root);

        let mut entity = self.world.entity_mut(child);
        if let Some(visual) = spec.visual {
            entity.insert(visual);
        }
        if let Some(collider) = spec.collider {
            entity.insert((
                collider,
                Sensor,
                ActiveEvents::COLLISION_EVENTS,
                ActiveCollisionTypes::all(),
            ));
        }
        if spec.track_overlaps {
            entity.insert(Overlaps::default());
        }
        if let Some(body) = spec.body {
            entity.insert((body, Velocity::zero()));
        }

        self.add_mechanic_by_name(child, spec.primary, &spec.settings);
        for (name, settings) in &spec.extras {
            self.add_mechanic_by_name(child, name, settings);
        }
        child
    }

    /// Attach a mechanic by name or alias. Unknown names are skipped with a
    /// warning. Mechanics added to an initialized entity are initialized on
    /// the spot.
    pub fn add_mechanic_by_name(&mut self, entity: Entity, name: &str, settings: &SettingsMap) -> bool {
        let Some(entry) = self.catalog_entry(name) else {
            warn!("Unknown mechanic '{}', not attached to {:?}", name, entity);
            return false;
        };
        let Ok(mut entity_mut) = self.world.get_entity_mut(entity) else {
            return false;
        };
        entry.attach(&mut entity_mut, settings);

        if let (Some(ctx), Some(attached)) = (
            entity_mut.get::<MechanicContext>().cloned(),
            entity_mut.get::<AttachedMechanics>().cloned(),
        ) {
            let local_offset = entity_mut
                .get::<Transform>()
                .map(|t| t.translation.truncate())
                .unwrap_or_default();
            let init = MechanicInit {
                ctx: &ctx,
                attached: &attached,
                local_offset,
            };
            entry.initialize(&mut entity_mut, &init);
        }
        true
    }

    /// Give `entity` its context (once) and initialize every attached
    /// mechanic in initialize order. Already initialized mechanics are left
    /// alone.
    pub fn initialize_mechanics(&mut self, entity: Entity) {
        let Some(ctx) = self.context_for(entity) else {
            return;
        };
        let entries = self.initialize_order();
        let Ok(mut entity_mut) = self.world.get_entity_mut(entity) else {
            return;
        };
        if !entity_mut.contains::<MechanicContext>() {
            entity_mut.insert(ctx.clone());
        }
        let attached = entity_mut
            .get::<AttachedMechanics>()
            .cloned()
            .unwrap_or_default();
        let local_offset = entity_mut
            .get::<Transform>()
            .map(|t| t.translation.truncate())
            .unwrap_or_default();
        let init = MechanicInit {
            ctx: &ctx,
            attached: &attached,
            local_offset,
        };
        for entry in entries.iter().filter(|entry| attached.contains(entry.name)) {
            entry.initialize(&mut entity_mut, &init);
        }
    }

    /// Change one setting on a mechanic already attached to `entity`.
    pub fn set_existing_mechanic_setting(
        &mut self,
        entity: Entity,
        mechanic: &str,
        key: &str,
        value: SettingValue,
    ) -> bool {
        let Some(entry) = self.catalog_entry(mechanic) else {
            return false;
        };
        let Ok(mut entity_mut) = self.world.get_entity_mut(entity) else {
            return false;
        };
        entry.apply(&mut entity_mut, &settings_map([(key, value)]))
    }

    pub fn knows_mechanic(&self, name: &str) -> bool {
        self.catalog_entry(name).is_some()
    }

    /// A mechanic's raw definition, if one is loaded.
    pub fn definition(&self, name: &str) -> Option<SettingsMap> {
        self.world
            .get_resource::<MechanicDefinitions>()
            .and_then(|definitions| definitions.get(name).cloned())
    }

    /// One mechanic's JSON definition, as the secondary half of a merge.
    /// Names without a definition are skipped.
    pub fn secondary_settings(&self, names: &[String]) -> Vec<SecondarySettings> {
        let Some(definitions) = self.world.get_resource::<MechanicDefinitions>() else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| {
                definitions
                    .get(name)
                    .map(|definition| SecondarySettings::from_definition(name, definition))
            })
            .collect()
    }

    /// The primary's definition merged with already-split secondaries.
    pub fn merge_settings(&self, primary: &str, secondaries: &[SecondarySettings], isolate: bool) -> SettingsMap {
        let base = self
            .world
            .get_resource::<MechanicDefinitions>()
            .map(|definitions| definitions.settings_for(primary))
            .unwrap_or_default();
        if isolate {
            return create_effective_settings(&base, &[]);
        }
        create_effective_settings(&base, secondaries)
    }

    /// Load the primary's and secondaries' JSON and merge them.
    pub fn load_and_merge_json_settings(&self, primary: &str, secondary: &[String], isolate: bool) -> SettingsMap {
        let secondaries = self.secondary_settings(secondary);
        self.merge_settings(primary, &secondaries, isolate)
    }

    /// Build `count` more children of `root` from its plan, apply the plan's
    /// secondaries and initialize them.
    pub fn spawn_batch(&mut self, root: Entity, count: u32) -> Vec<Entity> {
        self.spawn_batch_at(root, &vec![Vec2::ZERO; count as usize])
    }

    /// Like [`Self::spawn_batch`], one child per local offset.
    pub fn spawn_batch_at(&mut self, root: Entity, offsets: &[Vec2]) -> Vec<Entity> {
        let Some(plan) = self.world.get::<BuildPlan>(root).cloned() else {
            warn!("{:?} has no build plan, cannot spawn children", root);
            return Vec::new();
        };
        if offsets.is_empty() {
            return Vec::new();
        }
        let builder = builder_for(plan.kind);

        let mut children = Vec::with_capacity(offsets.len());
        for (i, offset) in offsets.iter().enumerate() {
            let index = plan.spawned + i as u32;
            let spec = builder.child_spec(&plan, index).at(*offset);
            let child = self.create_child(root, plan.kind, spec);
            self.world.entity_mut(child).insert(SubItem { root, index });
            builder.finish_child(self, child, &plan);
            children.push(child);
        }
        if let Some(mut stored) = self.world.get_mut::<BuildPlan>(root) {
            stored.spawned += offsets.len() as u32;
        }

        apply_secondaries(self, &children, &plan);

        for child in &children {
            self.initialize_mechanics(*child);
            if plan.movement.detaches() {
                self.detach(*child);
            }
        }
        children
    }

    /// Point every mechanic under `root` at a new target.
    pub fn set_target(&mut self, root: Entity, target: Option<Entity>) {
        if let Some(mut item) = self.world.get_mut::<ItemRoot>(root) {
            item.target = target;
        }
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            if let Some(mut ctx) = self.world.get_mut::<MechanicContext>(entity) {
                ctx.target = target;
            }
            if let Some(children) = self.world.get::<Children>(entity) {
                stack.extend(children.iter().copied());
            }
        }
        // Detached sub-items are no longer in the hierarchy
        let mut detached = self.world.query::<(&SubItem, &mut MechanicContext)>();
        for (sub_item, mut ctx) in detached.iter_mut(self.world) {
            if sub_item.root == root {
                ctx.target = target;
            }
        }
    }

    /// Move `entity` out of its parent, keeping its world pose.
    pub fn detach(&mut self, entity: Entity) {
        let world_transform = self.world_transform(entity);
        let Ok(mut entity_mut) = self.world.get_entity_mut(entity) else {
            return;
        };
        entity_mut.remove_parent();
        entity_mut.insert(world_transform);
    }

    /// Reuse a pooled child: move it and reset every attached mechanic.
    pub fn recycle(&mut self, entity: Entity, local_offset: Vec2) {
        let attached = self
            .world
            .get::<AttachedMechanics>(entity)
            .cloned()
            .unwrap_or_default();
        let entries: Vec<MechanicEntry> = attached
            .iter()
            .filter_map(|name| self.catalog_entry(name))
            .collect();

        let parented = self.world.get::<Parent>(entity).is_some();
        let root = self.world.get::<SubItem>(entity).map(|s| s.root);
        let translation = match (parented, root) {
            (false, Some(root)) => self.world_position(root) + local_offset,
            _ => local_offset,
        };

        let Ok(mut entity_mut) = self.world.get_entity_mut(entity) else {
            return;
        };
        for entry in &entries {
            entry.recycle(&mut entity_mut);
        }
        if let Some(mut transform) = entity_mut.get_mut::<Transform>() {
            transform.translation.x = translation.x;
            transform.translation.y = translation.y;
        }
        if let Some(mut velocity) = entity_mut.get_mut::<Velocity>() {
            *velocity = Velocity::zero();
        }
        if let Some(mut overlaps) = entity_mut.get_mut::<Overlaps>() {
            overlaps.0.clear();
        }
    }

    /// Transform in world space, composed from the parent chain.
    ///
    /// Works on entities spawned this frame, before transform propagation.
    pub fn world_transform(&self, entity: Entity) -> Transform {
        let mut transform = self.world.get::<Transform>(entity).copied().unwrap_or_default();
        let mut current = entity;
        while let Some(parent) = self.world.get::<Parent>(current).map(|p| p.get()) {
            let parent_transform = self.world.get::<Transform>(parent).copied().unwrap_or_default();
            transform = parent_transform.mul_transform(transform);
            current = parent;
        }
        transform
    }

    pub fn world_position(&self, entity: Entity) -> Vec2 {
        self.world_transform(entity).translation.truncate()
    }

    /// The entity's world +X, used as the default facing.
    pub fn world_right(&self, entity: Entity) -> Vec2 {
        (self.world_transform(entity).rotation * Vec3::X).truncate()
    }

    /// Children built for `root` that still exist, oldest first.
    pub fn sub_items_of(&mut self, root: Entity) -> Vec<Entity> {
        let mut query = self.world.query::<(Entity, &SubItem)>();
        let mut items: Vec<(u32, Entity)> = query
            .iter(self.world)
            .filter(|(_, sub_item)| sub_item.root == root)
            .map(|(entity, sub_item)| (sub_item.index, entity))
            .collect();
        items.sort();
        items.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Spawn children at `offsets`, recycling the oldest live children once
    /// `cap` is reached (0 = uncapped).
    pub fn spawn_or_recycle(&mut self, root: Entity, offsets: &[Vec2], cap: u32) -> Vec<Entity> {
        let mut alive: VecDeque<Entity> = self.sub_items_of(root).into();
        let mut room = match cap {
            0 => usize::MAX,
            cap => (cap as usize).saturating_sub(alive.len()),
        };
        let mut fresh = Vec::new();
        for offset in offsets {
            if room > 0 {
                fresh.push(*offset);
                room -= 1;
            } else if let Some(oldest) = alive.pop_front() {
                self.recycle(oldest, *offset);
                let index = self.next_index(root);
                if let Some(mut sub_item) = self.world.get_mut::<SubItem>(oldest) {
                    sub_item.index = index;
                }
                alive.push_back(oldest);
            }
        }
        self.spawn_batch_at(root, &fresh)
    }

    fn next_index(&mut self, root: Entity) -> u32 {
        match self.world.get_mut::<BuildPlan>(root) {
            Some(mut plan) => {
                plan.spawned += 1;
                plan.spawned - 1
            }
            None => 0,
        }
    }

    fn catalog_entry(&self, name: &str) -> Option<MechanicEntry> {
        self.world
            .get_resource::<MechanicCatalog>()
            .and_then(|catalog| catalog.resolve(name))
    }

    fn initialize_order(&self) -> Vec<MechanicEntry> {
        self.world
            .get_resource::<MechanicCatalog>()
            .map(MechanicCatalog::in_initialize_order)
            .unwrap_or_default()
    }

    /// Context for a root or one of its sub-items.
    fn context_for(&self, entity: Entity) -> Option<MechanicContext> {
        if let Some(ctx) = self.world.get::<MechanicContext>(entity) {
            return Some(ctx.clone());
        }
        let root = match self.world.get::<SubItem>(entity) {
            Some(sub_item) => sub_item.root,
            None => entity,
        };
        let item = self.world.get::<ItemRoot>(root).copied()?;
        let shutdown = self
            .world
            .get_resource::<ShutdownToken>()
            .cloned()
            .unwrap_or_default();
        Some(MechanicContext {
            owner: item.owner,
            payload: entity,
            target: item.target,
            owner_body: self.world.get::<AttachedBody>(item.owner).map(|body| body.0),
            payload_body: self.world.get::<RigidBody>(entity).map(|_| entity),
            shutdown,
        })
    }
}
