//! Components marking the spawned item tree, and the re-entry request.

use bevy::prelude::*;

use super::params::{ItemInstruction, ItemParams};

/// The root of one built item.
#[derive(Component, Debug, Clone, Copy)]
pub struct ItemRoot {
    /// Owner handed to every mechanic context; the root itself when unowned.
    pub owner: Entity,
    pub target: Option<Entity>,
}

/// A child built by a primary builder. Survives detachment.
#[derive(Component, Debug, Clone, Copy)]
pub struct SubItem {
    pub root: Entity,
    /// Spawn order within the root; recycling moves a child to the back.
    pub index: u32,
}

/// How many rule-triggered spawns deep an item is.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnDepth(pub u32);

/// Ask the generator to build an item next frame.
///
/// Mechanics that spawn items (sub-items on condition) send this instead of
/// building in place.
#[derive(Event, Debug, Clone)]
pub struct SpawnItemRequest {
    pub instruction: ItemInstruction,
    pub params: ItemParams,
    pub position: Vec2,
    pub owner: Option<Entity>,
    pub target: Option<Entity>,
}
