//! Mechanics module - the runtime behaviors attached to item entities.

mod aura;
mod beam;
mod common;
mod contract;
pub mod geometry;
mod movement;
mod orbit;
mod plugin;
mod projectile;
mod ripple;
mod spawner;
mod strike;
mod sub_items;
mod sword_slash;
mod whip;

pub use aura::{AuraCenter, AuraMechanic, DrainReport};
pub use beam::BeamMechanic;
pub use common::{normal_between, HitEmitter, HitRules, MechanicHelper};
pub use contract::{
    initialize_late, run_initialize, stop_on_shutdown, AttachedMechanics, Mechanic,
    MechanicContext, MechanicInit,
};
pub use movement::{DropMovement, ThrowMovement};
pub use orbit::{spread_evenly, OrbitMechanic, OrbitPath, OrbitRoster};
pub use plugin::MechanicsPlugin;
pub use projectile::{BounceRequest, ProjectileMechanic, DESTROY_ON_HIT_KEYS};
pub use ripple::RippleMechanic;
pub use spawner::{IntervalSpawner, SequenceSpawner};
pub use strike::StrikeMechanic;
pub use sub_items::{SpawnPosition, SpawnRule, SpawnTrigger, SubItemsOnConditionMechanic};
pub use sword_slash::SwordSlashMechanic;
pub use whip::{sector_collider, WhipHitMode, WhipMechanic, WhipVisualMode};
