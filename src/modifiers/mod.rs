//! Modifiers module - secondaries and how they are applied to a batch.

mod bounce;
mod damage_over_time;
mod drain;
mod explosion;
mod lock;
mod orbit;
mod plugin;
mod ripple_on_hit;
mod strategy;

pub use bounce::BounceModifier;
pub use damage_over_time::{DamageOverTimeEffect, DamageOverTimeModifier, DotStack};
pub use drain::DrainModifier;
pub use explosion::ExplosionModifier;
pub use lock::LockModifier;
pub use orbit::{group_placement, OrbitStrategy};
pub use plugin::ModifiersPlugin;
pub use ripple_on_hit::RippleOnHitModifier;
pub use strategy::{
    apply_secondaries, strategy_for, AttachStrategy, ModifierRequest, ModifierStrategy,
    SubItemsStrategy,
};
