//! Combat module - health, damage routing and targeting.

mod components;
mod plugin;
mod systems;
mod targeting;

pub use components::*;
pub use plugin::CombatPlugin;
pub use systems::apply_damage;
pub use targeting::{
    accept_in_world, mobs_within_world, resolve_damageable, DamageTargets, MobTargeting,
    TargetFilter, TargetingRng, TargetingService,
};
