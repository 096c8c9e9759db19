//! Global events used for cross-system communication.
//!
//! Mechanics never touch health directly. They send a `DamageEvent`, and the
//! combat systems apply it to whatever damageable component the target has.

use bevy::prelude::*;

/// Sent when a mechanic confirms damage against a resolved damageable target.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    /// Entity owning the damageable component
    pub target: Entity,
    /// Mechanic payload that dealt the damage
    pub source: Entity,
    /// Damage amount
    pub amount: f32,
    /// World-space contact point
    pub hit_point: Vec2,
    /// Direction pointing from the target toward the source
    pub hit_normal: Vec2,
}

/// Sent when an entity's health reaches zero.
#[derive(Event, Debug, Clone, Copy)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
    /// Payload that dealt the killing blow (if any)
    pub killed_by: Option<Entity>,
}

/// Process-wide stop signal. Every running mechanic transitions to stopped
/// and all kinematic velocities are zeroed.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct GameOverEvent;
