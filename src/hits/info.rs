//! The hit record handed to hit modifiers.

use bevy::prelude::*;
use thiserror::Error;

/// One confirmed damage event, as seen by hit modifiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// The damaged entity (owner of the damageable component).
    pub target: Entity,
    pub hit_point: Vec2,
    pub hit_normal: Vec2,
    pub damage: f32,
    /// Elapsed seconds when the hit happened.
    pub time: f32,
    /// The payload whose primary mechanic landed the hit.
    pub source: Entity,
}

/// Sent by a primary mechanic after it has dealt damage.
#[derive(Event, Debug, Clone, Copy)]
pub struct PrimaryHit(pub HitInfo);

/// Failure inside one hit modifier. Logged, never propagated.
#[derive(Debug, Error)]
pub enum HitModifierError {
    #[error("{component} missing on {entity:?}")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("hit target {0:?} no longer exists")]
    TargetGone(Entity),

    #[error("{0}")]
    Failed(String),
}
