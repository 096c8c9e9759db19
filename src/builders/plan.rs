//! The resolved build plan and the precedence rules behind it.

use bevy::prelude::*;

use crate::catalog::MechanicKind;
use crate::generator::{ItemInstruction, ItemParams};
use crate::mechanics::DESTROY_ON_HIT_KEYS;
use crate::settings::{normalize, SecondarySettings, SettingsMap};

/// When children get built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnCadence {
    #[default]
    Static,
    Interval,
    Sequence,
}

impl SpawnCadence {
    /// `spawnBehavior` (aliases `spawnMode`, `cadence`), else the legacy
    /// `spawnOnInterval` flag. Unknown values are static.
    pub fn resolve(settings: &SettingsMap) -> Self {
        let s = Some(settings);
        let behavior = normalize::string(s, &["spawnBehavior", "spawnMode", "cadence"], "");
        match normalize::normalize_key(&behavior).as_str() {
            "interval" | "oninterval" | "timed" => return SpawnCadence::Interval,
            "sequence" | "burst" | "staggered" => return SpawnCadence::Sequence,
            "static" | "" => {}
            other => debug!("Unknown spawn behavior '{}', building statically", other),
        }
        if behavior.trim().is_empty() && normalize::bool(s, &["spawnOnInterval"], false) {
            return SpawnCadence::Interval;
        }
        SpawnCadence::Static
    }
}

/// How children move once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Stay parented, no extra movement.
    None,
    /// Parented; the primary moves the child itself.
    #[default]
    Default,
    /// Detached; falls under gravity.
    Drop,
    /// Detached; flies out and slows down.
    Throw,
}

impl MovementMode {
    pub fn parse(name: &str) -> Option<Self> {
        match normalize::normalize_key(name).as_str() {
            "none" | "static" => Some(MovementMode::None),
            "default" | "" => Some(MovementMode::Default),
            "drop" | "dropped" => Some(MovementMode::Drop),
            "throw" | "thrown" => Some(MovementMode::Throw),
            _ => None,
        }
    }

    /// `ItemParams.child_behavior` wins over `movementMode`/`childBehavior`.
    pub fn resolve(settings: &SettingsMap, params: &ItemParams) -> Self {
        if let Some(mode) = params.child_behavior.as_deref().and_then(Self::parse) {
            return mode;
        }
        let name = normalize::string(Some(settings), &["movementMode", "childBehavior"], "default");
        Self::parse(&name).unwrap_or_default()
    }

    pub fn detaches(&self) -> bool {
        matches!(self, MovementMode::Drop | MovementMode::Throw)
    }

    /// Mechanic carrying this movement, if any.
    pub fn mechanic(&self) -> Option<&'static str> {
        match self {
            MovementMode::Drop => Some("DropMovement"),
            MovementMode::Throw => Some("ThrowMovement"),
            _ => None,
        }
    }
}

/// Params count, then the generator override, then JSON, then the builder
/// default. Never below one.
pub fn resolve_count(params: &ItemParams, config_override: u32, settings: &SettingsMap, builder_default: u32) -> u32 {
    if params.sub_item_count > 0 {
        return params.sub_item_count;
    }
    if config_override > 0 {
        return config_override;
    }
    let json = normalize::count(
        Some(settings),
        &["childrenToSpawn", "numberOfItemsToSpawn"],
        0,
    );
    if json > 0 {
        return json;
    }
    builder_default.max(1)
}

/// Merged keys, then secondaries (last first, overrides before
/// properties), then params, then `true`.
pub fn resolve_destroy_on_hit(
    merged: &SettingsMap,
    secondaries: &[SecondarySettings],
    params: &ItemParams,
) -> bool {
    if let Some(explicit) = normalize::explicit_bool(Some(merged), &DESTROY_ON_HIT_KEYS) {
        return explicit;
    }
    for secondary in secondaries.iter().rev() {
        for source in [&secondary.overrides, &secondary.properties] {
            if let Some(explicit) = normalize::explicit_bool(Some(source), &DESTROY_ON_HIT_KEYS) {
                return explicit;
            }
        }
    }
    params.projectile_destroy_on_hit.unwrap_or(true)
}

/// Explicit `direction` (or params), else the root's world right.
/// The flag defers the choice to the runtime nearest-mob resolver.
pub fn resolve_direction(settings: &SettingsMap, params: &ItemParams, root_right: Vec2) -> (Vec2, bool) {
    let from_resolver = normalize::bool(Some(settings), &["directionFromResolver"], false);
    let explicit = normalize::explicit_vec2(Some(settings), &["direction", "dir"])
        .or_else(|| params.direction.map(|(x, y)| Vec2::new(x, y)))
        .and_then(|d| d.try_normalize());
    let direction = explicit
        .or_else(|| root_right.try_normalize())
        .unwrap_or(Vec2::X);
    (direction, from_resolver)
}

/// Everything a builder decided for one item, kept on the root so spawners
/// can build more children later.
#[derive(Component, Debug, Clone)]
pub struct BuildPlan {
    pub kind: MechanicKind,
    pub instruction: ItemInstruction,
    pub params: ItemParams,
    /// Effective settings after merging and gap filling.
    pub settings: SettingsMap,
    pub count: u32,
    pub cadence: SpawnCadence,
    pub movement: MovementMode,
    pub direction: Vec2,
    pub direction_from_resolver: bool,
    pub destroy_on_hit: bool,
    /// Children built so far, recycled ones included once.
    pub spawned: u32,
}
