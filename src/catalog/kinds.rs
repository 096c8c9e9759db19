//! The fixed set of primary mechanic kinds.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::settings::normalize::normalize_key;

/// What an item fundamentally is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanicKind {
    Projectile,
    Aura,
    Strike,
    Whip,
    Ripple,
    SwordSlash,
    Beam,
    SubItemsOnCondition,
}

impl MechanicKind {
    pub const ALL: [MechanicKind; 8] = [
        MechanicKind::Projectile,
        MechanicKind::Aura,
        MechanicKind::Strike,
        MechanicKind::Whip,
        MechanicKind::Ripple,
        MechanicKind::SwordSlash,
        MechanicKind::Beam,
        MechanicKind::SubItemsOnCondition,
    ];

    /// Canonical mechanic name, also the definition file stem.
    pub fn name(&self) -> &'static str {
        match self {
            MechanicKind::Projectile => "Projectile",
            MechanicKind::Aura => "Aura",
            MechanicKind::Strike => "Strike",
            MechanicKind::Whip => "Whip",
            MechanicKind::Ripple => "Ripple",
            MechanicKind::SwordSlash => "SwordSlash",
            MechanicKind::Beam => "Beam",
            MechanicKind::SubItemsOnCondition => "SubItemsOnCondition",
        }
    }

    /// Case/underscore-insensitive lookup with a few legacy aliases.
    pub fn parse(name: &str) -> Option<Self> {
        let key = normalize_key(name);
        let kind = match key.as_str() {
            "projectile" | "bullet" => MechanicKind::Projectile,
            "aura" => MechanicKind::Aura,
            "strike" | "lightningstrike" => MechanicKind::Strike,
            "whip" => MechanicKind::Whip,
            "ripple" => MechanicKind::Ripple,
            "swordslash" | "slash" => MechanicKind::SwordSlash,
            "beam" | "laser" => MechanicKind::Beam,
            "subitemsoncondition" | "spawnoncondition" | "subitems" => {
                MechanicKind::SubItemsOnCondition
            }
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for MechanicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MechanicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown primary mechanic '{s}'"))
    }
}

/// The primary kind a sub-item was built as. Compatibility checks read this.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryKind(pub MechanicKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_tolerates_case_and_separators() {
        assert_eq!(MechanicKind::parse("sword_slash"), Some(MechanicKind::SwordSlash));
        assert_eq!(MechanicKind::parse("PROJECTILE"), Some(MechanicKind::Projectile));
        assert_eq!(
            "SubItemsOnCondition".parse::<MechanicKind>(),
            Ok(MechanicKind::SubItemsOnCondition)
        );
        assert!(MechanicKind::parse("Orbit").is_none());
    }

    #[test]
    fn canonical_names_round_trip() {
        for kind in MechanicKind::ALL {
            assert_eq!(MechanicKind::parse(kind.name()), Some(kind));
        }
    }
}
