//! Item Forge - procedural item composition for a 2D action game in Bevy.
//!
//! An item is one primary mechanic (projectile, aura, beam, strike, whip,
//! ripple, sword slash) plus an ordered list of secondary modifiers (orbit,
//! lock-on, bounce, damage over time, explosion, ...). The generator turns an
//! `ItemInstruction` into a root entity with N sub-items, each carrying the
//! merged settings and attached mechanics.
//!
//! # Architecture
//!
//! - **Core**: Frame ordering, global events, shutdown token
//! - **Combat**: Health, damage application, mob targeting
//! - **Catalog**: Mechanic table, JSON definitions, RON presets and config
//! - **Settings**: Key normalization and settings merge rules
//! - **Mechanics**: Primary mechanics, spawners, movement
//! - **Modifiers**: Secondary modifiers and how they attach
//! - **Hits**: Trigger contacts and hit-modifier dispatch
//! - **Builders**: Per-primary build plans
//! - **Generator**: `ItemGenerator` and the spawn request queue
//! - **Network**: Position mirroring and server-side spawns
//! - **Rendering**: Meshes and gizmo overlays (windowed apps only)

pub mod builders;
pub mod catalog;
pub mod combat;
pub mod core;
pub mod generator;
pub mod hits;
pub mod mechanics;
pub mod modifiers;
pub mod network;
pub mod rendering;
pub mod settings;

use bevy::prelude::*;
use std::path::PathBuf;

/// Main plugin that adds every gameplay sub-plugin.
///
/// Physics and rendering are left to the app so the same plugin runs
/// headless in tests.
pub struct ItemForgePlugin {
    /// Directory with `forge.ron`, `mechanics/` and `items/`.
    pub data_dir: Option<PathBuf>,
}

impl Default for ItemForgePlugin {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("assets/data")),
        }
    }
}

impl ItemForgePlugin {
    /// Built-in definitions only, nothing read from disk.
    pub fn headless() -> Self {
        Self { data_dir: None }
    }
}

impl Plugin for ItemForgePlugin {
    fn build(&self, app: &mut App) {
        let paths = catalog::DataPaths {
            root: self.data_dir.clone(),
        };
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            .add_plugins(combat::CombatPlugin)
            .add_plugins(catalog::CatalogPlugin { paths })

            // Mechanic registration
            .add_plugins(mechanics::MechanicsPlugin)
            .add_plugins(modifiers::ModifiersPlugin)

            // Runtime
            .add_plugins(hits::HitsPlugin)
            .add_plugins(generator::GeneratorPlugin)
            .add_plugins(network::NetworkPlugin::default());
    }
}
