//! Catalog plugin - mechanic table, definitions, presets and config.

use bevy::prelude::*;

use super::definitions::{load_mechanic_definitions, MechanicDefinitions};
use super::presets::{
    load_forge_config, load_item_presets, seed_rng_from_config, DataPaths, ForgeConfig, ItemPresets,
};
use super::registry::MechanicCatalog;

/// Catalog plugin - handles data loading for everything the generator reads.
///
/// Without a data directory nothing is read from disk and the built-in
/// definitions are used as-is.
pub struct CatalogPlugin {
    pub paths: DataPaths,
}

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.paths.clone())
            .init_resource::<MechanicCatalog>()
            .init_resource::<MechanicDefinitions>()
            .init_resource::<ItemPresets>()
            .init_resource::<ForgeConfig>();

        if self.paths.root.is_some() {
            app.add_systems(
                PreStartup,
                (
                    load_forge_config,
                    seed_rng_from_config,
                    load_mechanic_definitions,
                    load_item_presets,
                )
                    .chain(),
            );
        }
    }
}
