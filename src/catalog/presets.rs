//! Forge configuration and named item presets (RON).

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::DataLoadError;
use crate::combat::TargetingRng;
use crate::generator::{ItemInstruction, ItemParams};

/// Where data files live. `None` means headless: built-in defaults only.
#[derive(Resource, Debug, Clone, Default)]
pub struct DataPaths {
    pub root: Option<PathBuf>,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn mechanics_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("mechanics"))
    }

    pub fn items_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("items"))
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("forge.ron"))
    }
}

fn default_max_spawn_depth() -> u32 {
    4
}

fn default_rng_seed() -> u64 {
    42
}

/// Global generator settings from `forge.ron`.
#[derive(Resource, Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    /// Generator-level child count, used when params leave it unset (0 = off).
    #[serde(default)]
    pub child_count_override: u32,
    /// Rule-triggered spawns deeper than this are refused.
    #[serde(default = "default_max_spawn_depth")]
    pub max_spawn_depth: u32,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
    /// Preset names the sandbox equips on the player.
    #[serde(default)]
    pub starting_items: Vec<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            child_count_override: 0,
            max_spawn_depth: default_max_spawn_depth(),
            debug_logging: false,
            rng_seed: default_rng_seed(),
            starting_items: Vec::new(),
        }
    }
}

impl ForgeConfig {
    pub fn parse(path: &str, contents: &str) -> Result<Self, DataLoadError> {
        ron::from_str(contents).map_err(|e| DataLoadError::RonError {
            path: path.to_string(),
            details: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(DataLoadError::FileNotFound(display));
        }
        let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
            path: display.clone(),
            details: e.to_string(),
        })?;
        Self::parse(&display, &contents)
    }
}

/// A named, ready-to-spawn item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPreset {
    pub instruction: ItemInstruction,
    #[serde(default)]
    pub params: ItemParams,
}

/// One preset file may hold several items.
#[derive(Debug, Clone, Deserialize)]
struct ItemPresetFile {
    items: HashMap<String, ItemPreset>,
}

/// All loaded presets by name.
#[derive(Resource, Debug, Clone, Default)]
pub struct ItemPresets {
    presets: HashMap<String, ItemPreset>,
}

impl ItemPresets {
    pub fn get(&self, name: &str) -> Option<&ItemPreset> {
        self.presets.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, preset: ItemPreset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Parse a preset file, returning how many presets it added.
    pub fn load_str(&mut self, path: &str, contents: &str) -> Result<usize, DataLoadError> {
        let file: ItemPresetFile = ron::from_str(contents).map_err(|e| DataLoadError::RonError {
            path: path.to_string(),
            details: e.to_string(),
        })?;
        let count = file.items.len();
        self.presets.extend(file.items);
        Ok(count)
    }

    pub fn load_from_dir(&mut self, dir: &Path) -> Result<usize, DataLoadError> {
        if !dir.exists() {
            return Err(DataLoadError::FileNotFound(dir.display().to_string()));
        }
        let entries = fs::read_dir(dir).map_err(|e| DataLoadError::ReadError {
            path: dir.display().to_string(),
            details: e.to_string(),
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "ron") {
                continue;
            }
            let display = path.display().to_string();
            match fs::read_to_string(&path) {
                Ok(contents) => match self.load_str(&display, &contents) {
                    Ok(count) => loaded += count,
                    Err(e) => warn!("{}", e),
                },
                Err(e) => error!("Failed to read item preset file {:?}: {}", path, e),
            }
        }
        Ok(loaded)
    }
}

/// Startup system: replace the default config with `forge.ron` if present.
pub fn load_forge_config(mut commands: Commands, paths: Res<DataPaths>) {
    let Some(path) = paths.config_file() else {
        return;
    };
    match ForgeConfig::load(&path) {
        Ok(config) => {
            info!(
                "Loaded forge config (max spawn depth {}, {} starting items)",
                config.max_spawn_depth,
                config.starting_items.len()
            );
            commands.insert_resource(config);
        }
        Err(e) => warn!("{}, using default forge config", e),
    }
}

/// Reseed targeting so a configured seed gives reproducible runs.
pub fn seed_rng_from_config(config: Res<ForgeConfig>, mut rng: ResMut<TargetingRng>) {
    *rng = TargetingRng::seeded(config.rng_seed);
}

/// Startup system loading every preset file.
pub fn load_item_presets(mut presets: ResMut<ItemPresets>, paths: Res<DataPaths>) {
    let Some(dir) = paths.items_dir() else {
        return;
    };
    match presets.load_from_dir(&dir) {
        Ok(count) => info!("Loaded {} item presets", count),
        Err(e) => warn!("{}, no item presets available", e),
    }
}
