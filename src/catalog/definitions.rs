//! Default settings per mechanic name.
//!
//! Built-in defaults are compiled in so a headless app works with no files on
//! disk. JSON files under `assets/data/mechanics/` overlay them, one file per
//! mechanic, named after the mechanic (`projectile.json`, `orbit.json`, ...).

use bevy::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::DataLoadError;
use super::presets::DataPaths;
use crate::settings::normalize::normalize_key;
use crate::settings::{settings_from_json, SettingsMap};

#[derive(Debug, Clone)]
struct Definition {
    name: String,
    settings: SettingsMap,
}

/// Resource holding every known mechanic definition.
#[derive(Resource, Debug, Clone)]
pub struct MechanicDefinitions {
    definitions: HashMap<String, Definition>,
}

impl Default for MechanicDefinitions {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MechanicDefinitions {
    /// An empty table, mostly for tests.
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// The defaults shipped with the crate.
    pub fn builtin() -> Self {
        let mut definitions = Self::empty();
        for (name, document) in builtin_documents() {
            definitions.insert(name, settings_from_json(&document));
        }
        definitions
    }

    /// Insert or replace a definition. Names are matched alias-tolerantly.
    pub fn insert(&mut self, name: &str, settings: SettingsMap) {
        self.definitions.insert(
            normalize_key(name),
            Definition {
                name: name.to_string(),
                settings,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&SettingsMap> {
        self.definitions
            .get(&normalize_key(name))
            .map(|definition| &definition.settings)
    }

    /// Cloned settings for a mechanic, or an empty map with a warning.
    pub fn settings_for(&self, name: &str) -> SettingsMap {
        match self.get(name) {
            Some(settings) => settings.clone(),
            None => {
                warn!("No settings definition for mechanic '{}', using defaults", name);
                SettingsMap::new()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(&normalize_key(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.values().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parse one definition document.
    pub fn parse_definition(path: &str, contents: &str) -> Result<SettingsMap, DataLoadError> {
        let document: Value = serde_json::from_str(contents).map_err(|e| DataLoadError::JsonError {
            path: path.to_string(),
            details: e.to_string(),
        })?;
        if !document.is_object() {
            return Err(DataLoadError::NotAnObject {
                path: path.to_string(),
            });
        }
        Ok(settings_from_json(&document))
    }

    /// Overlay every `*.json` file in `dir`. Bad files are logged and skipped.
    ///
    /// Returns how many definitions were loaded.
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
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let display = path.display().to_string();

            let result = fs::read_to_string(&path)
                .map_err(|e| DataLoadError::ReadError {
                    path: display.clone(),
                    details: e.to_string(),
                })
                .and_then(|contents| Self::parse_definition(&display, &contents));

            match result {
                Ok(settings) => {
                    debug!("Loaded mechanic definition '{}' ({} keys)", name, settings.len());
                    self.insert(name, settings);
                    loaded += 1;
                }
                Err(e) => warn!("{}", e),
            }
        }
        Ok(loaded)
    }
}

/// Startup system overlaying definitions from disk.
pub fn load_mechanic_definitions(mut definitions: ResMut<MechanicDefinitions>, paths: Res<DataPaths>) {
    let Some(dir) = paths.mechanics_dir() else {
        return;
    };
    match definitions.load_from_dir(&dir) {
        Ok(count) => info!(
            "Loaded {} mechanic definitions from {:?} ({} total)",
            count,
            dir,
            definitions.len()
        ),
        Err(e) => warn!("{}, using built-in mechanic definitions", e),
    }
}

fn builtin_documents() -> Vec<(&'static str, Value)> {
    vec![
        (
            "Projectile",
            json!({
                "speed": 6.0,
                "damage": 10.0,
                "radius": 0.25,
                "lifetime": 4.0,
                "requireMobTag": true,
                "excludeOwner": true,
                "childrenToSpawn": 1,
                "spawnBehavior": "static",
                "spriteType": "circle",
                "spriteColor": "#ffd24a"
            }),
        ),
        (
            "Orbit",
            json!({
                "radius": 1.5,
                "angularSpeedDeg": 120.0,
                "pathId": "circular",
                "startAngleDeg": 0.0,
                "overrides": { "radius": 1.5, "disableSelfSpeed": true }
            }),
        ),
        (
            "Aura",
            json!({
                "radius": 2.0,
                "damage": 4.0,
                "interval": 0.5,
                "requireMobTag": true,
                "excludeOwner": true,
                "centerOn": "owner",
                "showVisual": true,
                "spriteType": "circle",
                "spriteColor": "#7fd4ff55"
            }),
        ),
        (
            "Strike",
            json!({
                "damage": 25.0,
                "interval": 1.2,
                "range": 12.0,
                "flashDuration": 0.15,
                "requireMobTag": true,
                "excludeOwner": true
            }),
        ),
        (
            "Whip",
            json!({
                "damage": 15.0,
                "innerRadius": 0.5,
                "outerRadius": 3.0,
                "arcDeg": 120.0,
                "windowDeg": 30.0,
                "drawDuration": 0.6,
                "hitMode": "collider",
                "pollInterval": 0.1,
                "rehitCooldown": 0.4,
                "visualMode": "edge",
                "requireMobTag": true,
                "excludeOwner": true
            }),
        ),
        (
            "Ripple",
            json!({
                "damage": 12.0,
                "startRadius": 0.2,
                "endRadius": 4.0,
                "thickness": 0.4,
                "growDuration": 0.8,
                "interval": 2.0,
                "repeat": true,
                "requireMobTag": true,
                "excludeOwner": true,
                "spriteColor": "#9fe8ff"
            }),
        ),
        (
            "SwordSlash",
            json!({
                "damage": 20.0,
                "radius": 2.0,
                "arcDeg": 90.0,
                "interval": 1.0,
                "slashDuration": 0.2,
                "requireMobTag": true,
                "excludeOwner": true,
                "spriteColor": "#e0e0ff"
            }),
        ),
        (
            "Beam",
            json!({
                "damage": 6.0,
                "length": 8.0,
                "width": 0.4,
                "interval": 0.25,
                "aimAtNearest": true,
                "requireMobTag": true,
                "excludeOwner": true,
                "spriteType": "square",
                "spriteColor": "#ff6060"
            }),
        ),
        (
            "SubItemsOnCondition",
            json!({
                "radius": 0.5,
                "rules": []
            }),
        ),
        (
            "Lock",
            json!({
                "turnRateDeg": 180.0,
                "range": 8.0,
                "retargetInterval": 0.5
            }),
        ),
        (
            "Bounce",
            json!({
                "maxBounces": 3,
                "speedMultiplier": 1.0,
                "searchRadius": 6.0
            }),
        ),
        (
            "DamageOverTime",
            json!({
                "damagePerTick": 2.0,
                "tickInterval": 0.5,
                "duration": 3.0
            }),
        ),
        (
            "Explosion",
            json!({
                "radius": 1.5,
                "damage": 8.0,
                "requireMobTag": true,
                "excludeOwner": true
            }),
        ),
        (
            "RippleOnHit",
            json!({
                "damage": 6.0,
                "endRadius": 2.5,
                "growDuration": 0.4,
                "thickness": 0.3
            }),
        ),
        (
            "Drain",
            json!({
                "fraction": 0.25
            }),
        ),
        (
            "DropMovement",
            json!({
                "gravity": 20.0,
                "dropDistance": 1.5,
                "scatter": 1.0
            }),
        ),
        (
            "ThrowMovement",
            json!({
                "speed": 8.0,
                "drag": 2.0,
                "alignToVelocity": true,
                "minSpeed": 0.2
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::normalize;

    #[test]
    fn builtins_cover_every_primary() {
        let definitions = MechanicDefinitions::builtin();
        for kind in crate::catalog::MechanicKind::ALL {
            assert!(definitions.contains(kind.name()), "missing {}", kind);
        }
    }

    #[test]
    fn lookup_is_alias_tolerant() {
        let definitions = MechanicDefinitions::builtin();
        let orbit = definitions.get("orbit").cloned();
        assert!(orbit.is_some());
        assert_eq!(
            normalize::float(orbit.as_ref(), &["angularSpeedDeg"], 0.0),
            120.0
        );
        assert!(definitions.get("sword_slash").is_some());
    }

    #[test]
    fn missing_definition_is_empty_not_an_error() {
        let definitions = MechanicDefinitions::empty();
        assert!(definitions.settings_for("Nope").is_empty());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = MechanicDefinitions::parse_definition("x.json", "[1, 2]");
        assert!(matches!(err, Err(DataLoadError::NotAnObject { .. })));
        let err = MechanicDefinitions::parse_definition("x.json", "{ nope");
        assert!(matches!(err, Err(DataLoadError::JsonError { .. })));
    }
}
