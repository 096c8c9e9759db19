//! The data shipped under `assets/data` parses and builds.

mod common;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::fs;
use std::path::PathBuf;

use common::*;
use item_forge::catalog::{ForgeConfig, ItemPresets, MechanicDefinitions, MechanicKind};
use item_forge::rendering::VisualConfig;
use item_forge::ItemForgePlugin;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/data")
}

fn json_files() -> usize {
    fs::read_dir(data_dir().join("mechanics"))
        .unwrap()
        .flatten()
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
        .count()
}

#[test]
fn every_mechanic_file_loads() {
    let mut definitions = MechanicDefinitions::empty();
    let loaded = definitions.load_from_dir(&data_dir().join("mechanics")).unwrap();
    assert_eq!(loaded, json_files());
    for kind in MechanicKind::ALL {
        assert!(definitions.contains(kind.name()), "no file for {kind}");
    }
}

#[test]
fn forge_config_names_existing_presets() {
    let config = ForgeConfig::load(&data_dir().join("forge.ron")).unwrap();
    let mut presets = ItemPresets::default();
    presets.load_from_dir(&data_dir().join("items")).unwrap();

    assert!(!config.starting_items.is_empty());
    for name in &config.starting_items {
        assert!(presets.get(name).is_some(), "unknown starting item {name}");
    }
}

#[test]
fn rendering_config_parses() {
    let contents = fs::read_to_string(data_dir().join("rendering.ron")).unwrap();
    let config: VisualConfig = ron::from_str(&contents).unwrap();
    assert!(config.arc_resolution > 0);
}

#[test]
fn every_preset_builds_from_disk_data() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((TransformPlugin, HierarchyPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .add_plugins(ItemForgePlugin {
            data_dir: Some(data_dir()),
        });
    app.update();

    let presets = app.world().resource::<ItemPresets>().clone();
    assert!(presets.len() >= 10);
    let player = spawn_player(&mut app, Vec2::ZERO);

    let config = app.world().resource::<ForgeConfig>().clone();
    let mut names: Vec<String> = config.starting_items.clone();
    names.extend(
        ["homing_bolts", "bouncing_bolt", "smite", "blade_ring", "lance", "pulse", "seeding_bolts"]
            .map(String::from),
    );
    for name in names {
        let preset = presets.get(&name).unwrap_or_else(|| panic!("missing preset {name}"));
        let root = create(&mut app, &preset.instruction, &preset.params, player)
            .unwrap_or_else(|| panic!("{name} built nothing"));
        assert!(!sub_items(&mut app, root).is_empty(), "{name} has no children");
    }

    run_frames(&mut app, 8);
}
