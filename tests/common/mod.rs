//! Shared headless harness for the integration tests.
#![allow(dead_code)]

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::CollisionEvent;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use serde_json::Value;
use std::time::Duration;

use item_forge::catalog::MechanicDefinitions;
use item_forge::combat::{Health, Mob, Tags};
use item_forge::generator::{ItemGenerator, ItemInstruction, ItemParams};
use item_forge::settings::{set_setting, settings_from_json, SettingValue};
use item_forge::ItemForgePlugin;

/// Frame length used by every test app. Exact in binary so timers add up.
pub const STEP: Duration = Duration::from_millis(125);

/// Headless app with built-in definitions only. Startup has already run.
pub fn forge_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((TransformPlugin, HierarchyPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .add_plugins(ItemForgePlugin::headless());
    app.update();
    app
}

pub fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Name::new("Player"),
            Health::new(100.0),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

pub fn spawn_mob(app: &mut App, position: Vec2, health: f32) -> Entity {
    app.world_mut()
        .spawn((
            Name::new("Mob"),
            Mob,
            Health::new(health),
            Tags(vec!["mob".to_string()]),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

/// Replace one built-in definition.
pub fn define(app: &mut App, name: &str, document: Value) {
    app.world_mut()
        .resource_mut::<MechanicDefinitions>()
        .insert(name, settings_from_json(&document));
}

/// Change one key of an existing definition.
pub fn tweak(app: &mut App, name: &str, key: &str, value: SettingValue) {
    let mut definitions = app.world_mut().resource_mut::<MechanicDefinitions>();
    let mut settings = definitions.get(name).cloned().unwrap_or_default();
    set_setting(&mut settings, key, value);
    definitions.insert(name, settings);
}

pub fn create(app: &mut App, instruction: &ItemInstruction, params: &ItemParams, owner: Entity) -> Option<Entity> {
    ItemGenerator::new(app.world_mut()).create(instruction, params, owner)
}

pub fn sub_items(app: &mut App, root: Entity) -> Vec<Entity> {
    ItemGenerator::new(app.world_mut()).sub_items_of(root)
}

/// Pretend rapier reported a sensor contact between `a` and `b`.
pub fn touch(app: &mut App, a: Entity, b: Entity) {
    app.world_mut()
        .send_event(CollisionEvent::Started(a, b, CollisionEventFlags::SENSOR));
}

pub fn run_frames(app: &mut App, frames: u32) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn health(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<Health>(entity)
        .map(|h| h.current)
        .unwrap_or(f32::NAN)
}

pub fn exists(app: &App, entity: Entity) -> bool {
    app.world().get_entity(entity).is_ok()
}
