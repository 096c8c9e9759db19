//! Item Forge - Sandbox
//!
//! Equips the configured starting items on a stationary player and asks the
//! (offline) server for mobs to test them against.
//!
//! Controls:
//! - Space: Request a mob wave
//! - Escape: Game over (stops every mechanic)

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;
use std::path::PathBuf;

use item_forge::catalog::{ForgeConfig, ItemPresets};
use item_forge::combat::{Health, Mob, Tags, TargetingRng};
use item_forge::core::{DeathEvent, GameOverEvent, MechanicSet, PendingDespawn};
use item_forge::generator::ItemGenerator;
use item_forge::network::{LocalPlayer, NetworkSpawnConfirmed, NetworkSpawnRequest, RemotePlayer};
use item_forge::rendering::{RenderingPlugin, VisualSpec};
use item_forge::ItemForgePlugin;

const DATA_DIR: &str = "assets/data";
const WAVE_SIZE: u32 = 6;
const WAVE_DISTANCE: f32 = 7.0;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Item Forge".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))

        // Physics (collision events only, every body is kinematic)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())

        // Forge and its visuals
        .add_plugins(ItemForgePlugin {
            data_dir: Some(PathBuf::from(DATA_DIR)),
        })
        .add_plugins(RenderingPlugin {
            data_dir: Some(PathBuf::from(DATA_DIR)),
        })

        .add_systems(Startup, (setup_scene, equip_starting_items).chain())
        .add_systems(
            Update,
            (
                request_waves,
                spawn_confirmed_mobs,
                show_remote_players,
                handle_deaths.in_set(MechanicSet::Cleanup),
            ),
        )
        .run();
}

fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: 1.0 / 48.0,
            ..OrthographicProjection::default_2d()
        },
    ));

    commands.spawn((
        Name::new("Player"),
        LocalPlayer,
        Health::new(100.0),
        Tags(vec!["player".to_string()]),
        VisualSpec::circle(0.4, Color::srgb(0.9, 0.9, 0.95)),
        Transform::default(),
        Visibility::default(),
        Collider::ball(0.4),
    ));
}

/// Build every preset named in `forge.ron` on the player.
fn equip_starting_items(world: &mut World) {
    let mut players = world.query_filtered::<Entity, With<LocalPlayer>>();
    let Some(player) = players.iter(world).next() else {
        warn!("No player to equip");
        return;
    };
    let starting = world.resource::<ForgeConfig>().starting_items.clone();
    let presets = world.resource::<ItemPresets>().clone();

    let mut generator = ItemGenerator::new(world);
    for name in &starting {
        let Some(preset) = presets.get(name) else {
            warn!("Unknown starting item '{}'", name);
            continue;
        };
        match generator.create(&preset.instruction, &preset.params, player) {
            Some(root) => info!("Equipped '{}' ({:?})", name, root),
            None => warn!("Could not build starting item '{}'", name),
        }
    }
}

fn request_waves(
    keys: Res<ButtonInput<KeyCode>>,
    mut rng: ResMut<TargetingRng>,
    mut requests: EventWriter<NetworkSpawnRequest>,
    mut game_over: EventWriter<GameOverEvent>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        game_over.send(GameOverEvent);
    }
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    for i in 0..WAVE_SIZE {
        let angle = TAU * i as f32 / WAVE_SIZE as f32 + rng.0.gen_range(-0.3..0.3);
        requests.send(NetworkSpawnRequest {
            position: Vec2::from_angle(angle) * WAVE_DISTANCE,
            radius: rng.0.gen_range(0.3..0.6),
        });
    }
}

fn spawn_confirmed_mobs(mut commands: Commands, mut confirmed: EventReader<NetworkSpawnConfirmed>) {
    for spawn in confirmed.read() {
        commands.spawn((
            Name::new(format!("Mob:{}", spawn.spawn_id)),
            Mob,
            Health::new(60.0),
            Tags(vec!["mob".to_string()]),
            VisualSpec::circle(spawn.radius, Color::srgb(0.85, 0.25, 0.3)),
            Transform::from_translation(spawn.position.extend(0.0)),
            Visibility::default(),
            Collider::ball(spawn.radius),
        ));
    }
}

fn show_remote_players(mut commands: Commands, added: Query<Entity, Added<RemotePlayer>>) {
    for entity in added.iter() {
        commands
            .entity(entity)
            .insert((Visibility::default(), VisualSpec::circle(0.4, Color::srgb(0.4, 0.7, 1.0))));
    }
}

fn handle_deaths(
    mut commands: Commands,
    mut deaths: EventReader<DeathEvent>,
    mobs: Query<(), With<Mob>>,
    players: Query<(), With<LocalPlayer>>,
    mut game_over: EventWriter<GameOverEvent>,
) {
    for death in deaths.read() {
        if mobs.contains(death.entity) {
            commands.entity(death.entity).insert(PendingDespawn);
        } else if players.contains(death.entity) {
            game_over.send(GameOverEvent);
        }
    }
}
