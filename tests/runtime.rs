//! Runtime behavior: spawners, shutdown, spawn rules and ticking mechanics.

mod common;

use bevy::prelude::*;
use std::f32::consts::TAU;
use bevy_rapier2d::prelude::Velocity;
use serde_json::json;

use common::*;
use item_forge::catalog::ForgeConfig;
use item_forge::combat::Health;
use item_forge::core::{GameOverEvent, ShutdownToken};
use item_forge::generator::{
    ItemGenerator, ItemInstruction, ItemParams, ItemRoot, SpawnDepth, SpawnItemRequest, SubItem,
};
use item_forge::mechanics::{
    DrainReport, Mechanic, OrbitMechanic, ProjectileMechanic, SequenceSpawner, SpawnRule, SpawnTrigger,
    StrikeMechanic,
};
use item_forge::modifiers::DrainModifier;

fn roots_at_depth(app: &mut App, depth: u32) -> usize {
    let mut roots = app.world_mut().query::<(&ItemRoot, &SpawnDepth)>();
    roots
        .iter(app.world())
        .filter(|(_, d)| d.0 == depth)
        .count()
}

#[test]
fn interval_spawner_spawns_then_recycles_at_cap() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    define(
        &mut app,
        "Projectile",
        json!({
            "speed": 0.0,
            "lifetime": 0.0,
            "spawnBehavior": "interval",
            "interval": 0.5,
            "childrenToSpawn": 2,
            "maxAlive": 3
        }),
    );
    let root = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    assert!(sub_items(&mut app, root).is_empty());

    run_frames(&mut app, 4);
    let first_wave = sub_items(&mut app, root);
    assert_eq!(first_wave.len(), 2);
    let oldest = first_wave[0];

    run_frames(&mut app, 4);
    let alive = sub_items(&mut app, root);
    assert_eq!(alive.len(), 3, "pool cap holds");
    assert!(alive.contains(&oldest), "oldest child was reused, not despawned");

    let indices: Vec<u32> = alive
        .iter()
        .map(|e| app.world().get::<SubItem>(*e).unwrap().index)
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
    // Recycling resets the projectile; it has only aged one frame since
    let age = |e: Entity| app.world().get::<ProjectileMechanic>(e).unwrap().age;
    assert!(age(oldest) <= STEP.as_secs_f32() + 1e-4, "age {}", age(oldest));
    assert!(age(first_wave[1]) > age(oldest));
}

#[test]
fn game_over_stops_everything() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let bolt = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    let child = sub_items(&mut app, bolt)[0];

    app.update();
    let moving = app.world().get::<Velocity>(child).unwrap().linvel;
    assert!(moving.length() > 0.0);

    app.world_mut().send_event(GameOverEvent);
    app.update();

    assert!(app.world().resource::<ShutdownToken>().is_cancelled());
    let projectile = app.world().get::<ProjectileMechanic>(child).unwrap();
    assert!(projectile.lifecycle().is_stopped());
    assert_eq!(app.world().get::<Velocity>(child).unwrap().linvel, Vec2::ZERO);

    run_frames(&mut app, 4);
    assert_eq!(app.world().get::<Velocity>(child).unwrap().linvel, Vec2::ZERO);

    // Items built after shutdown never start
    let late = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    let late_child = sub_items(&mut app, late)[0];
    assert!(app
        .world()
        .get::<ProjectileMechanic>(late_child)
        .unwrap()
        .lifecycle()
        .is_stopped());
}

#[test]
fn projectiles_expire_after_their_lifetime() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    tweak(&mut app, "Projectile", "lifetime", 0.5.into());
    let root = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    let child = sub_items(&mut app, root)[0];

    run_frames(&mut app, 2);
    assert!(exists(&app, child));
    run_frames(&mut app, 6);
    assert!(!exists(&app, child));
}

fn contact_rule(primary: &str, spawn_once: bool) -> SpawnRule {
    SpawnRule {
        trigger: SpawnTrigger::MobContact,
        primary: primary.to_string(),
        spawn_once,
        ..Default::default()
    }
}

#[test]
fn contact_rule_spawns_once() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let mob = spawn_mob(&mut app, Vec2::new(2.0, 0.0), 50.0);
    let params = ItemParams {
        condition_rules: vec![contact_rule("Strike", true)],
        ..Default::default()
    };
    let root = create(&mut app, &ItemInstruction::new("SubItemsOnCondition"), &params, player).unwrap();
    let sensor = sub_items(&mut app, root)[0];
    app.update();

    touch(&mut app, sensor, mob);
    run_frames(&mut app, 2);
    assert_eq!(roots_at_depth(&mut app, 1), 1);

    touch(&mut app, sensor, mob);
    run_frames(&mut app, 2);
    assert_eq!(roots_at_depth(&mut app, 1), 1, "spawnOnce rule fired twice");
}

#[test]
fn contact_rule_respects_depth_cap() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let mob = spawn_mob(&mut app, Vec2::new(2.0, 0.0), 50.0);
    let max = app.world().resource::<ForgeConfig>().max_spawn_depth;
    let params = ItemParams {
        condition_rules: vec![contact_rule("Strike", false)],
        spawn_depth: max,
        ..Default::default()
    };
    let root = create(&mut app, &ItemInstruction::new("SubItemsOnCondition"), &params, player).unwrap();
    let sensor = sub_items(&mut app, root)[0];
    app.update();

    touch(&mut app, sensor, mob);
    run_frames(&mut app, 2);
    assert_eq!(roots_at_depth(&mut app, max + 1), 0);
}

#[test]
fn spawn_requests_are_built_at_their_position() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let mob = spawn_mob(&mut app, Vec2::new(4.0, 0.0), 50.0);

    app.world_mut().send_event(SpawnItemRequest {
        instruction: ItemInstruction::new("Aura"),
        params: ItemParams {
            spawn_depth: 1,
            ..Default::default()
        },
        position: Vec2::new(4.0, 1.0),
        owner: Some(player),
        target: Some(mob),
    });
    app.update();

    let mut roots = app.world_mut().query::<(&ItemRoot, &Transform)>();
    let spawned: Vec<(ItemRoot, Vec2)> = roots
        .iter(app.world())
        .map(|(root, transform)| (*root, transform.translation.truncate()))
        .collect();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].0.owner, player);
    assert_eq!(spawned[0].0.target, Some(mob));
    assert_eq!(spawned[0].1, Vec2::new(4.0, 1.0));
}

#[test]
fn strike_hits_a_mob_in_range() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let mob = spawn_mob(&mut app, Vec2::new(3.0, 0.0), 100.0);
    let far = spawn_mob(&mut app, Vec2::new(50.0, 0.0), 100.0);
    let root = create(&mut app, &ItemInstruction::new("Strike"), &ItemParams::default(), player).unwrap();
    let child = sub_items(&mut app, root)[0];

    run_frames(&mut app, 24);

    assert!(health(&app, mob) < 100.0);
    assert_eq!(health(&app, far), 100.0, "out of range");
    assert_eq!(health(&app, player), 100.0, "owner is never struck");
    assert!(app.world().get::<StrikeMechanic>(child).unwrap().strikes >= 1);
}

#[test]
fn changing_strike_damage_keeps_its_interval_progress() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    tweak(&mut app, "Strike", "interval", 2.0.into());
    let root = create(&mut app, &ItemInstruction::new("Strike"), &ItemParams::default(), player).unwrap();
    let child = sub_items(&mut app, root)[0];
    run_frames(&mut app, 5);
    let before = app.world().get::<StrikeMechanic>(child).unwrap().timer.elapsed();
    assert!(before > std::time::Duration::ZERO);

    let changed = ItemGenerator::new(app.world_mut()).set_existing_mechanic_setting(
        child,
        "Strike",
        "damage",
        25.into(),
    );
    assert!(changed);

    let strike = app.world().get::<StrikeMechanic>(child).unwrap();
    assert_eq!(strike.rules.damage, 25.0);
    assert_eq!(strike.timer.elapsed(), before);
    assert_eq!(strike.timer.duration().as_secs_f32(), 2.0);
}

#[test]
fn drain_heals_the_owner() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    app.world_mut().get_mut::<Health>(player).unwrap().current = 50.0;
    let instruction = ItemInstruction::new("Aura").with_secondary("Drain");
    let root = create(&mut app, &instruction, &ItemParams::default(), player).unwrap();
    let aura = sub_items(&mut app, root)[0];
    assert!(app.world().get::<DrainModifier>(aura).is_some());

    app.world_mut().send_event(DrainReport {
        source: aura,
        owner: player,
        total: 20.0,
    });
    app.update();

    assert_eq!(health(&app, player), 55.0);
    assert_eq!(app.world().get::<DrainModifier>(aura).unwrap().total_healed, 5.0);
}

#[test]
fn sequence_cadence_staggers_its_children() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    tweak(&mut app, "Projectile", "spawnBehavior", "sequence".into());
    tweak(&mut app, "Projectile", "sequenceSpacing", 0.25.into());
    tweak(&mut app, "Projectile", "childrenToSpawn", 3.into());
    tweak(&mut app, "Projectile", "lifetime", 30.0.into());

    let root = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    assert!(app.world().get::<SequenceSpawner>(root).is_some());
    assert!(sub_items(&mut app, root).is_empty());

    run_frames(&mut app, 1);
    assert_eq!(sub_items(&mut app, root).len(), 1);

    run_frames(&mut app, 3);
    assert_eq!(sub_items(&mut app, root).len(), 3);
    assert!(app.world().get::<SequenceSpawner>(root).unwrap().finished());

    run_frames(&mut app, 8);
    assert_eq!(sub_items(&mut app, root).len(), 3);
}

#[test]
fn orbiters_respace_when_one_is_removed() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let instruction = ItemInstruction::new("Projectile").with_secondary("Orbit");
    let params = ItemParams::default().with_count(4).with_orbit(2.0, 90.0);
    let root = create(&mut app, &instruction, &params, player).unwrap();
    run_frames(&mut app, 2);

    let children = sub_items(&mut app, root);
    app.world_mut().entity_mut(children[1]).despawn_recursive();
    run_frames(&mut app, 2);

    let mut angles: Vec<f32> = sub_items(&mut app, root)
        .iter()
        .map(|child| app.world().get::<OrbitMechanic>(*child).unwrap().angle)
        .collect();
    assert_eq!(angles.len(), 3);
    angles.sort_by(f32::total_cmp);
    let gaps = [angles[1] - angles[0], angles[2] - angles[1], angles[0] + TAU - angles[2]];
    for gap in gaps {
        assert!((gap.to_degrees() - 120.0).abs() < 0.5, "{angles:?}");
    }
}
