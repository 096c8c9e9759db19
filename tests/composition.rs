//! Composition: what the generator builds from an instruction.

mod common;

use bevy::prelude::*;
use serde_json::json;

use common::*;
use item_forge::builders::BuildPlan;
use item_forge::catalog::MechanicKind;
use item_forge::generator::{ItemInstruction, ItemParams, ItemRoot};
use item_forge::mechanics::{
    AttachedMechanics, IntervalSpawner, Mechanic, OrbitMechanic, ProjectileMechanic, StrikeMechanic,
    ThrowMovement,
};

fn attached(app: &App, entity: Entity) -> AttachedMechanics {
    app.world()
        .get::<AttachedMechanics>(entity)
        .cloned()
        .unwrap_or_default()
}

#[test]
fn every_primary_builds_the_configured_count() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);

    for kind in MechanicKind::ALL {
        tweak(&mut app, kind.name(), "childrenToSpawn", 3.into());
        let root = create(&mut app, &ItemInstruction::new(kind.name()), &ItemParams::default(), player)
            .unwrap_or_else(|| panic!("{kind} built nothing"));

        let children = sub_items(&mut app, root);
        assert_eq!(children.len(), 3, "{kind}");
        for child in children {
            let primaries = attached(&app, child)
                .iter()
                .filter(|name| name.eq_ignore_ascii_case(kind.name()))
                .count();
            assert_eq!(primaries, 1, "{kind} child {child:?}");
        }
    }
}

#[test]
fn projectile_orbit_scenario() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let instruction = ItemInstruction::new("Projectile").with_secondary("Orbit");
    let params = ItemParams::default().with_count(4).with_orbit(2.0, 90.0);

    let root = create(&mut app, &instruction, &params, player).unwrap();
    let children = sub_items(&mut app, root);
    assert_eq!(children.len(), 4);

    let mut starts = Vec::new();
    for child in &children {
        let world = app.world();
        let projectile = world.get::<ProjectileMechanic>(*child).unwrap();
        assert!(projectile.disable_self_speed);
        // Orbit's radius override must not reach the projectile collider
        assert_eq!(projectile.radius, 0.25);

        let orbit = world.get::<OrbitMechanic>(*child).unwrap();
        assert_eq!(orbit.radius, 2.0);
        assert_eq!(orbit.angular_speed_deg, 90.0);
        assert!(orbit.lifecycle().is_running());
        starts.push(orbit.start_angle_deg.round() as i32);

        let offset = world.get::<Transform>(*child).unwrap().translation.truncate();
        assert!((offset.length() - 2.0).abs() < 1e-3, "{offset:?}");
    }
    starts.sort();
    assert_eq!(starts, vec![0, 90, 180, 270]);
}

#[test]
fn orbiters_keep_their_spacing_while_moving() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let instruction = ItemInstruction::new("Projectile").with_secondary("Orbit");
    let params = ItemParams::default().with_count(3).with_orbit(2.0, 90.0);
    let root = create(&mut app, &instruction, &params, player).unwrap();

    run_frames(&mut app, 8);

    let mut angles: Vec<f32> = sub_items(&mut app, root)
        .iter()
        .map(|child| app.world().get::<OrbitMechanic>(*child).unwrap().angle.to_degrees())
        .collect();
    angles.sort_by(f32::total_cmp);
    for pair in angles.windows(2) {
        assert!((pair[1] - pair[0] - 120.0).abs() < 0.5, "{angles:?}");
    }
}

#[test]
fn strike_builds_one_child() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let root = create(&mut app, &ItemInstruction::new("Strike"), &ItemParams::default(), player).unwrap();

    let children = sub_items(&mut app, root);
    assert_eq!(children.len(), 1);
    assert_eq!(attached(&app, children[0]).0, vec![StrikeMechanic::NAME]);
    let strike = app.world().get::<StrikeMechanic>(children[0]).unwrap();
    assert!(strike.rules.require_mob_tag);
    assert!(strike.rules.exclude_owner);
}

#[test]
fn interval_cadence_puts_the_spawner_on_the_root() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    tweak(&mut app, "Projectile", "spawnBehavior", "interval".into());
    tweak(&mut app, "Projectile", "interval", 0.5.into());
    tweak(&mut app, "Projectile", "childrenToSpawn", 3.into());

    let root = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();

    let spawner = app.world().get::<IntervalSpawner>(root).unwrap();
    assert_eq!(spawner.count_per_interval, 3);
    assert_eq!(spawner.interval, 0.5);
    assert!(sub_items(&mut app, root).is_empty());

    let mut spawners = app.world_mut().query::<&IntervalSpawner>();
    assert_eq!(spawners.iter(app.world()).count(), 1);
}

#[test]
fn destroy_on_hit_precedence() {
    let cases = [
        // (projectile base, orbit property, orbit override, params, expected)
        (None, None, None, None, true),
        (None, None, None, Some(false), false),
        (None, Some(false), None, Some(true), false),
        (None, None, Some(true), Some(false), true),
        (Some(false), Some(true), None, Some(true), false),
        (Some(true), None, Some(false), None, false),
    ];

    for (base, property, override_value, params_value, expected) in cases {
        let mut app = forge_app();
        let player = spawn_player(&mut app, Vec2::ZERO);

        let mut projectile = json!({ "speed": 6.0, "damage": 10.0 });
        if let Some(base) = base {
            projectile["destroyOnHit"] = json!(base);
        }
        let mut orbit = json!({ "radius": 1.5, "overrides": {} });
        if let Some(property) = property {
            orbit["destroyOnHit"] = json!(property);
        }
        if let Some(value) = override_value {
            orbit["overrides"]["destroyOnHit"] = json!(value);
        }
        define(&mut app, "Projectile", projectile);
        define(&mut app, "Orbit", orbit);

        let params = ItemParams {
            projectile_destroy_on_hit: params_value,
            ..Default::default()
        };
        let instruction = ItemInstruction::new("Projectile").with_secondary("Orbit");
        let root = create(&mut app, &instruction, &params, player).unwrap();

        let plan = app.world().get::<BuildPlan>(root).unwrap();
        assert_eq!(
            plan.destroy_on_hit, expected,
            "base {base:?} property {property:?} override {override_value:?} params {params_value:?}"
        );
        // An explicit Orbit value is forwarded onto its projectiles as-is
        let forwarded = override_value.or(property);
        for child in sub_items(&mut app, root) {
            let projectile = app.world().get::<ProjectileMechanic>(child).unwrap();
            assert_eq!(projectile.destroy_on_hit, forwarded.unwrap_or(expected));
        }
    }
}

#[test]
fn unknown_primary_builds_nothing() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);

    let root = create(&mut app, &ItemInstruction::new("Trebuchet"), &ItemParams::default(), player);
    assert!(root.is_none());
    let mut roots = app.world_mut().query::<&ItemRoot>();
    assert_eq!(roots.iter(app.world()).count(), 0);
}

#[test]
fn unknown_secondary_is_skipped() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let instruction = ItemInstruction::new("Projectile").with_secondary("Wobble");

    let root = create(&mut app, &instruction, &ItemParams::default(), player).unwrap();
    let children = sub_items(&mut app, root);
    assert_eq!(children.len(), 1);
    assert_eq!(attached(&app, children[0]).0, vec![ProjectileMechanic::NAME]);
}

#[test]
fn orbit_is_skipped_on_a_beam() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    let instruction = ItemInstruction::new("Beam").with_secondary("Orbit");

    let root = create(&mut app, &instruction, &ItemParams::default(), player).unwrap();
    for child in sub_items(&mut app, root) {
        assert!(app.world().get::<OrbitMechanic>(child).is_none());
        assert!(!attached(&app, child).contains(OrbitMechanic::NAME));
    }
}

#[test]
fn requirement_gated_modifiers_need_their_primary() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);

    let aura = create(
        &mut app,
        &ItemInstruction::new("Aura").with_secondary("Lock").with_secondary("Drain"),
        &ItemParams::default(),
        player,
    )
    .unwrap();
    let child = sub_items(&mut app, aura)[0];
    let names = attached(&app, child);
    assert!(!names.contains("Lock"));
    assert!(names.contains("Drain"));

    let bolt = create(
        &mut app,
        &ItemInstruction::new("Projectile").with_secondary("Drain").with_secondary("Lock"),
        &ItemParams::default(),
        player,
    )
    .unwrap();
    let child = sub_items(&mut app, bolt)[0];
    let names = attached(&app, child);
    assert!(!names.contains("Drain"));
    assert!(names.contains("Lock"));
}

#[test]
fn equipped_root_follows_its_owner() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::new(3.0, 1.0));
    let root = create(&mut app, &ItemInstruction::new("Aura"), &ItemParams::default(), player).unwrap();

    assert_eq!(app.world().get::<Parent>(root).map(Parent::get), Some(player));
    let item = app.world().get::<ItemRoot>(root).unwrap();
    assert_eq!(item.owner, player);
}

#[test]
fn alias_spelled_override_replaces_the_base_key() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::ZERO);
    define(&mut app, "Projectile", json!({ "speed": 6.0, "destroyOnHit": true }));
    define(
        &mut app,
        "Explosion",
        json!({ "explosionRadius": 1.5, "overrides": { "destroy_on_hit": false } }),
    );

    let instruction = ItemInstruction::new("Projectile").with_secondary("Explosion");
    let root = create(&mut app, &instruction, &ItemParams::default(), player).unwrap();

    assert!(!app.world().get::<BuildPlan>(root).unwrap().destroy_on_hit);
    for child in sub_items(&mut app, root) {
        assert!(!app.world().get::<ProjectileMechanic>(child).unwrap().destroy_on_hit);
    }
}

#[test]
fn thrown_children_leave_the_owner_and_move_in_world_space() {
    let mut app = forge_app();
    let player = spawn_player(&mut app, Vec2::new(2.0, 1.0));
    tweak(&mut app, "Projectile", "movementMode", "throw".into());

    let root = create(&mut app, &ItemInstruction::new("Projectile"), &ItemParams::default(), player).unwrap();
    let child = sub_items(&mut app, root)[0];
    assert!(app.world().get::<Parent>(child).is_none());
    assert!(app.world().get::<ThrowMovement>(child).is_some());
    let start = app.world().get::<Transform>(child).unwrap().translation.truncate();
    assert!(start.abs_diff_eq(Vec2::new(2.0, 1.0), 1e-4), "{start:?}");

    // The owner walking away must not drag the thrown child along
    app.world_mut().get_mut::<Transform>(player).unwrap().translation = Vec3::new(-5.0, -5.0, 0.0);
    run_frames(&mut app, 4);

    let moved = app.world().get::<Transform>(child).unwrap().translation.truncate();
    assert!(moved.x > start.x + 0.5, "{moved:?}");
    assert!((moved.y - 1.0).abs() < 1e-3, "{moved:?}");
}
