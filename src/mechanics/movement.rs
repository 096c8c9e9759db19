//! World-space movement for detached sub-items ("drop" and "throw").

use bevy::prelude::*;

use super::common::direction_setting;
use super::contract::{Mechanic, MechanicInit};
use crate::core::Lifecycle;
use crate::settings::{normalize, SettingsMap};

/// Falls under gravity for a fixed distance, then rests.
#[derive(Component, Debug, Clone)]
pub struct DropMovement {
    pub gravity: f32,
    pub drop_distance: f32,
    /// Horizontal drift per unit of initial offset.
    pub scatter: f32,
    pub velocity: Vec2,
    pub fallen: f32,
    pub landed: bool,
    lifecycle: Lifecycle,
}

impl Default for DropMovement {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            drop_distance: 1.5,
            scatter: 1.0,
            velocity: Vec2::ZERO,
            fallen: 0.0,
            landed: false,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for DropMovement {
    const NAME: &'static str = "DropMovement";
    const ALIASES: &'static [&'static str] = &["Drop"];
    const INITIALIZE_ORDER: i32 = -10;

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.gravity = normalize::float(s, &["gravity"], self.gravity);
        self.drop_distance = normalize::radius(s, &["dropDistance", "distance"], self.drop_distance);
        self.scatter = normalize::float(s, &["scatter"], self.scatter);
    }

    fn initialize(&mut self, init: &MechanicInit) {
        self.velocity = Vec2::new(init.local_offset.x * self.scatter, 0.0);
        self.fallen = 0.0;
        self.landed = false;
    }

    fn reset_for_reuse(&mut self) {
        self.velocity = Vec2::ZERO;
        self.fallen = 0.0;
        self.landed = false;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// Flies along a direction, slowing with drag until it stops.
#[derive(Component, Debug, Clone)]
pub struct ThrowMovement {
    pub speed: f32,
    pub drag: f32,
    pub align_to_velocity: bool,
    pub min_speed: f32,
    pub direction: Vec2,
    pub velocity: Vec2,
    lifecycle: Lifecycle,
}

impl Default for ThrowMovement {
    fn default() -> Self {
        Self {
            speed: 8.0,
            drag: 2.0,
            align_to_velocity: true,
            min_speed: 0.2,
            direction: Vec2::X,
            velocity: Vec2::ZERO,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for ThrowMovement {
    const NAME: &'static str = "ThrowMovement";
    const ALIASES: &'static [&'static str] = &["Throw"];
    const INITIALIZE_ORDER: i32 = -10;

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.speed = normalize::speed(s, &["throwSpeed", "speed"], self.speed);
        self.drag = normalize::float(s, &["drag"], self.drag).max(0.0);
        self.align_to_velocity = normalize::bool(s, &["alignToVelocity"], self.align_to_velocity);
        self.min_speed = normalize::speed(s, &["minSpeed"], self.min_speed);
        self.direction = direction_setting(settings, self.direction);
    }

    fn initialize(&mut self, _init: &MechanicInit) {
        self.velocity = self.direction * self.speed;
    }

    fn reset_for_reuse(&mut self) {
        self.velocity = self.direction * self.speed;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn tick_drop_movement(time: Res<Time>, mut items: Query<(&mut DropMovement, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut drop, mut transform) in items.iter_mut() {
        if !drop.lifecycle.is_running() || drop.landed {
            continue;
        }
        drop.velocity.y -= drop.gravity * dt;
        let step = drop.velocity * dt;
        let remaining = drop.drop_distance - drop.fallen;
        let fall = (-step.y).min(remaining).max(0.0);
        transform.translation.x += step.x;
        transform.translation.y -= fall;
        drop.fallen += fall;
        if drop.fallen >= drop.drop_distance {
            drop.landed = true;
            drop.velocity = Vec2::ZERO;
        }
    }
}

pub fn tick_throw_movement(time: Res<Time>, mut items: Query<(&mut ThrowMovement, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut throw, mut transform) in items.iter_mut() {
        if !throw.lifecycle.is_running() || throw.velocity == Vec2::ZERO {
            continue;
        }
        transform.translation += (throw.velocity * dt).extend(0.0);
        if throw.align_to_velocity {
            transform.rotation = Quat::from_rotation_z(throw.velocity.to_angle());
        }
        let decay = (1.0 - throw.drag * dt).max(0.0);
        throw.velocity *= decay;
        if throw.velocity.length() < throw.min_speed {
            throw.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ShutdownToken;
    use crate::mechanics::{run_initialize, AttachedMechanics, MechanicContext};
    use std::time::Duration;

    fn init_args() -> (MechanicContext, AttachedMechanics) {
        (
            MechanicContext {
                owner: Entity::PLACEHOLDER,
                payload: Entity::PLACEHOLDER,
                target: None,
                owner_body: None,
                payload_body: None,
                shutdown: ShutdownToken::default(),
            },
            AttachedMechanics::default(),
        )
    }

    #[test]
    fn drop_stops_after_distance() {
        let (ctx, attached) = init_args();
        let mut drop = DropMovement::default();
        run_initialize(
            &mut drop,
            &MechanicInit {
                ctx: &ctx,
                attached: &attached,
                local_offset: Vec2::ZERO,
            },
        );

        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        let item = world.spawn((drop, Transform::default())).id();
        let mut system = IntoSystem::into_system(tick_drop_movement);
        system.initialize(&mut world);
        for _ in 0..200 {
            world.resource_mut::<Time>().advance_by(Duration::from_millis(16));
            system.run((), &mut world);
        }

        let drop = world.get::<DropMovement>(item).unwrap();
        assert!(drop.landed);
        let y = world.get::<Transform>(item).unwrap().translation.y;
        assert!((y + 1.5).abs() < 1e-4);
    }

    #[test]
    fn throw_velocity_follows_direction() {
        let (ctx, attached) = init_args();
        let mut throw = ThrowMovement::default();
        throw.apply_settings(&crate::settings::settings_map([("direction", Vec2::NEG_Y.into())]));
        run_initialize(
            &mut throw,
            &MechanicInit {
                ctx: &ctx,
                attached: &attached,
                local_offset: Vec2::ZERO,
            },
        );
        assert_eq!(throw.velocity, Vec2::new(0.0, -8.0));
    }
}
