//! Lock: steer a projectile towards the nearest mob.

use bevy::prelude::*;

use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::Lifecycle;
use crate::mechanics::{Mechanic, MechanicContext, ProjectileMechanic};
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct LockModifier {
    pub turn_rate_deg: f32,
    /// Only mobs within this distance are locked on to.
    pub range: f32,
    pub retarget_interval: f32,
    pub target: Option<Entity>,
    pub since_retarget: f32,
    lifecycle: Lifecycle,
}

impl Default for LockModifier {
    fn default() -> Self {
        Self {
            turn_rate_deg: 180.0,
            range: 8.0,
            retarget_interval: 0.5,
            target: None,
            since_retarget: 0.0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl LockModifier {
    /// Rotate `current` towards `desired` by at most `turn_rate_deg * dt`.
    pub fn steer(&self, current: Vec2, desired: Vec2, dt: f32) -> Vec2 {
        let Some(desired) = desired.try_normalize() else {
            return current;
        };
        let max_turn = self.turn_rate_deg.to_radians() * dt;
        let angle = current.perp_dot(desired).atan2(current.dot(desired));
        if angle.abs() <= max_turn {
            return desired;
        }
        Vec2::from_angle(max_turn.copysign(angle)).rotate(current)
    }
}

impl Mechanic for LockModifier {
    const NAME: &'static str = "Lock";
    const ALIASES: &'static [&'static str] = &["LockOn", "Homing", "LockModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.turn_rate_deg = normalize::float(s, &["turnRateDeg", "turnRate"], self.turn_rate_deg).max(0.0);
        self.range = normalize::radius(s, &["range", "lockRange"], self.range);
        self.retarget_interval = normalize::interval(s, &["retargetInterval"], self.retarget_interval);
    }

    fn reset_for_reuse(&mut self) {
        self.target = None;
        self.since_retarget = 0.0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn steer_locked_projectiles(
    time: Res<Time>,
    mut projectiles: Query<(&mut LockModifier, &mut ProjectileMechanic, &MechanicContext, &GlobalTransform)>,
    transforms: Query<&GlobalTransform>,
    targeting: MobTargeting,
    targets: DamageTargets,
) {
    let dt = time.delta_secs();
    for (mut lock, mut projectile, ctx, transform) in projectiles.iter_mut() {
        if !lock.lifecycle.is_running() || projectile.disable_self_speed {
            continue;
        }
        let origin = transform.translation().truncate();

        lock.since_retarget += dt;
        let lost = lock.target.is_none_or(|target| !targets.is_alive(target));
        if lost || lock.since_retarget >= lock.retarget_interval {
            lock.since_retarget = 0.0;
            let filter = projectile.rules.filter(ctx.owner);
            let accept = |e: Entity| targets.accept(e, &filter).is_some();
            lock.target = targeting
                .nearest_mob(origin, Some(lock.range), &accept)
                .map(|(target, _)| target);
        }

        let Some(target_position) = lock
            .target
            .and_then(|target| transforms.get(target).ok())
            .map(|t| t.translation().truncate())
        else {
            continue;
        };
        let direction = lock.steer(projectile.direction, target_position - origin, dt);
        if direction != projectile.direction {
            projectile.direction = direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn steering_is_rate_limited() {
        let lock = LockModifier {
            turn_rate_deg: 90.0,
            ..Default::default()
        };
        let turned = lock.steer(Vec2::X, Vec2::NEG_Y, 0.5);
        let angle = Vec2::X.perp_dot(turned).atan2(Vec2::X.dot(turned));
        assert!((angle + FRAC_PI_2 / 2.0).abs() < 1e-4);
    }

    #[test]
    fn small_corrections_snap() {
        let lock = LockModifier::default();
        let desired = Vec2::new(1.0, 0.05).normalize();
        assert_eq!(lock.steer(Vec2::X, desired, 0.1), desired);
    }
}
