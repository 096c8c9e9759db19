//! Bounce: a projectile that hit something jumps to the next mob.

use bevy::prelude::*;

use crate::combat::{DamageTargets, MobTargeting, TargetingService};
use crate::core::{Lifecycle, PendingDespawn};
use crate::mechanics::{BounceRequest, Mechanic, MechanicContext, ProjectileMechanic};
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct BounceModifier {
    pub max_bounces: u32,
    pub speed_multiplier: f32,
    pub search_radius: f32,
    pub bounces: u32,
    lifecycle: Lifecycle,
}

impl Default for BounceModifier {
    fn default() -> Self {
        Self {
            max_bounces: 3,
            speed_multiplier: 1.0,
            search_radius: 6.0,
            bounces: 0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl BounceModifier {
    pub fn exhausted(&self) -> bool {
        self.bounces >= self.max_bounces
    }
}

impl Mechanic for BounceModifier {
    const NAME: &'static str = "Bounce";
    const ALIASES: &'static [&'static str] = &["Ricochet", "BounceModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.max_bounces = normalize::count(s, &["maxBounces", "bounces"], self.max_bounces);
        self.speed_multiplier = normalize::float(s, &["speedMultiplier"], self.speed_multiplier).max(0.0);
        self.search_radius = normalize::radius(s, &["searchRadius", "range"], self.search_radius);
    }

    fn reset_for_reuse(&mut self) {
        self.bounces = 0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// Redirect bouncing projectiles, or retire them when out of bounces or
/// targets.
pub fn handle_bounces(
    mut commands: Commands,
    mut requests: EventReader<BounceRequest>,
    mut projectiles: Query<(&mut BounceModifier, &mut ProjectileMechanic, &MechanicContext)>,
    targeting: MobTargeting,
    targets: DamageTargets,
) {
    for request in requests.read() {
        let Ok((mut bounce, mut projectile, ctx)) = projectiles.get_mut(request.payload) else {
            continue;
        };
        if !bounce.lifecycle.is_running() || bounce.exhausted() {
            if projectile.destroy_on_hit {
                commands.entity(request.payload).insert(PendingDespawn);
            }
            continue;
        }

        let filter = projectile.rules.filter(ctx.owner);
        let accept = |e: Entity| e != request.target && targets.accept(e, &filter).is_some();
        let next = targeting.nearest_mob(request.hit_point, Some(bounce.search_radius), &accept);
        let Some(direction) = next.and_then(|(_, position)| (position - request.hit_point).try_normalize()) else {
            commands.entity(request.payload).insert(PendingDespawn);
            continue;
        };

        bounce.bounces += 1;
        projectile.direction = direction;
        projectile.speed *= bounce.speed_multiplier;
        trace!("{:?} bounced ({}/{})", request.payload, bounce.bounces, bounce.max_bounces);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings_map;

    #[test]
    fn settings_and_exhaustion() {
        let mut bounce = BounceModifier::default();
        bounce.apply_settings(&settings_map([("maxBounces", 1.into())]));
        assert!(!bounce.exhausted());
        bounce.bounces = 1;
        assert!(bounce.exhausted());
        bounce.reset_for_reuse();
        assert_eq!(bounce.bounces, 0);
    }
}
