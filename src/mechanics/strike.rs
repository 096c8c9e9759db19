//! Strike: instant damage on one random mob every interval.

use bevy::prelude::*;
use std::time::Duration;

use super::common::{HitEmitter, HitRules};
use super::contract::{Mechanic, MechanicContext};
use crate::combat::{DamageTargets, HitFlash, MobTargeting, TargetingService};
use crate::core::Lifecycle;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct StrikeMechanic {
    pub rules: HitRules,
    pub interval: f32,
    /// Only mobs this close to the owner are picked; 0 means unlimited.
    pub range: f32,
    pub flash_duration: f32,
    pub flash_color: Color,
    pub timer: Timer,
    pub strikes: u32,
    lifecycle: Lifecycle,
}

impl Default for StrikeMechanic {
    fn default() -> Self {
        Self {
            rules: HitRules::with_damage(25.0),
            interval: 1.2,
            range: 12.0,
            flash_duration: 0.15,
            flash_color: Color::srgb(1.0, 1.0, 0.6),
            timer: Timer::from_seconds(1.2, TimerMode::Repeating),
            strikes: 0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for StrikeMechanic {
    const NAME: &'static str = "Strike";
    const ALIASES: &'static [&'static str] = &["StrikeMechanic", "LightningStrike"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.rules.apply_settings(settings);
        self.interval = normalize::interval(s, &["interval", "strikeInterval"], self.interval);
        self.range = normalize::radius(s, &["range", "maxRange"], self.range);
        self.flash_duration = normalize::float(s, &["flashDuration"], self.flash_duration).max(0.0);
        self.flash_color = normalize::color(s, &["flashColor"], self.flash_color);
        self.timer.set_duration(Duration::from_secs_f32(self.interval));
    }

    fn reset_for_reuse(&mut self) {
        self.timer.reset();
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn tick_strikes(
    mut commands: Commands,
    time: Res<Time>,
    mut strikes: Query<(Entity, &mut StrikeMechanic, &MechanicContext)>,
    origins: Query<&GlobalTransform>,
    mut targeting: MobTargeting,
    targets: DamageTargets,
    mut emitter: HitEmitter,
) {
    for (entity, mut strike, ctx) in strikes.iter_mut() {
        if !strike.lifecycle.is_running() {
            continue;
        }
        strike.timer.tick(time.delta());
        if !strike.timer.just_finished() {
            continue;
        }

        let origin = origins
            .get(ctx.owner)
            .or_else(|_| origins.get(entity))
            .map(|t| t.translation().truncate())
            .unwrap_or(Vec2::ZERO);
        let filter = strike.rules.filter(ctx.owner);
        let accept = |e: Entity| targets.accept(e, &filter).is_some();
        let range = (strike.range > 0.0).then_some(strike.range);

        let Some((target, position)) = targeting.pick_random_mob(origin, range, &accept) else {
            continue;
        };

        emitter.hit(entity, target, strike.rules.damage, position, Vec2::Y);
        if strike.flash_duration > 0.0 {
            commands
                .entity(target)
                .insert(HitFlash::new(strike.flash_duration, strike.flash_color));
        }
        strike.strikes += 1;
    }
}
