//! Drain: a share of an aura's damage heals its owner.

use bevy::prelude::*;

use crate::combat::Health;
use crate::core::Lifecycle;
use crate::mechanics::{DrainReport, Mechanic};
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct DrainModifier {
    /// Share of dealt damage returned as healing.
    pub fraction: f32,
    pub total_healed: f32,
    lifecycle: Lifecycle,
}

impl Default for DrainModifier {
    fn default() -> Self {
        Self {
            fraction: 0.25,
            total_healed: 0.0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for DrainModifier {
    const NAME: &'static str = "Drain";
    const ALIASES: &'static [&'static str] = &["LifeSteal", "DrainModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        self.fraction = normalize::float(Some(settings), &["fraction", "drainFraction"], self.fraction).clamp(0.0, 1.0);
    }

    fn reset_for_reuse(&mut self) {
        self.total_healed = 0.0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

pub fn apply_drain(
    mut reports: EventReader<DrainReport>,
    mut drains: Query<&mut DrainModifier>,
    mut owners: Query<&mut Health>,
) {
    for report in reports.read() {
        let Ok(mut drain) = drains.get_mut(report.source) else {
            continue;
        };
        if !drain.lifecycle.is_running() {
            continue;
        }
        let Ok(mut health) = owners.get_mut(report.owner) else {
            continue;
        };
        let healed = health.heal(report.total * drain.fraction);
        drain.total_healed += healed;
    }
}
