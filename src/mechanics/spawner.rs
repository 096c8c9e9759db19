//! Spawn cadences that keep building children after the initial build.
//!
//! Both spawners live on the item root and only count what is due. The
//! generator's spawner system turns those counts into children through the
//! root's `BuildPlan`.

use bevy::prelude::*;

use super::contract::Mechanic;
use crate::core::Lifecycle;
use crate::settings::{normalize, SettingsMap};

const GOLDEN_ANGLE: f32 = 2.399_963;

/// Children every `interval` seconds until the root goes away.
#[derive(Component, Debug, Clone)]
pub struct IntervalSpawner {
    pub interval: f32,
    pub count_per_interval: u32,
    /// Children are placed within this distance of the root.
    pub spawn_radius: f32,
    /// Live children cap; past it the oldest child is recycled. 0 = no cap.
    pub max_alive: u32,
    pub elapsed: f32,
    pub spawned_total: u32,
    lifecycle: Lifecycle,
}

impl Default for IntervalSpawner {
    fn default() -> Self {
        Self {
            interval: 1.0,
            count_per_interval: 1,
            spawn_radius: 0.0,
            max_alive: 0,
            elapsed: 0.0,
            spawned_total: 0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl IntervalSpawner {
    /// Advance the clock; returns how many children are due.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.interval <= 0.0 {
            return 0;
        }
        self.elapsed += dt;
        let ticks = (self.elapsed / self.interval).floor();
        if ticks < 1.0 {
            return 0;
        }
        self.elapsed -= ticks * self.interval;
        ticks as u32 * self.count_per_interval
    }

    /// Local offset for the `index`-th child, spread on a sunflower spiral.
    pub fn offset(&self, index: u32) -> Vec2 {
        spiral_offset(self.spawn_radius, index)
    }
}

impl Mechanic for IntervalSpawner {
    const NAME: &'static str = "IntervalSpawner";
    const ALIASES: &'static [&'static str] = &["SpawnOnInterval", "IntervalSpawn"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.interval = normalize::interval(s, &["spawnInterval", "interval"], self.interval);
        self.count_per_interval =
            normalize::count(s, &["countPerInterval", "spawnCount"], self.count_per_interval).max(1);
        self.spawn_radius = normalize::radius(s, &["spawnRadius"], self.spawn_radius);
        self.max_alive = normalize::count(s, &["maxAlive", "maxActive", "poolSize"], self.max_alive);
    }

    fn reset_for_reuse(&mut self) {
        self.elapsed = 0.0;
        self.spawned_total = 0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// A one-shot burst: `count` children, `spacing` seconds apart.
#[derive(Component, Debug, Clone)]
pub struct SequenceSpawner {
    pub count: u32,
    pub spacing: f32,
    pub spawn_radius: f32,
    pub spawned: u32,
    pub elapsed: f32,
    lifecycle: Lifecycle,
}

impl Default for SequenceSpawner {
    fn default() -> Self {
        Self {
            count: 1,
            spacing: 0.15,
            spawn_radius: 0.0,
            spawned: 0,
            elapsed: 0.0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl SequenceSpawner {
    /// The first child is due immediately, the rest one per `spacing`.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.finished() {
            return 0;
        }
        self.elapsed += dt;
        let reached = if self.spacing > 0.0 {
            (self.elapsed / self.spacing).floor() as u32 + 1
        } else {
            self.count
        };
        let due = reached.min(self.count).saturating_sub(self.spawned);
        self.spawned += due;
        due
    }

    pub fn finished(&self) -> bool {
        self.spawned >= self.count
    }

    pub fn offset(&self, index: u32) -> Vec2 {
        spiral_offset(self.spawn_radius, index)
    }
}

impl Mechanic for SequenceSpawner {
    const NAME: &'static str = "SequenceSpawner";
    const ALIASES: &'static [&'static str] = &["SpawnSequence"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.count = normalize::count(s, &["sequenceCount", "count"], self.count).max(1);
        self.spacing = normalize::float(s, &["sequenceSpacing", "spacing", "sequenceInterval"], self.spacing)
            .max(0.0);
        self.spawn_radius = normalize::radius(s, &["spawnRadius"], self.spawn_radius);
    }

    fn reset_for_reuse(&mut self) {
        self.spawned = 0;
        self.elapsed = 0.0;
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

fn spiral_offset(radius: f32, index: u32) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    let t = ((index % 16) as f32 + 0.5) / 16.0;
    Vec2::from_angle(GOLDEN_ANGLE * index as f32) * radius * t.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_counts_whole_ticks() {
        let mut spawner = IntervalSpawner {
            interval: 0.5,
            count_per_interval: 3,
            ..Default::default()
        };
        assert_eq!(spawner.advance(0.3), 0);
        assert_eq!(spawner.advance(0.3), 3);
        assert_eq!(spawner.advance(1.0), 6);
        assert!(spawner.elapsed < 0.5);
    }

    #[test]
    fn sequence_staggers_then_stops() {
        let mut sequence = SequenceSpawner {
            count: 3,
            spacing: 0.2,
            ..Default::default()
        };
        assert_eq!(sequence.advance(0.0), 1);
        assert_eq!(sequence.advance(0.1), 0);
        assert_eq!(sequence.advance(0.15), 1);
        assert_eq!(sequence.advance(5.0), 1);
        assert!(sequence.finished());
        assert_eq!(sequence.advance(1.0), 0);
    }

    #[test]
    fn offsets_stay_inside_radius() {
        let spawner = IntervalSpawner {
            spawn_radius: 2.0,
            ..Default::default()
        };
        for i in 0..40 {
            assert!(spawner.offset(i).length() <= 2.0 + 1e-4);
        }
        assert_eq!(IntervalSpawner::default().offset(3), Vec2::ZERO);
    }
}
