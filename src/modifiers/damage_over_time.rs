//! Damage over time: hits leave a ticking effect on the target.

use bevy::prelude::*;

use crate::core::{DamageEvent, Lifecycle};
use crate::hits::{HitInfo, HitModifier, HitModifierError};
use crate::mechanics::Mechanic;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct DamageOverTimeModifier {
    pub damage_per_tick: f32,
    pub tick_interval: f32,
    pub duration: f32,
    /// Separate stacks one source may keep on a target.
    pub max_stacks: u32,
    lifecycle: Lifecycle,
}

impl Default for DamageOverTimeModifier {
    fn default() -> Self {
        Self {
            damage_per_tick: 2.0,
            tick_interval: 0.5,
            duration: 3.0,
            max_stacks: 1,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mechanic for DamageOverTimeModifier {
    const NAME: &'static str = "DamageOverTime";
    const ALIASES: &'static [&'static str] = &["Dot", "Burn", "DamageOverTimeModifier"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.damage_per_tick = normalize::damage(s, &["damagePerTick", "tickDamage"], self.damage_per_tick);
        self.tick_interval = normalize::interval(s, &["tickInterval"], self.tick_interval);
        self.duration = normalize::float(s, &["duration"], self.duration).max(0.0);
        self.max_stacks = normalize::count(s, &["maxStacks"], self.max_stacks).max(1);
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

#[derive(Debug, Clone)]
pub struct DotStack {
    pub source: Entity,
    pub damage: f32,
    pub remaining: f32,
    pub timer: Timer,
}

/// Active damage-over-time stacks on one target.
#[derive(Component, Debug, Clone, Default)]
pub struct DamageOverTimeEffect {
    pub stacks: Vec<DotStack>,
}

impl DamageOverTimeEffect {
    /// Refresh the oldest stack from `source` once it has `max_stacks`,
    /// otherwise start a new one.
    pub fn add(&mut self, source: Entity, modifier: &DamageOverTimeModifier) {
        let stack = DotStack {
            source,
            damage: modifier.damage_per_tick,
            remaining: modifier.duration,
            timer: Timer::from_seconds(modifier.tick_interval, TimerMode::Repeating),
        };
        let from_source = self.stacks.iter().filter(|s| s.source == source).count();
        if from_source < modifier.max_stacks as usize {
            self.stacks.push(stack);
            return;
        }
        if let Some(oldest) = self
            .stacks
            .iter_mut()
            .filter(|s| s.source == source)
            .min_by(|a, b| a.remaining.total_cmp(&b.remaining))
        {
            oldest.remaining = stack.remaining;
            oldest.damage = stack.damage;
        }
    }

    /// Advance every stack; returns `(source, damage)` per tick due.
    pub fn tick(&mut self, delta: std::time::Duration) -> Vec<(Entity, f32)> {
        let mut due = Vec::new();
        for stack in &mut self.stacks {
            stack.timer.tick(delta);
            stack.remaining -= delta.as_secs_f32();
            for _ in 0..stack.timer.times_finished_this_tick() {
                due.push((stack.source, stack.damage));
            }
        }
        self.stacks.retain(|s| s.remaining > 0.0);
        due
    }
}

impl HitModifier for DamageOverTimeModifier {
    fn on_primary_hit(world: &mut World, source: Entity, hit: &HitInfo) -> Result<(), HitModifierError> {
        let modifier = world
            .get::<DamageOverTimeModifier>(source)
            .cloned()
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "DamageOverTimeModifier",
            })?;
        if !modifier.lifecycle.is_running() {
            return Ok(());
        }
        let mut target = world
            .get_entity_mut(hit.target)
            .map_err(|_| HitModifierError::TargetGone(hit.target))?;

        match target.get_mut::<DamageOverTimeEffect>() {
            Some(mut effect) => effect.add(source, &modifier),
            None => {
                let mut effect = DamageOverTimeEffect::default();
                effect.add(source, &modifier);
                target.insert(effect);
            }
        }
        Ok(())
    }
}

/// Tick every effect into damage events.
pub fn tick_damage_over_time(
    mut commands: Commands,
    time: Res<Time>,
    mut effects: Query<(Entity, &mut DamageOverTimeEffect, &GlobalTransform)>,
    mut damage: EventWriter<DamageEvent>,
) {
    for (entity, mut effect, transform) in effects.iter_mut() {
        let position = transform.translation().truncate();
        for (source, amount) in effect.tick(time.delta()) {
            damage.send(DamageEvent {
                target: entity,
                source,
                amount,
                hit_point: position,
                hit_normal: Vec2::Y,
            });
        }
        if effect.stacks.is_empty() {
            commands.entity(entity).remove::<DamageOverTimeEffect>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stack_ticks_until_expired() {
        let modifier = DamageOverTimeModifier {
            damage_per_tick: 2.0,
            tick_interval: 0.5,
            duration: 1.0,
            ..Default::default()
        };
        let source = Entity::from_raw(1);
        let mut effect = DamageOverTimeEffect::default();
        effect.add(source, &modifier);

        let first = effect.tick(Duration::from_millis(600));
        assert_eq!(first, vec![(source, 2.0)]);
        let second = effect.tick(Duration::from_millis(500));
        assert_eq!(second, vec![(source, 2.0)]);
        assert!(effect.stacks.is_empty());
    }

    #[test]
    fn repeated_hits_refresh_instead_of_stacking() {
        let modifier = DamageOverTimeModifier::default();
        let source = Entity::from_raw(1);
        let mut effect = DamageOverTimeEffect::default();
        effect.add(source, &modifier);
        effect.tick(Duration::from_secs(2));
        effect.add(source, &modifier);
        assert_eq!(effect.stacks.len(), 1);
        assert_eq!(effect.stacks[0].remaining, modifier.duration);

        effect.add(Entity::from_raw(2), &modifier);
        assert_eq!(effect.stacks.len(), 2);
    }
}
