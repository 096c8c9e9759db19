//! How each secondary is put onto freshly built children.
//!
//! Strategies are looked up by name in a static table. A secondary without a
//! strategy is attached as a plain mechanic when the catalog knows it.

use bevy::prelude::*;

use super::orbit::OrbitStrategy;
use crate::builders::BuildPlan;
use crate::generator::ItemGenerator;
use crate::mechanics::{AttachedMechanics, SubItemsOnConditionMechanic};
use crate::settings::normalize::normalize_key;
use crate::settings::{flatten_definition, SettingsMap};

/// One secondary being applied to a batch of children.
#[derive(Debug)]
pub struct ModifierRequest<'a> {
    pub name: &'a str,
    /// The secondary's own definition with its overrides folded in.
    pub settings: SettingsMap,
    pub plan: &'a BuildPlan,
}

pub trait ModifierStrategy {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn is_compatible(&self, _generator: &ItemGenerator, _target: Entity) -> bool {
        true
    }

    fn apply(&self, generator: &mut ItemGenerator, target: Entity, request: &ModifierRequest);

    /// Apply to every compatible child of one batch.
    fn apply_to_group(&self, generator: &mut ItemGenerator, targets: &[Entity], request: &ModifierRequest) {
        for target in targets {
            self.apply(generator, *target, request);
        }
    }

    fn matches(&self, name: &str) -> bool {
        let wanted = normalize_key(name);
        normalize_key(self.name()) == wanted || self.aliases().iter().any(|alias| normalize_key(alias) == wanted)
    }
}

/// Attach a mechanic, optionally only next to another one.
pub struct AttachStrategy {
    pub mechanic: &'static str,
    pub aliases: &'static [&'static str],
    pub requires: Option<&'static str>,
}

impl ModifierStrategy for AttachStrategy {
    fn name(&self) -> &'static str {
        self.mechanic
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn is_compatible(&self, generator: &ItemGenerator, target: Entity) -> bool {
        match self.requires {
            Some(required) => has_mechanic(generator, target, required),
            None => true,
        }
    }

    fn apply(&self, generator: &mut ItemGenerator, target: Entity, request: &ModifierRequest) {
        generator.add_mechanic_by_name(target, self.mechanic, &request.settings);
    }
}

/// Adds the rule mechanic and the session's condition rules.
pub struct SubItemsStrategy;

impl ModifierStrategy for SubItemsStrategy {
    fn name(&self) -> &'static str {
        "SubItemsOnCondition"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["SpawnOnCondition", "SubItems"]
    }

    fn apply(&self, generator: &mut ItemGenerator, target: Entity, request: &ModifierRequest) {
        generator.add_mechanic_by_name(target, self.name(), &request.settings);
        let rules = &request.plan.params.condition_rules;
        if rules.is_empty() {
            return;
        }
        if let Some(mut mechanic) = generator.world_mut().get_mut::<SubItemsOnConditionMechanic>(target) {
            mechanic.add_rules(rules.iter().cloned());
        }
    }
}

const STRATEGIES: &[&dyn ModifierStrategy] = &[
    &OrbitStrategy,
    &AttachStrategy {
        mechanic: "Lock",
        aliases: &["LockOn", "Homing"],
        requires: Some("Projectile"),
    },
    &AttachStrategy {
        mechanic: "Bounce",
        aliases: &["Ricochet"],
        requires: Some("Projectile"),
    },
    &AttachStrategy {
        mechanic: "DamageOverTime",
        aliases: &["Dot", "Burn"],
        requires: None,
    },
    &AttachStrategy {
        mechanic: "Explosion",
        aliases: &["Explode"],
        requires: None,
    },
    &AttachStrategy {
        mechanic: "RippleOnHit",
        aliases: &[],
        requires: None,
    },
    &AttachStrategy {
        mechanic: "Drain",
        aliases: &["LifeSteal"],
        requires: Some("Aura"),
    },
    &SubItemsStrategy,
];

pub fn strategy_for(name: &str) -> Option<&'static dyn ModifierStrategy> {
    STRATEGIES.iter().copied().find(|strategy| strategy.matches(name))
}

pub(crate) fn has_mechanic(generator: &ItemGenerator, target: Entity, name: &str) -> bool {
    generator
        .world()
        .get::<AttachedMechanics>(target)
        .is_some_and(|attached| attached.contains(name))
}

/// The secondary's definition flattened for its own component.
fn own_settings(generator: &ItemGenerator, name: &str) -> SettingsMap {
    generator
        .definition(name)
        .map(|definition| flatten_definition(&definition))
        .unwrap_or_default()
}

/// Put every secondary of `plan`, in order, onto a freshly built batch.
pub fn apply_secondaries(generator: &mut ItemGenerator, children: &[Entity], plan: &BuildPlan) {
    for name in &plan.instruction.secondary {
        let settings = own_settings(generator, name);

        let Some(strategy) = strategy_for(name) else {
            if !generator.knows_mechanic(name) {
                warn!("Unknown secondary '{}', skipped", name);
                continue;
            }
            for child in children {
                generator.add_mechanic_by_name(*child, name, &settings);
            }
            continue;
        };

        let targets: Vec<Entity> = children
            .iter()
            .copied()
            .filter(|child| {
                let compatible = strategy.is_compatible(generator, *child);
                if !compatible {
                    debug!("{} is not compatible with {:?}, skipped", strategy.name(), child);
                }
                compatible
            })
            .collect();
        if targets.is_empty() {
            continue;
        }

        let request = ModifierRequest { name, settings, plan };
        strategy.apply_to_group(generator, &targets, &request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_aliases_and_casing() {
        assert_eq!(strategy_for("orbit").map(|s| s.name()), Some("Orbit"));
        assert_eq!(strategy_for("Homing").map(|s| s.name()), Some("Lock"));
        assert_eq!(strategy_for("damage_over_time").map(|s| s.name()), Some("DamageOverTime"));
        assert!(strategy_for("Teleport").is_none());
    }

    #[test]
    fn every_named_modifier_has_a_strategy() {
        for name in [
            "Orbit",
            "Lock",
            "Bounce",
            "DamageOverTime",
            "Explosion",
            "RippleOnHit",
            "Drain",
            "SubItemsOnCondition",
        ] {
            assert!(strategy_for(name).is_some(), "{name}");
        }
    }
}
