//! Sub-items on condition: spawn new items when a rule's trigger fires.
//!
//! Contact triggers come from the payload's own sensor. Damage triggers come
//! through the hit-modifier protocol, so the mechanic also works as a
//! secondary on any primary. Spawns go back through the generator as
//! `SpawnItemRequest`s, one frame later.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::contract::{Mechanic, MechanicContext};
use crate::combat::{DamageTargets, Tags, TargetFilter};
use crate::core::Lifecycle;
use crate::generator::{ItemInstruction, ItemParams, SpawnDepth, SpawnItemRequest};
use crate::hits::{HitInfo, HitModifier, HitModifierError, TriggerContact};
use crate::settings::{normalize, SettingValue, SettingsMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpawnTrigger {
    #[default]
    MobContact,
    OnDamage,
}

impl SpawnTrigger {
    pub fn parse(name: &str) -> Option<Self> {
        match normalize::normalize_key(name).as_str() {
            "mobcontact" | "contact" | "oncontact" => Some(SpawnTrigger::MobContact),
            "ondamage" | "damage" | "onhit" | "hit" => Some(SpawnTrigger::OnDamage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpawnPosition {
    #[default]
    HitPoint,
    Target,
    Payload,
}

impl SpawnPosition {
    pub fn parse(name: &str) -> Option<Self> {
        match normalize::normalize_key(name).as_str() {
            "hitpoint" | "hit" | "contact" => Some(SpawnPosition::HitPoint),
            "target" | "mob" => Some(SpawnPosition::Target),
            "payload" | "self" => Some(SpawnPosition::Payload),
            _ => None,
        }
    }
}

/// One "when X happens, spawn Y" rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnRule {
    pub trigger: SpawnTrigger,
    pub primary: String,
    pub secondary: Vec<String>,
    pub spawn_count: u32,
    pub spawn_once: bool,
    pub cooldown_seconds: f32,
    /// Only targets carrying this tag trigger the rule.
    pub target_tag: Option<String>,
    pub position: SpawnPosition,
}

impl Default for SpawnRule {
    fn default() -> Self {
        Self {
            trigger: SpawnTrigger::MobContact,
            primary: String::new(),
            secondary: Vec::new(),
            spawn_count: 1,
            spawn_once: false,
            cooldown_seconds: 0.0,
            target_tag: None,
            position: SpawnPosition::HitPoint,
        }
    }
}

impl SpawnRule {
    /// Read a rule from a settings map. `None` without a primary.
    pub fn from_settings(settings: &SettingsMap) -> Option<Self> {
        let s = Some(settings);
        let primary = normalize::string(s, &["primary", "spawnPrimary", "item"], "");
        if primary.trim().is_empty() {
            return None;
        }
        let defaults = SpawnRule::default();
        let secondary = match normalize::lookup(s, &["secondary", "secondaries", "spawnSecondary"]) {
            Some(SettingValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    SettingValue::String(name) => Some(name.trim().to_string()),
                    _ => None,
                })
                .filter(|name| !name.is_empty())
                .collect(),
            Some(SettingValue::String(names)) => names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        let target_tag = normalize::string(s, &["targetTag", "requireTag"], "");

        Some(Self {
            trigger: SpawnTrigger::parse(&normalize::string(s, &["trigger", "condition"], ""))
                .unwrap_or(defaults.trigger),
            primary: primary.trim().to_string(),
            secondary,
            spawn_count: normalize::count(s, &["spawnCount", "count"], defaults.spawn_count).max(1),
            spawn_once: normalize::bool(s, &["spawnOnce", "once"], defaults.spawn_once),
            cooldown_seconds: normalize::float(s, &["cooldownSeconds", "cooldown"], 0.0).max(0.0),
            target_tag: (!target_tag.trim().is_empty()).then(|| target_tag.trim().to_string()),
            position: SpawnPosition::parse(&normalize::string(s, &["position", "spawnAt"], ""))
                .unwrap_or(defaults.position),
        })
    }

    pub fn instruction(&self) -> ItemInstruction {
        ItemInstruction {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            isolate_secondary_settings: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RuleState {
    fired: bool,
    last_fired: Option<f32>,
}

#[derive(Component, Debug, Clone)]
pub struct SubItemsOnConditionMechanic {
    /// Contact sensor radius.
    pub radius: f32,
    pub rules: Vec<SpawnRule>,
    states: Vec<RuleState>,
    lifecycle: Lifecycle,
}

impl Default for SubItemsOnConditionMechanic {
    fn default() -> Self {
        Self {
            radius: 0.5,
            rules: Vec::new(),
            states: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }
}

impl SubItemsOnConditionMechanic {
    /// Append rules, skipping ones already present.
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = SpawnRule>) {
        for rule in rules {
            if !self.rules.contains(&rule) {
                self.rules.push(rule);
                self.states.push(RuleState::default());
            }
        }
    }

    /// Rules for `trigger` allowed to fire at `now`, marked as fired.
    pub fn take_due(
        &mut self,
        trigger: SpawnTrigger,
        now: f32,
        has_tag: impl Fn(&str) -> bool,
    ) -> Vec<SpawnRule> {
        self.states.resize(self.rules.len(), RuleState::default());
        let mut due = Vec::new();
        for (rule, state) in self.rules.iter().zip(self.states.iter_mut()) {
            if rule.trigger != trigger {
                continue;
            }
            if rule.spawn_once && state.fired {
                continue;
            }
            if let Some(last) = state.last_fired {
                if rule.cooldown_seconds > 0.0 && now - last < rule.cooldown_seconds {
                    continue;
                }
            }
            if let Some(tag) = &rule.target_tag {
                if !has_tag(tag) {
                    continue;
                }
            }
            state.fired = true;
            state.last_fired = Some(now);
            due.push(rule.clone());
        }
        due
    }
}

impl Mechanic for SubItemsOnConditionMechanic {
    const NAME: &'static str = "SubItemsOnCondition";
    const ALIASES: &'static [&'static str] = &["SubItemsOnConditionMechanic", "SpawnOnCondition", "SubItems"];

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.radius = normalize::radius(s, &["radius", "triggerRadius"], self.radius);
        if let Some(list) = normalize::lookup(s, &["rules", "conditionRules", "spawnRules"]).and_then(SettingValue::as_list) {
            let rules: Vec<SpawnRule> = list
                .iter()
                .filter_map(SettingValue::as_map)
                .filter_map(SpawnRule::from_settings)
                .collect();
            self.states = vec![RuleState::default(); rules.len()];
            self.rules = rules;
        }
    }

    fn reset_for_reuse(&mut self) {
        self.states = vec![RuleState::default(); self.rules.len()];
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

fn spawn_requests(
    rules: Vec<SpawnRule>,
    ctx: &MechanicContext,
    depth: u32,
    hit_point: Vec2,
    target: (Entity, Vec2),
    payload: Vec2,
) -> Vec<SpawnItemRequest> {
    rules
        .into_iter()
        .flat_map(|rule| {
            let position = match rule.position {
                SpawnPosition::HitPoint => hit_point,
                SpawnPosition::Target => target.1,
                SpawnPosition::Payload => payload,
            };
            let instruction = rule.instruction();
            (0..rule.spawn_count.max(1)).map(move |_| SpawnItemRequest {
                instruction: instruction.clone(),
                params: ItemParams {
                    spawn_depth: depth + 1,
                    ..Default::default()
                },
                position,
                owner: Some(ctx.owner),
                target: Some(target.0),
            })
        })
        .collect()
}

/// Fire `mobContact` rules from the payload sensor.
pub fn sub_items_on_contact(
    time: Res<Time>,
    mut contacts: EventReader<TriggerContact>,
    mut mechanics: Query<(
        &mut SubItemsOnConditionMechanic,
        &MechanicContext,
        &GlobalTransform,
        Option<&SpawnDepth>,
    )>,
    transforms: Query<&GlobalTransform>,
    tags: Query<&Tags>,
    targets: DamageTargets,
    mut requests: EventWriter<SpawnItemRequest>,
) {
    let now = time.elapsed_secs();
    for contact in contacts.read().filter(|c| c.started) {
        let Ok((mut mechanic, ctx, transform, depth)) = mechanics.get_mut(contact.collider) else {
            continue;
        };
        if !mechanic.lifecycle.is_running() {
            continue;
        }
        let filter = TargetFilter {
            owner: ctx.owner,
            exclude_owner: true,
            require_mob_tag: true,
        };
        let Some(target) = targets.accept(contact.other, &filter) else {
            continue;
        };
        let target_tags = tags.get(target).ok();
        let due = mechanic.take_due(SpawnTrigger::MobContact, now, |tag| {
            target_tags.is_some_and(|t| t.contains(tag))
        });
        if due.is_empty() {
            continue;
        }

        let payload = transform.translation().truncate();
        let target_position = transforms
            .get(target)
            .map(|t| t.translation().truncate())
            .unwrap_or(payload);
        let depth = depth.map_or(0, |d| d.0);
        for request in spawn_requests(due, ctx, depth, payload, (target, target_position), payload) {
            requests.send(request);
        }
    }
}

impl HitModifier for SubItemsOnConditionMechanic {
    fn on_primary_hit(world: &mut World, source: Entity, hit: &HitInfo) -> Result<(), HitModifierError> {
        let target_tags = world.get::<Tags>(hit.target).cloned();
        let target_position = world
            .get::<GlobalTransform>(hit.target)
            .map(|t| t.translation().truncate())
            .unwrap_or(hit.hit_point);
        let payload = world
            .get::<GlobalTransform>(source)
            .map(|t| t.translation().truncate())
            .unwrap_or(hit.hit_point);
        let depth = world.get::<SpawnDepth>(source).map_or(0, |d| d.0);
        let ctx = world
            .get::<MechanicContext>(source)
            .cloned()
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "MechanicContext",
            })?;

        let mut mechanic = world
            .get_mut::<SubItemsOnConditionMechanic>(source)
            .ok_or(HitModifierError::MissingComponent {
                entity: source,
                component: "SubItemsOnConditionMechanic",
            })?;
        if !mechanic.lifecycle.is_running() {
            return Ok(());
        }
        let due = mechanic.take_due(SpawnTrigger::OnDamage, hit.time, |tag| {
            target_tags.as_ref().is_some_and(|t| t.contains(tag))
        });

        for request in spawn_requests(due, &ctx, depth, hit.hit_point, (hit.target, target_position), payload) {
            world.send_event(request);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(trigger: SpawnTrigger) -> SpawnRule {
        SpawnRule {
            trigger,
            primary: "Aura".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rules_parse_from_json_settings() {
        let settings = crate::settings::settings_from_json(&json!({
            "rules": [
                { "trigger": "onDamage", "primary": "Ripple", "secondary": ["Drain"], "spawnOnce": true, "position": "target" },
                { "trigger": "mobContact" },
                { "primary": "Strike", "cooldown": 2, "targetTag": "boss", "spawnCount": 3 }
            ]
        }));
        let mut mechanic = SubItemsOnConditionMechanic::default();
        mechanic.apply_settings(&settings);
        assert_eq!(mechanic.rules.len(), 2);
        assert_eq!(mechanic.rules[0].trigger, SpawnTrigger::OnDamage);
        assert_eq!(mechanic.rules[0].secondary, vec!["Drain".to_string()]);
        assert_eq!(mechanic.rules[0].position, SpawnPosition::Target);
        assert!(mechanic.rules[0].spawn_once);
        assert_eq!(mechanic.rules[1].cooldown_seconds, 2.0);
        assert_eq!(mechanic.rules[1].target_tag.as_deref(), Some("boss"));
        assert_eq!(mechanic.rules[1].spawn_count, 3);
    }

    #[test]
    fn spawn_once_fires_a_single_time() {
        let mut mechanic = SubItemsOnConditionMechanic::default();
        mechanic.add_rules([SpawnRule {
            spawn_once: true,
            ..rule(SpawnTrigger::OnDamage)
        }]);
        assert_eq!(mechanic.take_due(SpawnTrigger::OnDamage, 0.0, |_| true).len(), 1);
        assert!(mechanic.take_due(SpawnTrigger::OnDamage, 10.0, |_| true).is_empty());
    }

    #[test]
    fn cooldown_and_trigger_filtering() {
        let mut mechanic = SubItemsOnConditionMechanic::default();
        mechanic.add_rules([SpawnRule {
            cooldown_seconds: 1.0,
            ..rule(SpawnTrigger::MobContact)
        }]);
        assert!(mechanic.take_due(SpawnTrigger::OnDamage, 0.0, |_| true).is_empty());
        assert_eq!(mechanic.take_due(SpawnTrigger::MobContact, 0.0, |_| true).len(), 1);
        assert!(mechanic.take_due(SpawnTrigger::MobContact, 0.5, |_| true).is_empty());
        assert_eq!(mechanic.take_due(SpawnTrigger::MobContact, 1.5, |_| true).len(), 1);
    }

    #[test]
    fn target_tag_must_match() {
        let mut mechanic = SubItemsOnConditionMechanic::default();
        mechanic.add_rules([SpawnRule {
            target_tag: Some("boss".to_string()),
            ..rule(SpawnTrigger::OnDamage)
        }]);
        assert!(mechanic.take_due(SpawnTrigger::OnDamage, 0.0, |tag| tag == "minion").is_empty());
        assert_eq!(mechanic.take_due(SpawnTrigger::OnDamage, 0.0, |tag| tag == "boss").len(), 1);
    }

    #[test]
    fn rules_deserialize_from_ron() {
        let rule: SpawnRule =
            ron::from_str(r#"(trigger: onDamage, primary: "Aura", spawnOnce: true)"#).unwrap();
        assert_eq!(rule.trigger, SpawnTrigger::OnDamage);
        assert_eq!(rule.spawn_count, 1);
        assert!(rule.spawn_once);
    }
}
