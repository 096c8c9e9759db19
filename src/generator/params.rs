//! What to build (`ItemInstruction`) and session-level overrides (`ItemParams`).

use serde::{Deserialize, Serialize};

use crate::mechanics::SpawnRule;

/// A primary mechanic plus ordered secondary modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInstruction {
    pub primary: String,
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Skip merging secondary definitions into the primary's settings.
    #[serde(default)]
    pub isolate_secondary_settings: bool,
}

impl ItemInstruction {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            ..Default::default()
        }
    }

    pub fn with_secondary(mut self, name: impl Into<String>) -> Self {
        self.secondary.push(name.into());
        self
    }

    pub fn isolated(mut self) -> Self {
        self.isolate_secondary_settings = true;
        self
    }
}

/// Inspector/session overrides. Fill gaps the JSON leaves open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemParams {
    pub damage: Option<f32>,
    pub radius: Option<f32>,
    pub speed: Option<f32>,
    /// 0 means unset.
    pub sub_item_count: u32,

    pub orbit_radius: Option<f32>,
    pub orbit_speed_deg: Option<f32>,
    pub orbit_path_id: Option<String>,
    pub orbit_start_angle_deg: Option<f32>,
    pub orbit_rotation_base_deg: f32,
    pub orbit_rotation_step_deg: f32,

    pub projectile_destroy_on_hit: Option<bool>,
    /// `none` / `default` / `drop` / `throw`
    pub child_behavior: Option<String>,
    pub direction: Option<(f32, f32)>,
    pub debug: bool,
    pub condition_rules: Vec<SpawnRule>,

    /// How many rule-triggered spawns deep this item is.
    pub spawn_depth: u32,
}

impl Default for ItemParams {
    fn default() -> Self {
        Self {
            damage: None,
            radius: None,
            speed: None,
            sub_item_count: 0,
            orbit_radius: None,
            orbit_speed_deg: None,
            orbit_path_id: None,
            orbit_start_angle_deg: None,
            orbit_rotation_base_deg: 0.0,
            orbit_rotation_step_deg: 0.0,
            projectile_destroy_on_hit: None,
            child_behavior: None,
            direction: None,
            debug: false,
            condition_rules: Vec::new(),
            spawn_depth: 0,
        }
    }
}

impl ItemParams {
    pub fn with_count(mut self, count: u32) -> Self {
        self.sub_item_count = count;
        self
    }

    pub fn with_orbit(mut self, radius: f32, speed_deg: f32) -> Self {
        self.orbit_radius = Some(radius);
        self.orbit_speed_deg = Some(speed_deg);
        self
    }

    /// Params for an item spawned by a rule on an item at `depth`.
    pub fn nested(&self) -> Self {
        Self {
            debug: self.debug,
            spawn_depth: self.spawn_depth + 1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_deserializes_with_defaults() {
        let instruction: ItemInstruction =
            ron::from_str(r#"(primary: "Projectile", secondary: ["Orbit"])"#).unwrap();
        assert_eq!(instruction.primary, "Projectile");
        assert_eq!(instruction.secondary, vec!["Orbit".to_string()]);
        assert!(!instruction.isolate_secondary_settings);
    }

    #[test]
    fn params_fill_missing_fields() {
        let params: ItemParams = ron::from_str("(sub_item_count: 4, orbit_radius: Some(2.0))").unwrap();
        assert_eq!(params.sub_item_count, 4);
        assert_eq!(params.orbit_radius, Some(2.0));
        assert_eq!(params.projectile_destroy_on_hit, None);
    }

    #[test]
    fn nested_params_bump_depth_only() {
        let params = ItemParams {
            sub_item_count: 3,
            spawn_depth: 1,
            ..Default::default()
        };
        let nested = params.nested();
        assert_eq!(nested.spawn_depth, 2);
        assert_eq!(nested.sub_item_count, 0);
    }
}
