//! Effective settings for one build pass.
//!
//! The primary's own definition is the base. Each secondary contributes its
//! plain properties only where the base (or an earlier secondary) left a gap,
//! then its `overrides` block unconditionally. Overrides are therefore
//! last-secondary-wins while plain properties never clobber the primary.
//! Alias spellings of a key (`destroyOnHit`, `destroy_on_hit`) count as one key.

use super::normalize::normalize_key;
use super::value::{SettingValue, SettingsMap};

/// Key holding the unconditional override block inside a definition.
pub const OVERRIDES_KEY: &str = "overrides";

/// One secondary mechanic's contribution to a merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecondarySettings {
    pub mechanic_name: String,
    pub properties: SettingsMap,
    pub overrides: SettingsMap,
}

impl SecondarySettings {
    /// Split a loaded definition into plain properties and overrides.
    pub fn from_definition(mechanic_name: &str, definition: &SettingsMap) -> Self {
        let mut properties = definition.clone();
        let overrides = properties
            .remove(OVERRIDES_KEY)
            .and_then(|value| match value {
                SettingValue::Map(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            mechanic_name: mechanic_name.to_string(),
            properties,
            overrides,
        }
    }

    /// Whether this secondary belongs to the named mechanic (alias tolerant).
    pub fn is(&self, mechanic: &str) -> bool {
        normalize_key(&self.mechanic_name) == normalize_key(mechanic)
    }
}

/// Merge a base definition with an ordered list of secondaries.
pub fn create_effective_settings(base: &SettingsMap, secondaries: &[SecondarySettings]) -> SettingsMap {
    let mut merged = base.clone();
    merged.remove(OVERRIDES_KEY);

    for secondary in secondaries {
        for (key, value) in &secondary.properties {
            fill_setting(&mut merged, key, value.clone());
        }
        for (key, value) in &secondary.overrides {
            set_setting(&mut merged, key, value.clone());
        }
    }

    merged
}

/// Fold a definition's own override block into its properties.
///
/// Used when a mechanic's settings are applied to itself (a modifier reading
/// its own JSON), where the split between plain and override keys does not
/// matter.
pub fn flatten_definition(definition: &SettingsMap) -> SettingsMap {
    let split = SecondarySettings::from_definition("", definition);
    let mut flat = split.properties;
    flat.extend(split.overrides);
    flat
}

/// Replace a key, dropping any alias spelling of it first.
pub fn set_setting(settings: &mut SettingsMap, key: &str, value: SettingValue) {
    let wanted = normalize_key(key);
    settings.retain(|candidate, _| normalize_key(candidate) != wanted);
    settings.insert(key.to_string(), value);
}

/// Insert a key only when no spelling of it is present.
pub fn fill_setting(settings: &mut SettingsMap, key: &str, value: SettingValue) -> bool {
    let wanted = normalize_key(key);
    if settings.keys().any(|candidate| normalize_key(candidate) == wanted) {
        return false;
    }
    settings.insert(key.to_string(), value);
    true
}

/// Remove the given override keys from every secondary of one mechanic.
///
/// Builders call this when a generic override would break a primary-specific
/// invariant, e.g. an Orbit `radius` override resizing a projectile collider.
pub fn strip_override_keys(secondaries: &mut [SecondarySettings], mechanic: &str, keys: &[&str]) {
    for secondary in secondaries.iter_mut().filter(|s| s.is(mechanic)) {
        let wanted: Vec<String> = keys.iter().map(|k| normalize_key(k)).collect();
        secondary
            .overrides
            .retain(|key, _| !wanted.contains(&normalize_key(key)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::normalize;
    use crate::settings::value::settings_map;

    fn secondary(name: &str, properties: SettingsMap, overrides: SettingsMap) -> SecondarySettings {
        SecondarySettings {
            mechanic_name: name.to_string(),
            properties,
            overrides,
        }
    }

    #[test]
    fn plain_properties_only_fill_gaps() {
        let base = settings_map([("speed", 5.into())]);
        let a = secondary(
            "A",
            settings_map([("speed", 1.into()), ("radius", 2.into())]),
            SettingsMap::new(),
        );
        let merged = create_effective_settings(&base, &[a]);
        assert_eq!(merged.get("speed"), Some(&SettingValue::Int(5)));
        assert_eq!(merged.get("radius"), Some(&SettingValue::Int(2)));
    }

    #[test]
    fn first_plain_property_wins_among_secondaries() {
        let base = SettingsMap::new();
        let a = secondary("A", settings_map([("k", 1.into())]), SettingsMap::new());
        let b = secondary("B", settings_map([("k", 2.into())]), SettingsMap::new());
        let merged = create_effective_settings(&base, &[a, b]);
        assert_eq!(merged.get("k"), Some(&SettingValue::Int(1)));
    }

    #[test]
    fn overrides_replace_and_last_secondary_wins() {
        let base = settings_map([("k", 0.into())]);
        let a = secondary("A", SettingsMap::new(), settings_map([("k", 1.into())]));
        let b = secondary("B", SettingsMap::new(), settings_map([("k", 2.into())]));

        let ab = create_effective_settings(&base, &[a.clone(), b.clone()]);
        assert_eq!(ab.get("k"), Some(&SettingValue::Int(2)));

        let ba = create_effective_settings(&base, &[b.clone(), a]);
        assert_eq!(ba.get("k"), Some(&SettingValue::Int(1)));

        // Reversing only changes K when the other secondary also overrides it
        let plain_a = secondary("A", settings_map([("k", 1.into())]), SettingsMap::new());
        let b_then_plain = create_effective_settings(&base, &[b.clone(), plain_a.clone()]);
        let plain_then_b = create_effective_settings(&base, &[plain_a, b]);
        assert_eq!(b_then_plain.get("k"), plain_then_b.get("k"));
    }

    #[test]
    fn alias_spellings_merge_as_one_key() {
        let base = settings_map([("destroyOnHit", true.into()), ("radius", 1.into())]);
        let a = secondary(
            "Explosion",
            settings_map([("Radius", 5.into())]),
            settings_map([("destroy_on_hit", false.into())]),
        );
        let merged = create_effective_settings(&base, &[a]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("radius"), Some(&SettingValue::Int(1)));
        assert_eq!(merged.get("destroy_on_hit"), Some(&SettingValue::Bool(false)));
        assert!(!normalize::bool(Some(&merged), &["destroyOnHit", "DestroyOnHit", "destroy_on_hit"], true));
    }

    #[test]
    fn merge_is_idempotent() {
        let base = settings_map([("speed", 5.into())]);
        let a = secondary("A", settings_map([("radius", 1.into())]), settings_map([("speed", 9.into())]));
        let once = create_effective_settings(&base, &[a.clone()]);
        let twice = create_effective_settings(&once, &[a]);
        assert_eq!(once, twice);
    }

    #[test]
    fn definitions_split_their_override_block() {
        let definition = settings_map([
            ("angularSpeedDeg", 90.into()),
            (OVERRIDES_KEY, SettingValue::Map(settings_map([("radius", 2.into())]))),
        ]);
        let split = SecondarySettings::from_definition("Orbit", &definition);
        assert!(split.properties.contains_key("angularSpeedDeg"));
        assert!(!split.properties.contains_key(OVERRIDES_KEY));
        assert_eq!(split.overrides.get("radius"), Some(&SettingValue::Int(2)));
    }

    #[test]
    fn stripping_targets_only_the_named_mechanic() {
        let mut secondaries = vec![
            secondary("Orbit", SettingsMap::new(), settings_map([("radius", 2.into())])),
            secondary("Explosion", SettingsMap::new(), settings_map([("radius", 3.into())])),
        ];
        strip_override_keys(&mut secondaries, "orbit", &["radius"]);
        assert!(secondaries[0].overrides.is_empty());
        assert_eq!(secondaries[1].overrides.len(), 1);
    }

    #[test]
    fn set_replaces_alias_spellings() {
        let mut settings = settings_map([("destroy_on_hit", true.into())]);
        set_setting(&mut settings, "destroyOnHit", false.into());
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("destroyOnHit"), Some(&SettingValue::Bool(false)));
        assert!(!fill_setting(&mut settings, "DestroyOnHit", true.into()));
        assert!(fill_setting(&mut settings, "radius", 1.into()));
    }
}
