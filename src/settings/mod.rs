//! Settings module - loosely-typed mechanic settings, normalization and merging.

mod merge;
pub mod normalize;
mod value;

pub use merge::{
    create_effective_settings, fill_setting, flatten_definition, set_setting, strip_override_keys,
    SecondarySettings, OVERRIDES_KEY,
};
pub use value::{settings_from_json, settings_map, SettingValue, SettingsMap};
