//! Loosely-typed setting values as read from mechanic JSON definitions.

use bevy::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered string-keyed settings bag.
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// A single setting value.
///
/// JSON authors are inconsistent about types (`"12.5"` vs `12.5`, `1` vs
/// `true`), so values are stored as written and coerced on read by the
/// functions in [`super::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Color(Color),
    Vec2(Vec2),
    /// Nested arrays (spawn rules, direction lists).
    List(Vec<SettingValue>),
    /// Nested objects (`overrides`, rule bodies).
    Map(SettingsMap),
}

impl SettingValue {
    /// Convert a JSON value. `null` has no representation and yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(fields) => {
                // {x, y} and {r, g, b[, a]} objects are promoted to typed values
                if fields.len() == 2 {
                    if let (Some(x), Some(y)) = (number(fields.get("x")), number(fields.get("y"))) {
                        return Some(Self::Vec2(Vec2::new(x, y)));
                    }
                }
                if (3..=4).contains(&fields.len()) {
                    if let (Some(r), Some(g), Some(b)) = (
                        number(fields.get("r")),
                        number(fields.get("g")),
                        number(fields.get("b")),
                    ) {
                        let a = number(fields.get("a")).unwrap_or(1.0);
                        return Some(Self::Color(Color::srgba(r, g, b, a)));
                    }
                }
                Some(Self::Map(settings_from_json_object(fields)))
            }
        }
    }

    /// Numeric view used by the normalizer (bools count as 0/1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SettingsMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SettingValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

fn number(value: Option<&Value>) -> Option<f32> {
    value.and_then(Value::as_f64).map(|v| v as f32)
}

fn settings_from_json_object(fields: &serde_json::Map<String, Value>) -> SettingsMap {
    fields
        .iter()
        .filter_map(|(key, value)| SettingValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Build a settings map from a JSON document. Non-object documents yield an
/// empty map.
pub fn settings_from_json(value: &Value) -> SettingsMap {
    match value {
        Value::Object(fields) => settings_from_json_object(fields),
        _ => SettingsMap::new(),
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for SettingValue {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Color> for SettingValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Vec2> for SettingValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

/// Convenience builder for small settings maps in code.
///
/// ```ignore
/// let settings = settings_map([("radius", 2.0.into()), ("pathId", "circular".into())]);
/// ```
pub fn settings_map<const N: usize>(entries: [(&str, SettingValue); N]) -> SettingsMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
