//! Typed reads over a loosely-typed settings bag.
//!
//! Every reader takes a list of candidate keys tried in order. A key matches
//! exactly first, then case-insensitively with `_` and `-` ignored, so
//! `destroyOnHit`, `DestroyOnHit` and `destroy_on_hit` all resolve to the same
//! entry. The first present *and parseable* value wins; anything else falls
//! back to the supplied default. None of these functions can fail.

use bevy::prelude::*;

use super::value::{SettingValue, SettingsMap};

/// Canonical form used for alias matching.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the raw value for one key (exact, then normalized).
pub fn find<'a>(settings: &'a SettingsMap, key: &str) -> Option<&'a SettingValue> {
    if let Some(value) = settings.get(key) {
        return Some(value);
    }
    let wanted = normalize_key(key);
    settings
        .iter()
        .find(|(candidate, _)| normalize_key(candidate) == wanted)
        .map(|(_, value)| value)
}

/// Raw lookup across candidate keys without any parsing.
pub fn lookup<'a>(settings: Option<&'a SettingsMap>, keys: &[&str]) -> Option<&'a SettingValue> {
    let settings = settings?;
    keys.iter().find_map(|key| find(settings, key))
}

fn first_parsed<T>(
    settings: Option<&SettingsMap>,
    keys: &[&str],
    parse: impl Fn(&SettingValue) -> Option<T>,
) -> Option<T> {
    let settings = settings?;
    keys.iter()
        .find_map(|key| find(settings, key).and_then(&parse))
}

pub fn parse_bool(value: &SettingValue) -> Option<bool> {
    match value {
        SettingValue::Bool(b) => Some(*b),
        SettingValue::Int(i) => Some(*i != 0),
        SettingValue::Float(f) => Some(*f != 0.0),
        SettingValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_float(value: &SettingValue) -> Option<f32> {
    match value {
        SettingValue::Bool(_) => None,
        other => other.as_f64().filter(|v| v.is_finite()).map(|v| v as f32),
    }
}

fn parse_int(value: &SettingValue) -> Option<i64> {
    match value {
        SettingValue::Int(i) => Some(*i),
        SettingValue::Bool(_) => None,
        other => other.as_f64().filter(|v| v.is_finite()).map(|v| v.round() as i64),
    }
}

/// Parse hex (`#RRGGBB`, `#RRGGBBAA`, short forms) or a small set of names.
pub fn parse_color(value: &SettingValue) -> Option<Color> {
    match value {
        SettingValue::Color(c) => Some(*c),
        SettingValue::String(s) => parse_color_str(s),
        SettingValue::List(items) if (3..=4).contains(&items.len()) => {
            let channels: Vec<f32> = items.iter().filter_map(parse_float).collect();
            match channels.as_slice() {
                [r, g, b] => Some(Color::srgb(*r, *g, *b)),
                [r, g, b, a] => Some(Color::srgba(*r, *g, *b, *a)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_color_str(raw: &str) -> Option<Color> {
    let name = raw.trim().to_ascii_lowercase();
    let named = match name.as_str() {
        "white" => Some(Color::WHITE),
        "black" => Some(Color::BLACK),
        "clear" | "transparent" => Some(Color::NONE),
        "red" => Some(Color::srgb(1.0, 0.0, 0.0)),
        "green" => Some(Color::srgb(0.0, 1.0, 0.0)),
        "blue" => Some(Color::srgb(0.0, 0.0, 1.0)),
        "yellow" => Some(Color::srgb(1.0, 0.92, 0.016)),
        "cyan" => Some(Color::srgb(0.0, 1.0, 1.0)),
        "magenta" => Some(Color::srgb(1.0, 0.0, 1.0)),
        "orange" => Some(Color::srgb(1.0, 0.55, 0.0)),
        "purple" => Some(Color::srgb(0.5, 0.0, 0.5)),
        "gray" | "grey" => Some(Color::srgb(0.5, 0.5, 0.5)),
        _ => None,
    };
    named.or_else(|| Srgba::hex(&name).ok().map(Color::from))
}

fn parse_vec2(value: &SettingValue) -> Option<Vec2> {
    match value {
        SettingValue::Vec2(v) => Some(*v),
        SettingValue::List(items) if items.len() == 2 => {
            Some(Vec2::new(parse_float(&items[0])?, parse_float(&items[1])?))
        }
        SettingValue::String(s) => {
            let mut parts = s.split(',').map(|p| p.trim().parse::<f32>());
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(y)), None) => Some(Vec2::new(x, y)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_string(value: &SettingValue) -> Option<String> {
    match value {
        SettingValue::String(s) => Some(s.clone()),
        SettingValue::Bool(b) => Some(b.to_string()),
        SettingValue::Int(i) => Some(i.to_string()),
        SettingValue::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

pub fn bool(settings: Option<&SettingsMap>, keys: &[&str], default: bool) -> bool {
    first_parsed(settings, keys, parse_bool).unwrap_or(default)
}

/// Like [`bool`], but distinguishes "absent" from "explicitly false".
pub fn explicit_bool(settings: Option<&SettingsMap>, keys: &[&str]) -> Option<bool> {
    first_parsed(settings, keys, parse_bool)
}

pub fn int(settings: Option<&SettingsMap>, keys: &[&str], default: i64) -> i64 {
    first_parsed(settings, keys, parse_int).unwrap_or(default)
}

pub fn float(settings: Option<&SettingsMap>, keys: &[&str], default: f32) -> f32 {
    first_parsed(settings, keys, parse_float).unwrap_or(default)
}

/// Non-negative float.
pub fn radius(settings: Option<&SettingsMap>, keys: &[&str], default: f32) -> f32 {
    first_parsed(settings, keys, |v| parse_float(v).filter(|r| *r >= 0.0)).unwrap_or(default)
}

/// Non-negative float.
pub fn speed(settings: Option<&SettingsMap>, keys: &[&str], default: f32) -> f32 {
    first_parsed(settings, keys, |v| parse_float(v).filter(|s| *s >= 0.0)).unwrap_or(default)
}

/// Non-negative float.
pub fn damage(settings: Option<&SettingsMap>, keys: &[&str], default: f32) -> f32 {
    first_parsed(settings, keys, |v| parse_float(v).filter(|d| *d >= 0.0)).unwrap_or(default)
}

/// Strictly positive seconds.
pub fn interval(settings: Option<&SettingsMap>, keys: &[&str], default: f32) -> f32 {
    first_parsed(settings, keys, |v| parse_float(v).filter(|s| *s > 0.0)).unwrap_or(default)
}

/// Non-negative whole count.
pub fn count(settings: Option<&SettingsMap>, keys: &[&str], default: u32) -> u32 {
    first_parsed(settings, keys, |v| {
        parse_int(v).filter(|c| *c >= 0).map(|c| c.min(u32::MAX as i64) as u32)
    })
    .unwrap_or(default)
}

pub fn color(settings: Option<&SettingsMap>, keys: &[&str], default: Color) -> Color {
    first_parsed(settings, keys, parse_color).unwrap_or(default)
}

pub fn string(settings: Option<&SettingsMap>, keys: &[&str], default: &str) -> String {
    first_parsed(settings, keys, parse_string).unwrap_or_else(|| default.to_string())
}

pub fn vec2(settings: Option<&SettingsMap>, keys: &[&str], default: Vec2) -> Vec2 {
    first_parsed(settings, keys, parse_vec2).unwrap_or(default)
}

/// Optional vector, `None` when no key is present or parseable.
pub fn explicit_vec2(settings: Option<&SettingsMap>, keys: &[&str]) -> Option<Vec2> {
    first_parsed(settings, keys, parse_vec2)
}
