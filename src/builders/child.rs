//! What one sub-item looks like before it is spawned.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody};

use crate::rendering::VisualSpec;
use crate::settings::SettingsMap;

/// Description of a single child: pose, shape, body and mechanics.
///
/// Builders produce these; `ItemGenerator::create_child` turns them into
/// entities.
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub name: String,
    /// Local position under the root.
    pub offset: Vec2,
    /// Local rotation, radians.
    pub rotation: f32,
    pub visual: Option<VisualSpec>,
    /// Trigger volume; always a sensor.
    pub collider: Option<Collider>,
    /// Keep an `Overlaps` set for the sensor.
    pub track_overlaps: bool,
    pub body: Option<RigidBody>,
    /// Primary mechanic name and its settings.
    pub primary: &'static str,
    pub settings: SettingsMap,
    /// Further mechanics attached right after the primary (movement).
    pub extras: Vec<(&'static str, SettingsMap)>,
}

impl ChildSpec {
    pub fn new(primary: &'static str, settings: SettingsMap) -> Self {
        Self {
            name: primary.to_string(),
            offset: Vec2::ZERO,
            rotation: 0.0,
            visual: None,
            collider: None,
            track_overlaps: false,
            body: None,
            primary,
            settings,
            extras: Vec::new(),
        }
    }

    pub fn at(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_visual(mut self, visual: VisualSpec) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn with_sensor(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn tracking_overlaps(mut self) -> Self {
        self.track_overlaps = true;
        self
    }

    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_extra(mut self, mechanic: &'static str, settings: SettingsMap) -> Self {
        self.extras.push((mechanic, settings));
        self
    }
}
