//! Orbit: moves a payload along a path around its center.
//!
//! Parented orbiters move in their parent's local space. Detached orbiters
//! circle their owner's world position. Siblings under one parent are kept
//! evenly spaced whenever the set of orbiters changes.

mod path;

pub use path::OrbitPath;

use bevy::prelude::*;
use bevy_rapier2d::prelude::RigidBody;
use std::collections::HashMap;
use std::f32::consts::TAU;

use super::contract::{Mechanic, MechanicContext, MechanicInit};
use crate::core::Lifecycle;
use crate::settings::{normalize, SettingsMap};

#[derive(Component, Debug, Clone)]
pub struct OrbitMechanic {
    pub radius: f32,
    pub angular_speed_deg: f32,
    pub path_id: String,
    pub path: OrbitPath,
    pub start_angle_deg: f32,
    /// Rotation of the whole path around the center.
    pub path_rotation_deg: f32,
    /// Current position along the path, radians.
    pub angle: f32,
    lifecycle: Lifecycle,
}

impl Default for OrbitMechanic {
    fn default() -> Self {
        Self {
            radius: 1.5,
            angular_speed_deg: 120.0,
            path_id: "circular".to_string(),
            path: OrbitPath::Circular { radius: 1.5 },
            start_angle_deg: 0.0,
            path_rotation_deg: 0.0,
            angle: 0.0,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl OrbitMechanic {
    pub fn rotation(&self) -> Vec2 {
        Vec2::from_angle(self.path_rotation_deg.to_radians())
    }

    /// Position on the (rotated) path for the current angle.
    pub fn position(&self, center: Vec2) -> Vec2 {
        center + self.rotation().rotate(self.path.evaluate_position(Vec2::ZERO, self.angle))
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.angular_speed_deg.to_radians() * dt).rem_euclid(TAU);
    }
}

impl Mechanic for OrbitMechanic {
    const NAME: &'static str = "Orbit";
    const ALIASES: &'static [&'static str] = &["OrbitMechanic"];
    const INITIALIZE_ORDER: i32 = 10;

    fn apply_settings(&mut self, settings: &SettingsMap) {
        let s = Some(settings);
        self.radius = normalize::radius(s, &["orbitRadius", "radius"], self.radius);
        self.angular_speed_deg = normalize::float(
            s,
            &["angularSpeedDeg", "orbitSpeedDeg", "angularSpeed"],
            self.angular_speed_deg,
        );
        self.start_angle_deg = normalize::float(s, &["startAngleDeg", "startAngle"], self.start_angle_deg);
        self.path_rotation_deg =
            normalize::float(s, &["pathRotationDeg", "pathRotation"], self.path_rotation_deg);

        let path_id = normalize::string(s, &["pathId", "path"], &self.path_id);
        if path_id != self.path_id {
            // A new shape replaces the old one outright
            self.path = OrbitPath::from_id(&path_id, self.radius);
            self.path_id = path_id;
        } else {
            self.path.resize(self.radius);
        }
    }

    fn initialize(&mut self, init: &MechanicInit) {
        let offset = Vec2::from_angle(-self.path_rotation_deg.to_radians()).rotate(init.local_offset);
        self.angle = self
            .path
            .resolve_initial_angle(offset, self.start_angle_deg.to_radians());
    }

    fn reset_for_reuse(&mut self) {
        self.angle = self.start_angle_deg.to_radians();
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

/// Orbiters currently tracked under one parent, sorted.
#[derive(Component, Debug, Clone, Default)]
pub struct OrbitRoster {
    pub members: Vec<Entity>,
}

fn step_orbit(
    dt: f32,
    orbit: &mut OrbitMechanic,
    transform: &mut Transform,
    parent: Option<&Parent>,
    ctx: &MechanicContext,
    centers: &Query<&GlobalTransform>,
) {
    if !orbit.lifecycle.is_running() {
        return;
    }
    orbit.advance(dt);
    let center = match parent {
        Some(_) => Vec2::ZERO,
        None => centers
            .get(ctx.owner)
            .map(|t| t.translation().truncate())
            .unwrap_or(Vec2::ZERO),
    };
    let position = orbit.position(center);
    transform.translation.x = position.x;
    transform.translation.y = position.y;
}

/// Orbiters without a physics body move every frame.
pub fn tick_orbits(
    time: Res<Time>,
    mut orbits: Query<
        (&mut OrbitMechanic, &mut Transform, Option<&Parent>, &MechanicContext),
        Without<RigidBody>,
    >,
    centers: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();
    for (mut orbit, mut transform, parent, ctx) in orbits.iter_mut() {
        step_orbit(dt, &mut orbit, &mut transform, parent, ctx, &centers);
    }
}

/// Orbiters with a physics body move on the fixed step.
pub fn tick_orbits_fixed(
    time: Res<Time>,
    mut orbits: Query<
        (&mut OrbitMechanic, &mut Transform, Option<&Parent>, &MechanicContext),
        With<RigidBody>,
    >,
    centers: Query<&GlobalTransform>,
) {
    let dt = time.delta_secs();
    for (mut orbit, mut transform, parent, ctx) in orbits.iter_mut() {
        step_orbit(dt, &mut orbit, &mut transform, parent, ctx, &centers);
    }
}

/// Evenly spread `angles` (paired with path rotations) around the circle,
/// keeping their current cyclic order. Returns the new angles, radians.
pub fn spread_evenly(current: &[(f32, f32)]) -> Vec<f32> {
    let count = current.len();
    if count == 0 {
        return Vec::new();
    }
    let phases: Vec<f32> = current
        .iter()
        .map(|(angle, rotation)| (angle + rotation).rem_euclid(TAU))
        .collect();
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|a, b| phases[*a].total_cmp(&phases[*b]));

    let anchor = phases[order[0]];
    let step = TAU / count as f32;
    let mut angles = vec![0.0; count];
    for (slot, index) in order.into_iter().enumerate() {
        let rotation = current[index].1;
        angles[index] = (anchor + step * slot as f32 - rotation).rem_euclid(TAU);
    }
    angles
}

/// Re-space sibling orbiters whenever membership under a parent changes.
pub fn redistribute_orbits(
    mut commands: Commands,
    orbiters: Query<(Entity, &Parent), With<OrbitMechanic>>,
    mut mechanics: Query<&mut OrbitMechanic>,
    mut rosters: Query<(Entity, &mut OrbitRoster)>,
) {
    let mut groups: HashMap<Entity, Vec<Entity>> = HashMap::new();
    for (entity, parent) in orbiters.iter() {
        groups.entry(parent.get()).or_default().push(entity);
    }

    for (holder, _) in rosters.iter() {
        if !groups.contains_key(&holder) {
            commands.entity(holder).remove::<OrbitRoster>();
        }
    }

    for (parent, mut members) in groups {
        members.sort();
        if rosters.get(parent).is_ok_and(|(_, roster)| roster.members == members) {
            continue;
        }

        let mut current = Vec::with_capacity(members.len());
        for member in &members {
            let Ok(orbit) = mechanics.get(*member) else {
                continue;
            };
            if !orbit.lifecycle.is_initialized() {
                // Wait until every member has its starting angle
                current.clear();
                break;
            }
            current.push((orbit.angle, orbit.path_rotation_deg.to_radians()));
        }
        if current.len() != members.len() {
            continue;
        }

        let angles = spread_evenly(&current);
        for (member, angle) in members.iter().zip(angles) {
            if let Ok(mut orbit) = mechanics.get_mut(*member) {
                orbit.angle = angle;
            }
        }
        debug!("Redistributed {} orbiters under {:?}", members.len(), parent);

        match rosters.get_mut(parent) {
            Ok((_, mut roster)) => roster.members = members,
            Err(_) => {
                commands.entity(parent).insert(OrbitRoster { members });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings_map;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn path_id_change_swaps_shape() {
        let mut orbit = OrbitMechanic::default();
        orbit.apply_settings(&settings_map([("pathId", "figureEight".into()), ("radius", 2.into())]));
        assert!(matches!(orbit.path, OrbitPath::FigureEight { width, .. } if width == 2.0));
        orbit.apply_settings(&settings_map([("radius", 3.into())]));
        assert!(matches!(orbit.path, OrbitPath::FigureEight { width, .. } if width == 3.0));
    }

    #[test]
    fn advance_uses_degrees_per_second() {
        let mut orbit = OrbitMechanic {
            angular_speed_deg: 90.0,
            ..Default::default()
        };
        orbit.advance(1.0);
        assert!((orbit.angle - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn rotation_offsets_position() {
        let orbit = OrbitMechanic {
            path_rotation_deg: 90.0,
            ..Default::default()
        };
        let position = orbit.position(Vec2::ZERO);
        assert!(position.abs_diff_eq(Vec2::new(0.0, 1.5), 1e-5));
    }

    #[test]
    fn spreading_keeps_cyclic_order() {
        let angles = spread_evenly(&[(0.0, 0.0), (0.3, 0.0), (PI, 0.0)]);
        let step = TAU / 3.0;
        assert!(angles[0].abs() < 1e-5);
        assert!((angles[1] - step).abs() < 1e-5);
        assert!((angles[2] - 2.0 * step).abs() < 1e-5);
    }

    #[test]
    fn spreading_compensates_rotation() {
        let angles = spread_evenly(&[(0.0, 0.0), (0.0, FRAC_PI_2)]);
        // Second orbiter's phase is PI/2 + angle, it should land on PI
        assert!((angles[1] - FRAC_PI_2).abs() < 1e-5);
        assert!(angles[0].abs() < 1e-5);
    }
}
