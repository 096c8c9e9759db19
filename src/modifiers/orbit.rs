//! Orbit as a secondary: place a batch evenly around the root.

use bevy::prelude::*;

use super::strategy::{has_mechanic, ModifierRequest, ModifierStrategy};
use crate::catalog::{MechanicKind, PrimaryKind};
use crate::generator::{ItemGenerator, ItemParams};
use crate::mechanics::{
    DropMovement, Mechanic, OrbitMechanic, ProjectileMechanic, ThrowMovement, DESTROY_ON_HIT_KEYS,
};
use crate::settings::{normalize, set_setting, SettingsMap};

/// Primaries that own their placement and cannot be carried around.
const FIXED_PRIMARIES: [MechanicKind; 4] = [
    MechanicKind::Beam,
    MechanicKind::Whip,
    MechanicKind::Ripple,
    MechanicKind::Strike,
];

pub struct OrbitStrategy;

/// Start angle and path rotation for member `index` of `count`, degrees.
///
/// Rotation is subtracted from the start so the visible phases stay evenly
/// spaced whatever the per-member path rotation.
pub fn group_placement(base_deg: f32, rotation_base: f32, rotation_step: f32, index: usize, count: usize) -> (f32, f32) {
    let rotation = rotation_base + rotation_step * index as f32;
    let spacing = 360.0 / count.max(1) as f32;
    (base_deg + index as f32 * spacing - rotation, rotation)
}

/// Session params win over the Orbit definition.
fn with_params(mut settings: SettingsMap, params: &ItemParams) -> SettingsMap {
    if let Some(radius) = params.orbit_radius {
        set_setting(&mut settings, "orbitRadius", radius.into());
    }
    if let Some(speed) = params.orbit_speed_deg {
        set_setting(&mut settings, "angularSpeedDeg", speed.into());
    }
    if let Some(path) = &params.orbit_path_id {
        set_setting(&mut settings, "pathId", path.as_str().into());
    }
    settings
}

impl ModifierStrategy for OrbitStrategy {
    fn name(&self) -> &'static str {
        OrbitMechanic::NAME
    }

    fn aliases(&self) -> &'static [&'static str] {
        OrbitMechanic::ALIASES
    }

    fn is_compatible(&self, generator: &ItemGenerator, target: Entity) -> bool {
        let fixed = generator
            .world()
            .get::<PrimaryKind>(target)
            .is_some_and(|kind| FIXED_PRIMARIES.contains(&kind.0));
        let detached =
            has_mechanic(generator, target, DropMovement::NAME) || has_mechanic(generator, target, ThrowMovement::NAME);
        !fixed && !detached
    }

    fn apply(&self, generator: &mut ItemGenerator, target: Entity, request: &ModifierRequest) {
        self.apply_to_group(generator, &[target], request);
    }

    fn apply_to_group(&self, generator: &mut ItemGenerator, targets: &[Entity], request: &ModifierRequest) {
        let params = &request.plan.params;
        let settings = with_params(request.settings.clone(), params);
        let s = Some(&settings);

        let base = params
            .orbit_start_angle_deg
            .unwrap_or_else(|| normalize::float(s, &["startAngleDeg", "startAngle"], 0.0));
        let rotation_base = if params.orbit_rotation_base_deg != 0.0 {
            params.orbit_rotation_base_deg
        } else {
            normalize::float(s, &["rotationBaseDeg"], 0.0)
        };
        let rotation_step = if params.orbit_rotation_step_deg != 0.0 {
            params.orbit_rotation_step_deg
        } else {
            normalize::float(s, &["rotationStepDeg"], 0.0)
        };
        let destroy_on_hit = normalize::explicit_bool(Some(&request.settings), &DESTROY_ON_HIT_KEYS);

        for (index, target) in targets.iter().enumerate() {
            let (start, rotation) = group_placement(base, rotation_base, rotation_step, index, targets.len());
            let mut member = settings.clone();
            set_setting(&mut member, "startAngleDeg", start.into());
            set_setting(&mut member, "pathRotationDeg", rotation.into());
            generator.add_mechanic_by_name(*target, OrbitMechanic::NAME, &member);

            let world = generator.world_mut();
            let position = world.get_mut::<OrbitMechanic>(*target).map(|mut orbit| {
                orbit.angle = start.to_radians();
                orbit.position(Vec2::ZERO)
            });
            if let (Some(position), Some(mut transform)) = (position, world.get_mut::<Transform>(*target)) {
                transform.translation.x = position.x;
                transform.translation.y = position.y;
            }

            if has_mechanic(generator, *target, ProjectileMechanic::NAME) {
                generator.set_existing_mechanic_setting(*target, ProjectileMechanic::NAME, "disableSelfSpeed", true.into());
                if let Some(destroy) = destroy_on_hit {
                    generator.set_existing_mechanic_setting(*target, ProjectileMechanic::NAME, "destroyOnHit", destroy.into());
                }
            }
        }
        debug!("Placed {} orbiters starting at {}°", targets.len(), base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_members_are_a_quarter_apart() {
        let starts: Vec<f32> = (0..4).map(|i| group_placement(0.0, 0.0, 0.0, i, 4).0).collect();
        assert_eq!(starts, vec![0.0, 90.0, 180.0, 270.0]);
    }

    #[test]
    fn rotation_is_compensated_in_start_angle() {
        let (start, rotation) = group_placement(10.0, 30.0, 15.0, 2, 3);
        assert_eq!(rotation, 60.0);
        assert!((start - (10.0 + 240.0 - 60.0)).abs() < 1e-4);
        // The visible phase is start + rotation
        assert!((start + rotation - 250.0).abs() < 1e-4);
    }

    #[test]
    fn params_override_orbit_definition() {
        let params = ItemParams::default().with_orbit(2.0, 90.0);
        let settings = with_params(crate::settings::settings_map([("orbitRadius", 1.0.into())]), &params);
        assert_eq!(normalize::radius(Some(&settings), &["orbitRadius", "radius"], 0.0), 2.0);
        assert_eq!(normalize::float(Some(&settings), &["angularSpeedDeg"], 0.0), 90.0);
    }
}
