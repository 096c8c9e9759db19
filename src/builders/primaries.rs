//! One builder per primary kind, behind a static dispatch table.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody};

use super::build::{with_movement, PrimaryBuilder};
use super::child::ChildSpec;
use super::plan::BuildPlan;
use crate::catalog::MechanicKind;
use crate::generator::ItemGenerator;
use crate::mechanics::{
    sector_collider, AuraMechanic, BeamMechanic, Mechanic, ProjectileMechanic, RippleMechanic,
    StrikeMechanic, SubItemsOnConditionMechanic, SwordSlashMechanic, WhipHitMode, WhipMechanic,
};
use crate::rendering::VisualSpec;
use crate::settings::{normalize, set_setting, strip_override_keys, SecondarySettings, SettingsMap};

const PROJECTILE_COLOR: Color = Color::srgb(1.0, 0.82, 0.29);
const TRIGGER_COLOR: Color = Color::srgba(0.8, 0.5, 1.0, 0.6);

pub fn builder_for(kind: MechanicKind) -> &'static dyn PrimaryBuilder {
    match kind {
        MechanicKind::Projectile => &ProjectileBuilder,
        MechanicKind::Aura => &AuraBuilder,
        MechanicKind::Strike => &StrikeBuilder,
        MechanicKind::Whip => &WhipBuilder,
        MechanicKind::Ripple => &RippleBuilder,
        MechanicKind::SwordSlash => &SwordSlashBuilder,
        MechanicKind::Beam => &BeamBuilder,
        MechanicKind::SubItemsOnCondition => &SubItemsBuilder,
    }
}

/// Plan settings with the resolved direction written in.
fn aimed_settings(plan: &BuildPlan, direction: Vec2) -> SettingsMap {
    let mut settings = plan.settings.clone();
    set_setting(&mut settings, "direction", direction.into());
    settings
}

pub struct ProjectileBuilder;

impl ProjectileBuilder {
    /// Multiple projectiles fan out around the plan direction.
    fn fan_direction(plan: &BuildPlan, index: u32) -> Vec2 {
        let count = plan.count.max(1);
        let spread = normalize::float(Some(&plan.settings), &["spreadDeg", "spread"], 15.0);
        let slot = (index % count) as f32 - (count - 1) as f32 * 0.5;
        Vec2::from_angle((slot * spread).to_radians()).rotate(plan.direction)
    }
}

impl PrimaryBuilder for ProjectileBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Projectile
    }

    fn sanitize(&self, secondaries: &mut [SecondarySettings]) {
        // Orbit's radius is the orbit's, not the projectile collider's
        strip_override_keys(secondaries, "Orbit", &["radius"]);
    }

    fn child_spec(&self, plan: &BuildPlan, index: u32) -> ChildSpec {
        let direction = Self::fan_direction(plan, index);
        let radius = normalize::radius(Some(&plan.settings), &["radius", "colliderRadius"], 0.25);
        let mut settings = aimed_settings(plan, direction);
        set_setting(&mut settings, "destroyOnHit", plan.destroy_on_hit.into());
        set_setting(&mut settings, "directionFromResolver", plan.direction_from_resolver.into());

        let spec = ChildSpec::new(ProjectileMechanic::NAME, settings)
            .with_visual(VisualSpec::from_settings(&plan.settings, radius, PROJECTILE_COLOR))
            .with_sensor(Collider::ball(radius))
            .with_body(RigidBody::KinematicVelocityBased);
        with_movement(spec, plan, direction)
    }
}

pub struct AuraBuilder;

impl PrimaryBuilder for AuraBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Aura
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        // The aura spawns its own query collider and overlay
        with_movement(ChildSpec::new(AuraMechanic::NAME, plan.settings.clone()), plan, plan.direction)
    }
}

pub struct StrikeBuilder;

impl PrimaryBuilder for StrikeBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Strike
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        ChildSpec::new(StrikeMechanic::NAME, plan.settings.clone())
    }
}

pub struct WhipBuilder;

impl PrimaryBuilder for WhipBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Whip
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        let settings = aimed_settings(plan, plan.direction);
        let mut whip = WhipMechanic::default();
        whip.apply_settings(&settings);

        let spec = ChildSpec::new(WhipMechanic::NAME, settings)
            .with_body(RigidBody::KinematicPositionBased);
        match whip.hit_mode {
            WhipHitMode::Collider => match sector_collider(&whip.sector(Vec2::ZERO), 0.0) {
                Some(collider) => spec.with_sensor(collider).tracking_overlaps(),
                None => spec,
            },
            WhipHitMode::Poll => spec,
        }
    }
}

pub struct RippleBuilder;

impl PrimaryBuilder for RippleBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Ripple
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        with_movement(ChildSpec::new(RippleMechanic::NAME, plan.settings.clone()), plan, plan.direction)
    }
}

pub struct SwordSlashBuilder;

impl PrimaryBuilder for SwordSlashBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::SwordSlash
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        ChildSpec::new(SwordSlashMechanic::NAME, aimed_settings(plan, plan.direction))
    }
}

pub struct BeamBuilder;

impl PrimaryBuilder for BeamBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::Beam
    }

    fn child_spec(&self, plan: &BuildPlan, _index: u32) -> ChildSpec {
        let settings = aimed_settings(plan, plan.direction);
        let mut beam = BeamMechanic::default();
        beam.apply_settings(&settings);
        ChildSpec::new(BeamMechanic::NAME, settings)
            .with_sensor(beam.collider())
            .tracking_overlaps()
            .with_body(RigidBody::KinematicPositionBased)
    }
}

pub struct SubItemsBuilder;

impl PrimaryBuilder for SubItemsBuilder {
    fn kind(&self) -> MechanicKind {
        MechanicKind::SubItemsOnCondition
    }

    fn child_spec(&self, plan: &BuildPlan, index: u32) -> ChildSpec {
        let radius = normalize::radius(Some(&plan.settings), &["radius", "triggerRadius"], 0.5);
        let direction = Vec2::from_angle(index as f32 * 0.7).rotate(plan.direction);
        let spec = ChildSpec::new(SubItemsOnConditionMechanic::NAME, plan.settings.clone())
            .with_visual(VisualSpec::from_settings(&plan.settings, radius, TRIGGER_COLOR))
            .with_sensor(Collider::ball(radius))
            .with_body(RigidBody::KinematicPositionBased);
        with_movement(spec, plan, direction)
    }

    fn finish_child(&self, generator: &mut ItemGenerator, child: Entity, plan: &BuildPlan) {
        if plan.params.condition_rules.is_empty() {
            return;
        }
        if let Some(mut mechanic) = generator.world_mut().get_mut::<SubItemsOnConditionMechanic>(child) {
            mechanic.add_rules(plan.params.condition_rules.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::plan::{MovementMode, SpawnCadence};
    use crate::generator::{ItemInstruction, ItemParams};

    fn plan(kind: MechanicKind, count: u32) -> BuildPlan {
        BuildPlan {
            kind,
            instruction: ItemInstruction::new(kind.name()),
            params: ItemParams::default(),
            settings: SettingsMap::new(),
            count,
            cadence: SpawnCadence::Static,
            movement: MovementMode::Default,
            direction: Vec2::X,
            direction_from_resolver: false,
            destroy_on_hit: true,
            spawned: 0,
        }
    }

    #[test]
    fn every_kind_has_a_builder() {
        for kind in MechanicKind::ALL {
            assert_eq!(builder_for(kind).kind(), kind);
        }
    }

    #[test]
    fn projectile_fan_is_symmetric() {
        let plan = plan(MechanicKind::Projectile, 3);
        let left = ProjectileBuilder::fan_direction(&plan, 0);
        let middle = ProjectileBuilder::fan_direction(&plan, 1);
        let right = ProjectileBuilder::fan_direction(&plan, 2);
        assert!(middle.abs_diff_eq(Vec2::X, 1e-5));
        assert!((left.y + right.y).abs() < 1e-5);
    }

    #[test]
    fn projectile_strips_only_orbit_radius() {
        let mut secondaries = vec![SecondarySettings {
            mechanic_name: "Orbit".to_string(),
            overrides: crate::settings::settings_map([
                ("radius", 1.5.into()),
                ("disableSelfSpeed", true.into()),
            ]),
            ..Default::default()
        }];
        ProjectileBuilder.sanitize(&mut secondaries);
        assert!(!secondaries[0].overrides.contains_key("radius"));
        assert!(secondaries[0].overrides.contains_key("disableSelfSpeed"));
    }

    #[test]
    fn throw_movement_adds_extra_mechanic() {
        let mut plan = plan(MechanicKind::Projectile, 1);
        plan.movement = MovementMode::Throw;
        let spec = ProjectileBuilder.child_spec(&plan, 0);
        assert_eq!(spec.extras.len(), 1);
        assert_eq!(spec.extras[0].0, "ThrowMovement");
    }
}
