//! The builder contract and the build pass every primary shares.

use bevy::prelude::*;

use super::child::ChildSpec;
use super::plan::{
    resolve_count, resolve_destroy_on_hit, resolve_direction, BuildPlan, MovementMode,
    SpawnCadence,
};
use crate::catalog::MechanicKind;
use crate::generator::{ItemGenerator, ItemInstruction, ItemParams};
use crate::mechanics::{IntervalSpawner, Mechanic, SequenceSpawner};
use crate::settings::{fill_setting, set_setting, SecondarySettings, SettingsMap};

/// One build: the root to fill and what to fill it with.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub root: Entity,
    pub instruction: ItemInstruction,
    pub params: ItemParams,
}

/// Builds the children of one primary kind.
pub trait PrimaryBuilder {
    fn kind(&self) -> MechanicKind;

    fn default_count(&self) -> u32 {
        1
    }

    /// Remove secondary overrides that would break this primary.
    fn sanitize(&self, _secondaries: &mut [SecondarySettings]) {}

    /// The `index`-th child of the item described by `plan`.
    fn child_spec(&self, plan: &BuildPlan, index: u32) -> ChildSpec;

    /// Runs once the child and its primary mechanic exist.
    fn finish_child(&self, _generator: &mut ItemGenerator, _child: Entity, _plan: &BuildPlan) {}

    /// Resolve the plan, store it on the root, then build or schedule
    /// children according to the cadence.
    fn build(&self, generator: &mut ItemGenerator, request: &BuildRequest, out: &mut Vec<Entity>) {
        build_primary(self, generator, request, out)
    }
}

/// Session params only fill keys the JSON left open.
pub fn fill_from_params(settings: &mut SettingsMap, params: &ItemParams) {
    if let Some(damage) = params.damage {
        fill_setting(settings, "damage", damage.into());
    }
    if let Some(radius) = params.radius {
        fill_setting(settings, "radius", radius.into());
    }
    if let Some(speed) = params.speed {
        fill_setting(settings, "speed", speed.into());
    }
}

pub fn build_primary<B: PrimaryBuilder + ?Sized>(
    builder: &B,
    generator: &mut ItemGenerator,
    request: &BuildRequest,
    out: &mut Vec<Entity>,
) {
    let kind = builder.kind();
    let mut secondaries = generator.secondary_settings(&request.instruction.secondary);
    builder.sanitize(&mut secondaries);
    let mut settings = generator.merge_settings(
        kind.name(),
        &secondaries,
        request.instruction.isolate_secondary_settings,
    );
    fill_from_params(&mut settings, &request.params);

    let config = generator.config();
    let count = resolve_count(
        &request.params,
        config.child_count_override,
        &settings,
        builder.default_count(),
    );
    let (direction, direction_from_resolver) =
        resolve_direction(&settings, &request.params, generator.world_right(request.root));
    let plan = BuildPlan {
        kind,
        instruction: request.instruction.clone(),
        params: request.params.clone(),
        count,
        cadence: SpawnCadence::resolve(&settings),
        movement: MovementMode::resolve(&settings, &request.params),
        direction,
        direction_from_resolver,
        destroy_on_hit: resolve_destroy_on_hit(&settings, &secondaries, &request.params),
        spawned: 0,
        settings,
    };

    if config.debug_logging || request.params.debug {
        info!(
            "Building {} x{} ({:?}, {:?}) with secondaries {:?}",
            kind, plan.count, plan.cadence, plan.movement, plan.instruction.secondary
        );
    }

    let cadence = plan.cadence;
    let mut spawner_settings = plan.settings.clone();
    generator.world_mut().entity_mut(request.root).insert(plan);

    match cadence {
        SpawnCadence::Static => out.extend(generator.spawn_batch(request.root, count)),
        SpawnCadence::Interval => {
            set_setting(&mut spawner_settings, "countPerInterval", count.into());
            generator.add_mechanic_by_name(request.root, IntervalSpawner::NAME, &spawner_settings);
        }
        SpawnCadence::Sequence => {
            set_setting(&mut spawner_settings, "sequenceCount", count.into());
            generator.add_mechanic_by_name(request.root, SequenceSpawner::NAME, &spawner_settings);
        }
    }
}

/// Attach the plan's movement mechanic, if it has one.
pub fn with_movement(spec: ChildSpec, plan: &BuildPlan, direction: Vec2) -> ChildSpec {
    let Some(mechanic) = plan.movement.mechanic() else {
        return spec;
    };
    let mut settings = plan.settings.clone();
    set_setting(&mut settings, "direction", direction.into());
    spec.with_extra(mechanic, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{normalize, settings_map};

    #[test]
    fn params_never_override_json() {
        let mut settings = settings_map([("damage", 7.into())]);
        let params = ItemParams {
            damage: Some(99.0),
            speed: Some(3.0),
            ..Default::default()
        };
        fill_from_params(&mut settings, &params);
        assert_eq!(normalize::float(Some(&settings), &["damage"], 0.0), 7.0);
        assert_eq!(normalize::float(Some(&settings), &["speed"], 0.0), 3.0);
        assert!(!settings.contains_key("radius"));
    }
}
