//! Target selection and damageable resolution.
//!
//! Mechanics never scan the scene themselves. Random/nearest mob picks go
//! through [`TargetingService`], and "who actually takes this hit" goes through
//! [`DamageTargets`].

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::components::{AttachedBody, Health, Mob, Tags};

/// Parent chains deeper than this are treated as malformed.
const MAX_CHAIN_DEPTH: usize = 32;

/// Seeded RNG shared by targeting and spawn placement.
#[derive(Resource)]
pub struct TargetingRng(pub StdRng);

impl TargetingRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for TargetingRng {
    fn default() -> Self {
        Self::seeded(42)
    }
}

/// Who a damage mechanic may hit.
#[derive(Debug, Clone, Copy)]
pub struct TargetFilter {
    pub owner: Entity,
    pub exclude_owner: bool,
    pub require_mob_tag: bool,
}

/// Walk own entity → parent chain, then attached body → its parent chain.
pub fn resolve_damageable_with(
    hit: Entity,
    has_health: impl Fn(Entity) -> bool,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    body_of: impl Fn(Entity) -> Option<Entity>,
) -> Option<Entity> {
    let walk = |start: Entity| {
        let mut current = Some(start);
        for _ in 0..MAX_CHAIN_DEPTH {
            let entity = current?;
            if has_health(entity) {
                return Some(entity);
            }
            current = parent_of(entity);
        }
        None
    };

    walk(hit).or_else(|| body_of(hit).and_then(walk))
}

/// Damageable resolution for systems.
#[derive(SystemParam)]
pub struct DamageTargets<'w, 's> {
    health: Query<'w, 's, &'static Health>,
    parents: Query<'w, 's, &'static Parent>,
    bodies: Query<'w, 's, &'static AttachedBody>,
    mobs: Query<'w, 's, (), With<Mob>>,
    tags: Query<'w, 's, &'static Tags>,
}

impl DamageTargets<'_, '_> {
    /// Find the entity owning the damageable component for a collider hit.
    pub fn resolve(&self, hit: Entity) -> Option<Entity> {
        resolve_damageable_with(
            hit,
            |e| self.health.contains(e),
            |e| self.parents.get(e).ok().map(Parent::get),
            |e| self.bodies.get(e).ok().map(|b| b.0),
        )
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.health.get(entity).is_ok_and(Health::is_alive)
    }

    pub fn is_mob(&self, entity: Entity) -> bool {
        self.mobs.contains(entity)
    }

    /// `mob` matches the `Mob` marker as well as an explicit tag.
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        if tag.eq_ignore_ascii_case("mob") && self.is_mob(entity) {
            return true;
        }
        self.tags.get(entity).is_ok_and(|tags| tags.contains(tag))
    }

    /// Resolve a hit and apply the filter. Returns the living damageable.
    pub fn accept(&self, hit: Entity, filter: &TargetFilter) -> Option<Entity> {
        let target = self.resolve(hit)?;
        if filter.exclude_owner && target == filter.owner {
            return None;
        }
        if filter.require_mob_tag && !self.is_mob(target) {
            return None;
        }
        self.is_alive(target).then_some(target)
    }
}

/// World-level resolution for exclusive systems and hit modifiers.
pub fn resolve_damageable(world: &World, hit: Entity) -> Option<Entity> {
    resolve_damageable_with(
        hit,
        |e| world.get::<Health>(e).is_some(),
        |e| world.get::<Parent>(e).map(Parent::get),
        |e| world.get::<AttachedBody>(e).map(|b| b.0),
    )
}

/// World-level filter check mirroring [`DamageTargets::accept`].
pub fn accept_in_world(world: &World, hit: Entity, filter: &TargetFilter) -> Option<Entity> {
    let target = resolve_damageable(world, hit)?;
    if filter.exclude_owner && target == filter.owner {
        return None;
    }
    if filter.require_mob_tag && world.get::<Mob>(target).is_none() {
        return None;
    }
    world
        .get::<Health>(target)
        .is_some_and(Health::is_alive)
        .then_some(target)
}

/// Living mobs within `radius` of `origin`, for exclusive callers.
pub fn mobs_within_world(world: &mut World, origin: Vec2, radius: f32) -> Vec<(Entity, Vec2)> {
    let mut query = world.query_filtered::<(Entity, &GlobalTransform, Option<&Health>), With<Mob>>();
    query
        .iter(world)
        .filter(|(_, _, health)| health.is_none_or(|h| h.is_alive()))
        .map(|(entity, transform, _)| (entity, transform.translation().truncate()))
        .filter(|(_, position)| position.distance(origin) <= radius)
        .collect()
}

/// "Find a valid enemy" abstraction used by Strike, Lock, Whip and friends.
pub trait TargetingService {
    /// A random living mob accepted by `filter`, optionally within range.
    fn pick_random_mob(
        &mut self,
        origin: Vec2,
        max_range: Option<f32>,
        filter: &dyn Fn(Entity) -> bool,
    ) -> Option<(Entity, Vec2)>;

    /// The closest living mob accepted by `filter`, optionally within range.
    fn nearest_mob(
        &self,
        origin: Vec2,
        max_range: Option<f32>,
        filter: &dyn Fn(Entity) -> bool,
    ) -> Option<(Entity, Vec2)>;

    /// Every living mob within `radius`.
    fn mobs_within(&self, origin: Vec2, radius: f32) -> Vec<(Entity, Vec2)>;
}

/// Default targeting backed by `Mob` entities and their global transforms.
#[derive(SystemParam)]
pub struct MobTargeting<'w, 's> {
    mobs: Query<'w, 's, (Entity, &'static GlobalTransform, Option<&'static Health>), With<Mob>>,
    rng: ResMut<'w, TargetingRng>,
}

impl MobTargeting<'_, '_> {
    fn candidates(
        &self,
        origin: Vec2,
        max_range: Option<f32>,
        filter: &dyn Fn(Entity) -> bool,
    ) -> Vec<(Entity, Vec2)> {
        self.mobs
            .iter()
            .filter(|(_, _, health)| health.is_none_or(|h| h.is_alive()))
            .map(|(entity, transform, _)| (entity, transform.translation().truncate()))
            .filter(|(_, position)| max_range.is_none_or(|range| position.distance(origin) <= range))
            .filter(|(entity, _)| filter(*entity))
            .collect()
    }
}

impl TargetingService for MobTargeting<'_, '_> {
    fn pick_random_mob(
        &mut self,
        origin: Vec2,
        max_range: Option<f32>,
        filter: &dyn Fn(Entity) -> bool,
    ) -> Option<(Entity, Vec2)> {
        let mut candidates = self.candidates(origin, max_range, filter);
        // Query order is not stable across archetype moves
        candidates.sort_by_key(|(entity, _)| *entity);
        candidates.choose(&mut self.rng.0).copied()
    }

    fn nearest_mob(
        &self,
        origin: Vec2,
        max_range: Option<f32>,
        filter: &dyn Fn(Entity) -> bool,
    ) -> Option<(Entity, Vec2)> {
        self.candidates(origin, max_range, filter)
            .into_iter()
            .min_by(|(_, a), (_, b)| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
    }

    fn mobs_within(&self, origin: Vec2, radius: f32) -> Vec<(Entity, Vec2)> {
        self.candidates(origin, Some(radius), &|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_walks_parent_chain_then_body() {
        let mut world = World::new();
        let owner = world.spawn(Health::new(10.0)).id();
        let child = world.spawn_empty().id();
        world.entity_mut(child).set_parent(owner);
        assert_eq!(resolve_damageable(&world, child), Some(owner));

        let body_owner = world.spawn(Health::new(5.0)).id();
        let body = world.spawn_empty().id();
        world.entity_mut(body).set_parent(body_owner);
        let collider = world.spawn(AttachedBody(body)).id();
        assert_eq!(resolve_damageable(&world, collider), Some(body_owner));

        let loose = world.spawn_empty().id();
        assert_eq!(resolve_damageable(&world, loose), None);
    }

    #[test]
    fn filter_excludes_owner_and_non_mobs() {
        let mut world = World::new();
        let owner = world.spawn(Health::new(10.0)).id();
        let mob = world.spawn((Health::new(10.0), Mob)).id();
        let bystander = world.spawn(Health::new(10.0)).id();
        let filter = TargetFilter {
            owner,
            exclude_owner: true,
            require_mob_tag: true,
        };
        assert_eq!(accept_in_world(&world, owner, &filter), None);
        assert_eq!(accept_in_world(&world, bystander, &filter), None);
        assert_eq!(accept_in_world(&world, mob, &filter), Some(mob));
    }
}
