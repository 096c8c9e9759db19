//! Core plugin that sets up events, the shutdown token and frame ordering.

use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

use super::events::*;
use super::lifecycle::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Global events (DamageEvent, DeathEvent, GameOverEvent)
/// - The shared shutdown token
/// - The chained `MechanicSet` ordering used by every other plugin
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<GameOverEvent>()

            // Shared cancellation flag
            .init_resource::<ShutdownToken>()

            // Frame ordering
            .configure_sets(
                Update,
                (
                    MechanicSet::Lifecycle,
                    MechanicSet::Spawn,
                    MechanicSet::Sync,
                    MechanicSet::Tick,
                    MechanicSet::Hits,
                    MechanicSet::Damage,
                    MechanicSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (broadcast_game_over, halt_velocities)
                    .chain()
                    .in_set(MechanicSet::Lifecycle),
            )
            .add_systems(Update, despawn_pending.in_set(MechanicSet::Cleanup));
    }
}

/// Cancel the shutdown token when a game-over event arrives.
pub fn broadcast_game_over(mut events: EventReader<GameOverEvent>, token: Res<ShutdownToken>) {
    if events.read().next().is_some() && !token.is_cancelled() {
        info!("Game over - stopping all mechanics");
        token.cancel();
    }
}

/// After shutdown, nothing keeps moving.
fn halt_velocities(token: Res<ShutdownToken>, mut bodies: Query<&mut Velocity>) {
    if !token.is_cancelled() {
        return;
    }
    for mut velocity in bodies.iter_mut() {
        if velocity.linvel != Vec2::ZERO || velocity.angvel != 0.0 {
            *velocity = Velocity::zero();
        }
    }
}

/// Despawn everything marked during this frame.
fn despawn_pending(mut commands: Commands, pending: Query<Entity, With<PendingDespawn>>) {
    for entity in pending.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
