//! Mechanic lifecycle, the shutdown token, and deferred despawning.

use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-frame ordering for everything the forge runs in `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MechanicSet {
    /// Shutdown propagation
    Lifecycle,
    /// Spawn requests and spawners (may re-enter the generator)
    Spawn,
    /// Contacts, overlaps, rosters and helper colliders
    Sync,
    /// Per-mechanic behavior
    Tick,
    /// Hit-modifier dispatch
    Hits,
    /// Damage application and damage-over-time
    Damage,
    /// Despawns
    Cleanup,
}

/// Lifecycle state shared by every runtime mechanic.
///
/// Destroyed is not represented: a destroyed mechanic no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Running,
    Stopped,
}

impl Lifecycle {
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Lifecycle::Uninitialized)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Lifecycle::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Lifecycle::Stopped)
    }

    pub fn start(&mut self) {
        *self = Lifecycle::Running;
    }

    pub fn stop(&mut self) {
        *self = Lifecycle::Stopped;
    }
}

/// Cancellation token handed to every mechanic through its context.
///
/// Cloning shares the flag; cancelling any clone cancels all of them.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Marks an entity for recursive despawn during cleanup.
///
/// Mechanics decide destruction with this marker instead of despawning in
/// place, so hit modifiers dispatched later in the frame still see the payload.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingDespawn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_a_clone_cancels_the_original() {
        let token = ShutdownToken::default();
        let shared = token.clone();
        assert!(!token.is_cancelled());
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn lifecycle_transitions() {
        let mut lifecycle = Lifecycle::default();
        assert!(!lifecycle.is_initialized());
        lifecycle.start();
        assert!(lifecycle.is_running());
        lifecycle.stop();
        assert!(lifecycle.is_initialized() && lifecycle.is_stopped());
    }
}
