//! The interface every runtime mechanic implements, and the context it runs in.

use bevy::prelude::*;

use crate::core::{Lifecycle, ShutdownToken};
use crate::settings::SettingsMap;

/// Frame of reference handed to every mechanic on one payload.
///
/// Inserted once by `ItemGenerator::initialize_mechanics` and only changed
/// through `ItemGenerator::set_target`.
#[derive(Component, Debug, Clone)]
pub struct MechanicContext {
    /// Whoever owns the item (player, mob, or the item root itself).
    pub owner: Entity,
    /// The entity this mechanic's motion/effect acts on.
    pub payload: Entity,
    pub target: Option<Entity>,
    pub owner_body: Option<Entity>,
    pub payload_body: Option<Entity>,
    pub shutdown: ShutdownToken,
}

/// Names of the mechanics attached to an entity, in attach order.
///
/// Capability checks (hit modifiers, compatibility) iterate this list instead
/// of probing for concrete component types.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AttachedMechanics(pub Vec<&'static str>);

impl AttachedMechanics {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn push(&mut self, name: &'static str) {
        if !self.contains(name) {
            self.0.push(name);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|n| !n.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }
}

/// Everything a mechanic sees at initialization.
#[derive(Debug)]
pub struct MechanicInit<'a> {
    pub ctx: &'a MechanicContext,
    pub attached: &'a AttachedMechanics,
    /// Payload translation relative to its parent.
    pub local_offset: Vec2,
}

/// A runtime behavior attached to an item entity.
///
/// `apply_settings` must treat the current field values as defaults so a
/// single-key update leaves everything else untouched.
pub trait Mechanic: Component + Default {
    const NAME: &'static str;
    const ALIASES: &'static [&'static str] = &[];
    /// Lower runs first within one entity.
    const INITIALIZE_ORDER: i32 = 0;

    fn apply_settings(&mut self, settings: &SettingsMap);

    fn initialize(&mut self, _init: &MechanicInit) {}

    /// Activation guard. `false` leaves the mechanic stopped.
    fn should_activate(&self, _ctx: &MechanicContext) -> bool {
        true
    }

    /// Called when a pooled instance is handed out again.
    fn reset_for_reuse(&mut self) {}

    fn lifecycle(&self) -> Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;
}

/// Stop every instance once the shutdown token fires.
pub fn stop_on_shutdown<M: Mechanic>(token: Res<ShutdownToken>, mut mechanics: Query<&mut M>) {
    if !token.is_cancelled() {
        return;
    }
    for mut mechanic in mechanics.iter_mut() {
        if !mechanic.lifecycle().is_stopped() {
            mechanic.lifecycle_mut().stop();
        }
    }
}

/// Initialize mechanics added after their payload was initialized.
///
/// Anything attached through the generator is initialized on the spot; this
/// catches late additions so none of them ever ticks uninitialized.
pub fn initialize_late<M: Mechanic>(
    mut mechanics: Query<(&mut M, &MechanicContext, Option<&AttachedMechanics>, &Transform)>,
) {
    let empty = AttachedMechanics::default();
    for (mut mechanic, ctx, attached, transform) in mechanics.iter_mut() {
        if mechanic.lifecycle().is_initialized() {
            continue;
        }
        let init = MechanicInit {
            ctx,
            attached: attached.unwrap_or(&empty),
            local_offset: transform.translation.truncate(),
        };
        run_initialize(&mut *mechanic, &init);
    }
}

/// Initialize once, honoring the activation guard and shutdown.
pub fn run_initialize<M: Mechanic>(mechanic: &mut M, init: &MechanicInit) -> bool {
    if mechanic.lifecycle().is_initialized() {
        return false;
    }
    mechanic.initialize(init);
    if init.ctx.shutdown.is_cancelled() || !mechanic.should_activate(init.ctx) {
        mechanic.lifecycle_mut().stop();
    } else {
        mechanic.lifecycle_mut().start();
    }
    true
}
