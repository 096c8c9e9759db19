//! Combat plugin - damage application and targeting.

use bevy::prelude::*;

use super::systems;
use super::targeting::TargetingRng;

/// Combat plugin - the damage side every mechanic reports into.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TargetingRng>();

        systems::setup_combat_systems(app);
    }
}
