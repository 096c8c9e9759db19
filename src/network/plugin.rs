//! Network plugin - position mirroring and server-side spawns.

use bevy::prelude::*;

use super::offline::OfflineSpawnSimulator;
use super::sync::{
    mirror_local_player, receive_server_messages, send_spawn_requests, NetworkSpawnConfirmed,
    NetworkSpawnRequest, PendingSpawns, PositionMirror,
};
use super::transport::NetworkTransport;
use crate::core::MechanicSet;

/// Uses the offline simulator unless a `NetworkTransport` was inserted
/// before the plugin.
#[derive(Default)]
pub struct NetworkPlugin {
    pub offline_seed: u64,
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<NetworkTransport>() {
            app.insert_resource(NetworkTransport::new(OfflineSpawnSimulator::new(self.offline_seed)));
        }
        app.add_event::<NetworkSpawnRequest>()
            .add_event::<NetworkSpawnConfirmed>()
            .init_resource::<PositionMirror>()
            .init_resource::<PendingSpawns>()
            .add_systems(
                Update,
                (receive_server_messages, send_spawn_requests, mirror_local_player)
                    .chain()
                    .in_set(MechanicSet::Lifecycle),
            );
    }
}
