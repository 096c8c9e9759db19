//! Systems mirroring the local player and routing spawn requests.

use bevy::prelude::*;
use std::collections::HashMap;

use super::messages::{ClientMessage, ServerMessage};
use super::spawn_id::SpawnId;
use super::transport::NetworkTransport;

/// The player whose position is mirrored to the server.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LocalPlayer;

/// Another player's position as reported by the server.
#[derive(Component, Debug, Clone)]
pub struct RemotePlayer {
    pub player_id: String,
}

/// Ask the server to spawn something at a position.
#[derive(Event, Debug, Clone, Copy)]
pub struct NetworkSpawnRequest {
    pub position: Vec2,
    pub radius: f32,
}

/// The server accepted a spawn.
#[derive(Event, Debug, Clone, Copy)]
pub struct NetworkSpawnConfirmed {
    pub spawn_id: SpawnId,
    pub position: Vec2,
    pub radius: f32,
}

/// Rate limit for position updates.
#[derive(Resource, Debug, Clone)]
pub struct PositionMirror {
    pub timer: Timer,
    /// Smaller moves are not sent.
    pub min_distance: f32,
    pub last_sent: Option<Vec2>,
}

impl Default for PositionMirror {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(0.1, TimerMode::Repeating),
            min_distance: 0.05,
            last_sent: None,
        }
    }
}

impl PositionMirror {
    pub fn should_send(&self, position: Vec2) -> bool {
        self.last_sent
            .map_or(true, |last| last.distance(position) >= self.min_distance)
    }
}

/// Requests sent and not yet answered.
#[derive(Resource, Debug, Default)]
pub struct PendingSpawns {
    next_id: u32,
    pub pending: HashMap<u32, NetworkSpawnRequest>,
}

impl PendingSpawns {
    fn track(&mut self, request: NetworkSpawnRequest) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert(self.next_id, request);
        self.next_id
    }
}

pub fn mirror_local_player(
    time: Res<Time>,
    mut mirror: ResMut<PositionMirror>,
    players: Query<&GlobalTransform, With<LocalPlayer>>,
    mut transport: ResMut<NetworkTransport>,
) {
    mirror.timer.tick(time.delta());
    if !mirror.timer.just_finished() {
        return;
    }
    let Ok(transform) = players.get_single() else {
        return;
    };
    let position = transform.translation().truncate();
    if !mirror.should_send(position) {
        return;
    }
    match transport.0.send(ClientMessage::PlayerPosition {
        x: position.x,
        y: position.y,
    }) {
        Ok(()) => mirror.last_sent = Some(position),
        Err(e) => warn!("Position update not sent: {}", e),
    }
}

pub fn send_spawn_requests(
    mut requests: EventReader<NetworkSpawnRequest>,
    mut pending: ResMut<PendingSpawns>,
    mut transport: ResMut<NetworkTransport>,
) {
    for request in requests.read() {
        let request_id = pending.track(*request);
        let message = ClientMessage::SpawnRequest {
            request_id,
            x: request.position.x,
            y: request.position.y,
            radius: request.radius,
        };
        if let Err(e) = transport.0.send(message) {
            warn!("Spawn request {} not sent: {}", request_id, e);
            pending.pending.remove(&request_id);
        }
    }
}

pub fn receive_server_messages(
    mut commands: Commands,
    mut transport: ResMut<NetworkTransport>,
    mut pending: ResMut<PendingSpawns>,
    mut confirmed: EventWriter<NetworkSpawnConfirmed>,
    mut remotes: Query<(Entity, &RemotePlayer, &mut Transform)>,
) {
    for message in transport.0.poll() {
        match message {
            ServerMessage::SpawnResponse {
                request_id,
                spawn_id,
                x,
                y,
                radius,
            } => {
                if pending.pending.remove(&request_id).is_none() {
                    debug!("Spawn response {} matches no request", request_id);
                }
                if !spawn_id.is_valid() {
                    warn!("Rejecting spawn with bad checksum: {}", spawn_id);
                    continue;
                }
                confirmed.send(NetworkSpawnConfirmed {
                    spawn_id,
                    position: Vec2::new(x, y),
                    radius,
                });
            }
            ServerMessage::PlayerPosition { player_id, x, y } => {
                let existing = remotes
                    .iter_mut()
                    .find(|(_, remote, _)| remote.player_id == player_id);
                match existing {
                    Some((_, _, mut transform)) => {
                        transform.translation.x = x;
                        transform.translation.y = y;
                    }
                    None => {
                        commands.spawn((
                            Name::new(format!("RemotePlayer:{player_id}")),
                            RemotePlayer { player_id },
                            Transform::from_xyz(x, y, 0.0),
                        ));
                    }
                }
            }
            ServerMessage::PlayerLeft { player_id } => {
                for (entity, remote, _) in remotes.iter() {
                    if remote.player_id == player_id {
                        commands.entity(entity).despawn_recursive();
                    }
                }
            }
            ServerMessage::Error { message } => warn!("Server error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_moves_are_not_mirrored() {
        let mut mirror = PositionMirror::default();
        assert!(mirror.should_send(Vec2::ZERO));
        mirror.last_sent = Some(Vec2::ZERO);
        assert!(!mirror.should_send(Vec2::new(0.01, 0.0)));
        assert!(mirror.should_send(Vec2::new(1.0, 0.0)));
    }
}
