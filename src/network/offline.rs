//! Answers spawn requests locally when no server is available.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

use super::messages::{ClientMessage, NetworkError, ServerMessage};
use super::spawn_id::SpawnId;
use super::transport::SpawnTransport;

/// Offline stand-in for the server.
///
/// Every message makes the full JSON round trip, so the wire format is
/// exercised even without a connection.
pub struct OfflineSpawnSimulator {
    rng: StdRng,
    inbox: VecDeque<String>,
    pub last_player_position: Option<(f32, f32)>,
    pub spawned: u32,
}

impl OfflineSpawnSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            inbox: VecDeque::new(),
            last_player_position: None,
            spawned: 0,
        }
    }

    fn answer(&mut self, message: ClientMessage) -> Option<ServerMessage> {
        match message {
            ClientMessage::PlayerPosition { x, y } => {
                self.last_player_position = Some((x, y));
                None
            }
            ClientMessage::SpawnRequest { request_id, x, y, radius } => {
                self.spawned += 1;
                Some(ServerMessage::SpawnResponse {
                    request_id,
                    spawn_id: SpawnId::generate(&mut self.rng),
                    x,
                    y,
                    radius,
                })
            }
        }
    }
}

impl SpawnTransport for OfflineSpawnSimulator {
    fn send(&mut self, message: ClientMessage) -> Result<(), NetworkError> {
        let received = ClientMessage::decode(&message.encode()?)?;
        if let Some(response) = self.answer(received) {
            self.inbox.push_back(response.encode()?);
        }
        Ok(())
    }

    fn poll(&mut self) -> Vec<ServerMessage> {
        self.inbox
            .drain(..)
            .filter_map(|text| ServerMessage::decode(&text).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_requests_get_checksummed_ids() {
        let mut offline = OfflineSpawnSimulator::new(1);
        offline
            .send(ClientMessage::SpawnRequest {
                request_id: 4,
                x: 1.0,
                y: 2.0,
                radius: 0.5,
            })
            .unwrap();
        let responses = offline.poll();
        assert_eq!(responses.len(), 1);
        match &responses[0] {
            ServerMessage::SpawnResponse {
                request_id, spawn_id, x, ..
            } => {
                assert_eq!(*request_id, 4);
                assert_eq!(*x, 1.0);
                assert!(spawn_id.is_valid());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(offline.poll().is_empty());
    }

    #[test]
    fn positions_are_recorded_without_reply() {
        let mut offline = OfflineSpawnSimulator::new(1);
        offline.send(ClientMessage::PlayerPosition { x: 5.0, y: 6.0 }).unwrap();
        assert_eq!(offline.last_player_position, Some((5.0, 6.0)));
        assert!(offline.poll().is_empty());
    }
}
