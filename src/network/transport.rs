//! The typed request/response seam the game talks to the server through.

use bevy::prelude::*;

use super::messages::{ClientMessage, NetworkError, ServerMessage};

/// Send typed requests, collect typed responses.
///
/// Framing and reconnects live behind this trait.
pub trait SpawnTransport: Send + Sync {
    fn send(&mut self, message: ClientMessage) -> Result<(), NetworkError>;

    /// Everything received since the last poll, oldest first.
    fn poll(&mut self) -> Vec<ServerMessage>;

    fn is_connected(&self) -> bool {
        true
    }
}

#[derive(Resource)]
pub struct NetworkTransport(pub Box<dyn SpawnTransport>);

impl NetworkTransport {
    pub fn new(transport: impl SpawnTransport + 'static) -> Self {
        Self(Box::new(transport))
    }
}
