//! Wire messages exchanged with the game server, as tagged JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::spawn_id::SpawnId;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to encode message: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to decode message: {0}")]
    Decode(serde_json::Error),

    #[error("Transport is not connected")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    PlayerPosition { x: f32, y: f32 },
    #[serde(rename_all = "camelCase")]
    SpawnRequest { request_id: u32, x: f32, y: f32, radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    SpawnResponse {
        request_id: u32,
        spawn_id: SpawnId,
        x: f32,
        y: f32,
        radius: f32,
    },
    #[serde(rename_all = "camelCase")]
    PlayerPosition { player_id: String, x: f32, y: f32 },
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: String },
    Error { message: String },
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String, NetworkError> {
        serde_json::to_string(self).map_err(NetworkError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, NetworkError> {
        serde_json::from_str(text).map_err(NetworkError::Decode)
    }
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, NetworkError> {
        serde_json::to_string(self).map_err(NetworkError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, NetworkError> {
        serde_json::from_str(text).map_err(NetworkError::Decode)
    }
}
