//! Network module - the thin layer between the forge and the game server.

mod messages;
mod offline;
mod plugin;
mod spawn_id;
mod sync;
mod transport;

pub use messages::{ClientMessage, NetworkError, ServerMessage};
pub use offline::OfflineSpawnSimulator;
pub use plugin::NetworkPlugin;
pub use spawn_id::{checksum, SpawnId};
pub use sync::{
    LocalPlayer, NetworkSpawnConfirmed, NetworkSpawnRequest, PendingSpawns, PositionMirror,
    RemotePlayer,
};
pub use transport::{NetworkTransport, SpawnTransport};
