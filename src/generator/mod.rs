//! Generator module - builds items from instructions and re-enters at runtime.

mod components;
mod forge;
mod params;
mod plugin;
mod systems;

pub use components::{ItemRoot, SpawnDepth, SpawnItemRequest, SubItem};
pub use forge::ItemGenerator;
pub use params::{ItemInstruction, ItemParams};
pub use plugin::GeneratorPlugin;
pub use systems::{process_spawn_requests, run_spawners};
