//! Catalog module - mechanic names, their operations and their data.

mod definitions;
mod error;
mod kinds;
mod plugin;
mod presets;
mod registry;

pub use definitions::MechanicDefinitions;
pub use error::DataLoadError;
pub use kinds::{MechanicKind, PrimaryKind};
pub use plugin::CatalogPlugin;
pub use presets::{DataPaths, ForgeConfig, ItemPreset, ItemPresets};
pub use registry::{MechanicAppExt, MechanicCatalog, MechanicEntry};
