//! Builders module - turn an instruction into a root and its children.

mod build;
mod child;
mod plan;
mod primaries;

pub use build::{build_primary, fill_from_params, with_movement, BuildRequest, PrimaryBuilder};
pub use child::ChildSpec;
pub use plan::{
    resolve_count, resolve_destroy_on_hit, resolve_direction, BuildPlan, MovementMode,
    SpawnCadence,
};
pub use primaries::builder_for;
