//! Hits module - contacts, overlaps and the hit-modifier protocol.

mod contacts;
mod dispatch;
mod info;
mod plugin;

pub use contacts::{Overlaps, QueryColliderOf, TriggerContact};
pub use dispatch::{HitHandler, HitModifier, HitModifierAppExt, HitModifierRegistry};
pub use info::{HitInfo, HitModifierError, PrimaryHit};
pub use plugin::HitsPlugin;
