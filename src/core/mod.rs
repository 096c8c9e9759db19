//! Core module - events, lifecycle and frame ordering.
//!
//! This module provides the foundation that all other forge systems build upon.

mod events;
mod lifecycle;
mod plugin;

pub use events::*;
pub use lifecycle::*;
pub use plugin::{broadcast_game_over, CorePlugin};
