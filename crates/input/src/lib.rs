//! Terminal input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into [`crate::types::Command`]s and filters them into
//! clean start/stop edges, including on terminals without key-release events.

pub mod filter;
pub mod map;

pub use tetrion_types as types;

pub use filter::EdgeFilter;
pub use map::{map_key, should_quit, Key};
