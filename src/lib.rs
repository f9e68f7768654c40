//! Tetrion (workspace facade crate).
//!
//! Re-exports the rules engine, the terminal input layer and the shared types
//! under one name. The implementation lives in dedicated crates under `crates/`.

pub use tetrion_core as core;
pub use tetrion_input as input;
pub use tetrion_types as types;
