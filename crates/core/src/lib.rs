//! Core rules engine - deterministic, tick-driven and free of I/O
//!
//! This crate contains all the game rules and session logic. It knows nothing
//! about rendering, windows or input devices: a frontend feeds it [`Command`](types::Command)s
//! and clock samples, and reads state back through queries or a
//! [`GameSnapshot`].
//!
//! # Module Structure
//!
//! - [`playfield`]: 10x40 grid (20 hidden rows) with collision and line clearing
//! - [`pieces`]: tetromino shapes, rotation and SRS wall kick tables
//! - [`active`]: the falling piece and its movement rules
//! - [`bag`]: 7-bag randomizer with a 3-piece preview
//! - [`scoring`]: scoring trait and the fixed-goal leveling policy
//! - [`timer`]: pausable deadline timer
//! - [`config`]: tunable timings and seed
//! - [`controller`]: session state machine, timing and command handling
//! - [`snapshot`]: read-only copy of everything a renderer needs
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: every aligned run of seven pieces holds each kind once
//! - **SRS Rotation**: five kick tests per rotation, O never kicks
//! - **Lock Delay**: 500ms once resting, pushed back by moves (15 resets max)
//! - **Hold**: once per piece, re-enabled by the next lock
//! - **T-Spin Detection**: three-corner rule with Mini and Full variants
//! - **Leveling**: 5 lines for the first level, 10 for each one after
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use tetrion_core::{GameConfig, GameController, ScoringSystem};
//! use tetrion_core::types::{Command, SessionState};
//!
//! let mut game = GameController::new(GameConfig::default().with_seed(12345));
//! let t0 = Instant::now();
//! game.start(t0);
//!
//! game.handle_command(Command::MoveRightStart, t0);
//! game.handle_command(Command::MoveRightStop, t0);
//! game.handle_command(Command::HardDrop, t0);
//! game.update(t0 + Duration::from_millis(16));
//!
//! assert_eq!(game.state(), SessionState::Running);
//! assert!(game.scoring().score() > 0);
//! ```

pub mod active;
pub mod bag;
pub mod config;
pub mod controller;
pub mod pieces;
pub mod playfield;
pub mod scoring;
pub mod snapshot;
pub mod timer;

pub use tetrion_types as types;

pub use active::ActivePiece;
pub use bag::RandomizationQueue;
pub use config::GameConfig;
pub use controller::GameController;
pub use pieces::{get_shape, kick_offsets, Shape};
pub use playfield::Playfield;
pub use scoring::{FixedGoalScoring, ScoringSystem};
pub use snapshot::{ActiveSnapshot, GameSnapshot, MinoStyle};
pub use timer::PauseTimer;
