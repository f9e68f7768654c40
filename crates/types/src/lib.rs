//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the workspace.
//! Everything here is plain data with no game logic, so it can be shared by
//! the rules engine, the input layer and any rendering collaborator.
//!
//! # Playfield Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 40 rows (indexed 0-39), y grows downward
//! - **Hidden rows**: rows 0-19 sit above the visible region (spawn buffer)
//! - **Visible rows**: rows 20-39
//! - **Spawn position**: (3, 18), top-left corner of the piece's 4x4 box
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `LOCK_DELAY_MS` | 500 | Time a grounded piece waits before locking |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock deadline resets per piece |
//! | `AUTO_REPEAT_DELAY_MS` | 500 | Delay before a held direction starts repeating |
//! | `AUTO_REPEAT_INTERVAL_MS` | 50 | Interval between repeated moves |
//! | `SOFT_DROP_DIVISOR` | 20 | Soft drop runs 20x faster than gravity |
//!
//! # Fall Speed by Level
//!
//! | Level | ms/row | Level | ms/row |
//! |-------|--------|-------|--------|
//! | 1 | 1000 | 8 | 135 |
//! | 2 | 793 | 9 | 94 |
//! | 3 | 618 | 10 | 64 |
//! | 4 | 473 | 11 | 43 |
//! | 5 | 355 | 12 | 28 |
//! | 6 | 262 | 13 | 18 |
//! | 7 | 190 | 14 | 11 |
//! | 15+ | 7 | | |
//!
//! # Examples
//!
//! ```
//! use tetrion_types::{Orientation, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let kind = PieceKind::try_from(5).unwrap();
//! assert_eq!(kind, PieceKind::T);
//! assert!(PieceKind::try_from(7).is_err());
//!
//! assert_eq!(Orientation::North.rotate_cw(), Orientation::East);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 40);
//! ```

use thiserror::Error;

/// Playfield width in cells
pub const BOARD_WIDTH: u8 = 10;

/// Number of rows shown to the player
pub const VISIBLE_HEIGHT: u8 = 20;

/// Rows above the visible region used as spawn buffer
pub const HIDDEN_ROWS: u8 = 20;

/// Total playfield height in cells
pub const BOARD_HEIGHT: u8 = VISIBLE_HEIGHT + HIDDEN_ROWS;

/// First visible row index
pub const VISIBLE_START_Y: u8 = HIDDEN_ROWS;

/// Spawn position of a new piece's bounding box (x, y)
pub const SPAWN_POSITION: (i8, i8) = (3, 18);

/// Number of upcoming pieces shown in the preview
pub const QUEUE_LEN: usize = 3;

/// Lock delay once the piece rests on a surface
pub const LOCK_DELAY_MS: u32 = 500;

/// Maximum number of lock deadline resets per piece
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Initial delay before a held horizontal direction repeats
pub const AUTO_REPEAT_DELAY_MS: u32 = 500;

/// Interval between repeated horizontal moves
pub const AUTO_REPEAT_INTERVAL_MS: u32 = 50;

/// Soft drop step duration is `fall_speed / SOFT_DROP_DIVISOR` (x0.05)
pub const SOFT_DROP_DIVISOR: u32 = 20;

/// Level a new game starts on
pub const STARTING_LEVEL: u32 = 1;

/// Lines needed to finish the first level
pub const STARTING_GOAL: u32 = 5;

/// Lines needed for each level after the first
pub const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval per level (index 0 = level 1)
pub const FALL_SPEED_TABLE_MS: [u32; 14] = [
    1000, 793, 618, 473, 355, 262, 190, 135, 94, 64, 43, 28, 18, 11,
];

/// Gravity interval for every level past the table
pub const FALL_SPEED_MIN_MS: u32 = 7;

/// Base points for clearing 1-4 lines (multiplied by level)
pub const LINE_CLEAR_REWARD: [u32; 4] = [100, 300, 500, 800];

/// Base points for a T-Spin clearing 0-3 lines (multiplied by level)
pub const T_SPIN_REWARD: [u32; 4] = [400, 800, 1200, 1600];

/// Base points for a Mini T-Spin clearing 0-2 lines (multiplied by level)
pub const MINI_T_SPIN_REWARD: [u32; 3] = [100, 200, 400];

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// Points per successful soft drop step
pub const SOFT_DROP_REWARD: u32 = 1;

/// Points per row covered by a hard drop
pub const HARD_DROP_REWARD: u32 = 2;

/// Error for a piece kind id outside `0..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid piece kind id {0} (expected 0..=6)")]
pub struct InvalidPieceKind(pub u8);

/// The seven tetromino piece kinds
///
/// Discriminants are the stable kind ids stored in the playfield:
/// I=0, J=1, L=2, O=3, S=4, T=5, Z=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl PieceKind {
    /// Number of distinct kinds
    pub const COUNT: usize = 7;

    /// Every kind in id order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Stable numeric id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Convert to lowercase string representation
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrion_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_str(), "i");
    /// assert_eq!(PieceKind::Z.as_str(), "z");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

impl TryFrom<u8> for PieceKind {
    type Error = InvalidPieceKind;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PieceKind::ALL
            .get(id as usize)
            .copied()
            .ok_or(InvalidPieceKind(id))
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orientation of a piece, following the Super Rotation System (SRS)
///
/// - **North**: Spawn orientation (0)
/// - **East**: Rotated clockwise once (1)
/// - **South**: Rotated twice (2)
/// - **West**: Rotated counter-clockwise once (3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrion_types::Orientation;
    ///
    /// assert_eq!(Orientation::North.rotate_cw(), Orientation::East);
    /// assert_eq!(Orientation::West.rotate_cw(), Orientation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrion_types::Orientation;
    ///
    /// assert_eq!(Orientation::North.rotate_ccw(), Orientation::West);
    /// assert_eq!(Orientation::East.rotate_ccw(), Orientation::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Orientation::North => Orientation::West,
            Orientation::West => Orientation::South,
            Orientation::South => Orientation::East,
            Orientation::East => Orientation::North,
        }
    }

    /// Orientation index in `0..4`
    pub fn index(&self) -> usize {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::North => "north",
            Orientation::East => "east",
            Orientation::South => "south",
            Orientation::West => "west",
        }
    }
}

/// Direction of a rotation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Edge-triggered commands consumed by the game controller
///
/// Held inputs arrive as explicit start/stop pairs; key-repeat noise must be
/// filtered before it reaches the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    MoveLeftStart,
    MoveLeftStop,
    MoveRightStart,
    MoveRightStop,
    SoftDropStart,
    SoftDropStop,
    RotateClockwise,
    RotateCounterClockwise,
    HardDrop,
    Hold,
    TogglePause,
    /// Only honoured from game over
    Restart,
}

impl Command {
    /// Whether this command releases a held input
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            Command::MoveLeftStop | Command::MoveRightStop | Command::SoftDropStop
        )
    }

    /// camelCase name, used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeftStart => "moveLeftStart",
            Command::MoveLeftStop => "moveLeftStop",
            Command::MoveRightStart => "moveRightStart",
            Command::MoveRightStop => "moveRightStop",
            Command::SoftDropStart => "softDropStart",
            Command::SoftDropStop => "softDropStop",
            Command::RotateClockwise => "rotateClockwise",
            Command::RotateCounterClockwise => "rotateCounterClockwise",
            Command::HardDrop => "hardDrop",
            Command::Hold => "hold",
            Command::TogglePause => "togglePause",
            Command::Restart => "restart",
        }
    }
}

/// Lifecycle of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    PreInit,
    Running,
    Paused,
    GameOver,
}

/// T-Spin classification of a lock
///
/// - **None**: Not a T-spin
/// - **Mini**: Both back corners plus at least one front corner obstructed
/// - **Full**: Both front corners plus at least one back corner obstructed,
///   or the rotation needed the last-resort wall kick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TSpinKind {
    #[default]
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Returns `None` for `TSpinKind::None`, otherwise a short label
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }
}

/// Event recorded after a piece locks.
///
/// Consumed by observers (HUD flashes, statistics) via `take_last_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub t_spin: TSpinKind,
    /// Points awarded for the clear (drop points excluded)
    pub points: u32,
    pub back_to_back: bool,
    pub level_up: bool,
}

/// A cell on the playfield
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Locked mino of the given kind
pub type Cell = Option<PieceKind>;
