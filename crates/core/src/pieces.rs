//! Pieces module - Tetromino shapes and SRS wall kick tables
//!
//! Every shape lives in a 4x4 bounding box whose top-left corner is the piece
//! position. Orientations are not tabulated; they are derived by rotating the
//! spawn template:
//!
//! - **I** rotates within the full 4x4 box
//! - **O** never changes
//! - **J, L, S, T, Z** rotate within the top-left 3x3 box
//!
//! Kick offsets use playfield coordinates (y grows downward).
//! Reference: https://tetris.wiki/SRS

use crate::types::{Orientation, PieceKind, RotationDirection};

/// Offset of a single mino relative to the bounding box origin
pub type MinoOffset = (i8, i8);

/// 4x4 occupancy grid, bit `row * 4 + col`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape(u16);

impl Shape {
    /// Build a shape from row-major 0/1 rows
    pub const fn from_rows(rows: [[u8; 4]; 4]) -> Self {
        let mut bits = 0u16;
        let mut row = 0;
        while row < 4 {
            let mut col = 0;
            while col < 4 {
                if rows[row][col] != 0 {
                    bits |= 1 << (row * 4 + col);
                }
                col += 1;
            }
            row += 1;
        }
        Self(bits)
    }

    /// Raw bit representation
    pub fn bits(&self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub fn is_set(&self, col: i8, row: i8) -> bool {
        if !(0..4).contains(&col) || !(0..4).contains(&row) {
            return false;
        }
        self.0 & (1 << (row * 4 + col)) != 0
    }

    /// Occupied cells as `(col, row)`, row-major order
    pub fn cells(&self) -> impl Iterator<Item = MinoOffset> + '_ {
        (0..16i8)
            .filter(move |&i| self.0 & (1u16 << i) != 0)
            .map(|i| (i % 4, i / 4))
    }

    /// Lowest occupied row in a column, if the column has any mino
    pub fn lowest_row(&self, col: i8) -> Option<i8> {
        (0..4).rev().find(|&row| self.is_set(col, row))
    }

    /// Rotate 90° clockwise within the top-left `size x size` sub-grid
    fn rotate_cw_within(&self, size: i8) -> Self {
        let mut bits = 0u16;
        for row in 0..size {
            for col in 0..size {
                if self.is_set(row, size - 1 - col) {
                    bits |= 1 << (row * 4 + col);
                }
            }
        }
        Self(bits)
    }

    /// Rotate 90° counter-clockwise within the top-left `size x size` sub-grid
    fn rotate_ccw_within(&self, size: i8) -> Self {
        let mut bits = 0u16;
        for row in 0..size {
            for col in 0..size {
                if self.is_set(size - 1 - row, col) {
                    bits |= 1 << (row * 4 + col);
                }
            }
        }
        Self(bits)
    }
}

/// Spawn templates, indexed by kind id (I, J, L, O, S, T, Z)
const TEMPLATES: [Shape; 7] = [
    Shape::from_rows([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Shape::from_rows([[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
];

/// Spawn-orientation shape of a kind
pub fn spawn_shape(kind: PieceKind) -> Shape {
    TEMPLATES[kind.id() as usize]
}

/// Rotate a shape of the given kind one step in `direction`
pub fn rotate_shape(kind: PieceKind, shape: Shape, direction: RotationDirection) -> Shape {
    let size = match kind {
        PieceKind::O => return shape,
        PieceKind::I => 4,
        _ => 3,
    };
    match direction {
        RotationDirection::Clockwise => shape.rotate_cw_within(size),
        RotationDirection::CounterClockwise => shape.rotate_ccw_within(size),
    }
}

/// Shape of a kind in the given orientation
pub fn get_shape(kind: PieceKind, orientation: Orientation) -> Shape {
    let mut shape = spawn_shape(kind);
    for _ in 0..orientation.index() {
        shape = rotate_shape(kind, shape, RotationDirection::Clockwise);
    }
    shape
}

/// Five kick candidates per starting orientation, tried in order
pub type KickTable = [[MinoOffset; 5]; 4];

/// Which kick table a kind uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickClass {
    I,
    O,
    Other,
}

impl KickClass {
    pub fn of(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => KickClass::I,
            PieceKind::O => KickClass::O,
            _ => KickClass::Other,
        }
    }
}

/// O piece has no kicks (always rotates in place)
const O_KICKS: KickTable = [[(0, 0); 5]; 4];

/// J, L, S, T, Z clockwise, from orientation 0..3
const OTHER_CW_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// J, L, S, T, Z counter-clockwise, from orientation 0..3
const OTHER_CCW_KICKS: KickTable = [
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// I clockwise, from orientation 0..3
const I_CW_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

/// I counter-clockwise, from orientation 0..3
const I_CCW_KICKS: KickTable = [
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
];

/// Kick candidates for rotating `kind` out of orientation `from`
pub fn kick_offsets(
    kind: PieceKind,
    direction: RotationDirection,
    from: Orientation,
) -> &'static [MinoOffset; 5] {
    let table = match (KickClass::of(kind), direction) {
        (KickClass::O, _) => &O_KICKS,
        (KickClass::I, RotationDirection::Clockwise) => &I_CW_KICKS,
        (KickClass::I, RotationDirection::CounterClockwise) => &I_CCW_KICKS,
        (KickClass::Other, RotationDirection::Clockwise) => &OTHER_CW_KICKS,
        (KickClass::Other, RotationDirection::CounterClockwise) => &OTHER_CCW_KICKS,
    };
    &table[from.index()]
}
