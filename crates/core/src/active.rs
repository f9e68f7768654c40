//! Active piece module - the falling tetromino and its movement rules
//!
//! The piece is a kind, an orientation, the top-left corner of its 4x4 box and
//! the shape derived for that orientation. Every movement is validated against
//! [`Playfield::is_obstructed`] and either applies completely or not at all.

use arrayvec::ArrayVec;

use crate::pieces::{kick_offsets, rotate_shape, spawn_shape, Shape};
use crate::playfield::Playfield;
use crate::types::{Orientation, PieceKind, RotationDirection, BOARD_HEIGHT, SPAWN_POSITION};

/// The falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    kind: PieceKind,
    orientation: Orientation,
    x: i8,
    y: i8,
    shape: Shape,
}

impl ActivePiece {
    /// Create a piece of `kind` at the spawn position, spawn orientation
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            orientation: Orientation::North,
            x: SPAWN_POSITION.0,
            y: SPAWN_POSITION.1,
            shape: spawn_shape(kind),
        }
    }

    /// Reinitialize as a fresh piece of `kind`.
    ///
    /// Kind, orientation and shape are always replaced. The piece only moves to
    /// the spawn position when that position is free; otherwise it stays where
    /// it was and `false` signals a block-out.
    pub fn respawn(&mut self, kind: PieceKind, field: &Playfield) -> bool {
        self.kind = kind;
        self.orientation = Orientation::North;
        self.shape = spawn_shape(kind);

        let (x, y) = SPAWN_POSITION;
        if field.collides(&self.shape, x, y) {
            return false;
        }
        self.x = x;
        self.y = y;
        true
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn position(&self) -> (i8, i8) {
        (self.x, self.y)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Absolute playfield coordinates of the four minos
    pub fn cells(&self) -> ArrayVec<(i8, i8), 4> {
        self.shape
            .cells()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }

    /// Whether the current placement overlaps anything
    pub fn collides(&self, field: &Playfield) -> bool {
        field.collides(&self.shape, self.x, self.y)
    }

    /// Shift by (dx, dy) if the target placement is free
    fn try_shift(&mut self, field: &Playfield, dx: i8, dy: i8) -> bool {
        if field.collides(&self.shape, self.x + dx, self.y + dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    pub fn move_left(&mut self, field: &Playfield) -> bool {
        self.try_shift(field, -1, 0)
    }

    pub fn move_right(&mut self, field: &Playfield) -> bool {
        self.try_shift(field, 1, 0)
    }

    pub fn step_down(&mut self, field: &Playfield) -> bool {
        self.try_shift(field, 0, 1)
    }

    /// Whether one step down would succeed
    pub fn can_step_down(&self, field: &Playfield) -> bool {
        !field.collides(&self.shape, self.x, self.y + 1)
    }

    /// Row the piece would land on if dropped straight down.
    ///
    /// Each occupied column of the shape is probed independently from its
    /// lowest mino; the landing row is the tightest of those limits.
    pub fn ghost_y(&self, field: &Playfield) -> i8 {
        let height = BOARD_HEIGHT as i8;
        let mut landing = i8::MAX;

        for col in 0..4 {
            let Some(lowest) = self.shape.lowest_row(col) else {
                continue;
            };
            let x = self.x + col;
            let mut candidate = height - 1 - lowest;
            for row in (self.y + lowest + 1).max(0)..height {
                if field.is_obstructed(x, row) {
                    candidate = row - lowest - 1;
                    break;
                }
            }
            landing = landing.min(candidate);
        }

        if landing == i8::MAX {
            self.y
        } else {
            landing
        }
    }

    /// Move straight down to the landing row, returning the rows covered
    pub fn hard_drop(&mut self, field: &Playfield) -> u32 {
        let target = self.ghost_y(field);
        let rows = (target - self.y).max(0) as u32;
        self.y += rows as i8;
        rows
    }

    pub fn rotate_clockwise(&mut self, field: &Playfield) -> Option<u8> {
        self.rotate(field, RotationDirection::Clockwise)
    }

    pub fn rotate_counter_clockwise(&mut self, field: &Playfield) -> Option<u8> {
        self.rotate(field, RotationDirection::CounterClockwise)
    }

    /// SRS rotation: try each kick offset in order, first fit wins.
    ///
    /// Returns the 1-based index of the kick that succeeded (1 is in place,
    /// 5 is the last resort). On failure nothing changes.
    fn rotate(&mut self, field: &Playfield, direction: RotationDirection) -> Option<u8> {
        let rotated = rotate_shape(self.kind, self.shape, direction);
        let kicks = kick_offsets(self.kind, direction, self.orientation);

        for (i, &(dx, dy)) in kicks.iter().enumerate() {
            let (x, y) = (self.x + dx, self.y + dy);
            if field.collides(&rotated, x, y) {
                continue;
            }

            self.x = x;
            self.y = y;
            self.shape = rotated;
            self.orientation = match direction {
                RotationDirection::Clockwise => self.orientation.rotate_cw(),
                RotationDirection::CounterClockwise => self.orientation.rotate_ccw(),
            };
            let kick = i as u8 + 1;
            log::trace!(
                "{} rotated to {} with kick {kick} ({dx}, {dy})",
                self.kind,
                self.orientation.as_str()
            );
            return Some(kick);
        }

        log::trace!("{} rotation blocked at ({}, {})", self.kind, self.x, self.y);
        None
    }

    /// Write the piece into the playfield
    pub fn lock_down(&self, field: &mut Playfield) {
        field.lock_cells(&self.shape, self.x, self.y, self.kind);
    }

    /// Place the piece at an arbitrary position, for test setups
    #[cfg(test)]
    pub(crate) fn set_position(&mut self, x: i8, y: i8) {
        self.x = x;
        self.y = y;
    }
}
