//! Playfield module - manages the grid of locked minos
//!
//! The playfield is 10 columns by 40 rows. Rows 0..20 are a hidden spawn buffer
//! above the visible rows 20..40. Uses a flat array for cache locality and
//! zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..39 (top to bottom)

use arrayvec::ArrayVec;

use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, VISIBLE_HEIGHT, VISIBLE_START_Y};

/// Total number of cells on the playfield
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The grid of locked cells - 10 columns x 40 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Playfield {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Playfield {
    /// Create a new empty playfield
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Write a mino by raw kind id.
    ///
    /// Refuses (returns false, grid untouched) when `mino` is not a valid kind
    /// id or the position is outside the grid.
    pub fn set_at(&mut self, x: i8, y: i8, mino: u8) -> bool {
        match PieceKind::try_from(mino) {
            Ok(kind) => self.set(x, y, Some(kind)),
            Err(err) => {
                log::trace!("refusing playfield write at ({x}, {y}): {err}");
                false
            }
        }
    }

    /// True if (x, y) is outside the grid or holds a locked mino.
    ///
    /// This is the only collision primitive pieces test against.
    #[inline(always)]
    pub fn is_obstructed(&self, x: i8, y: i8) -> bool {
        match Self::index(x, y) {
            Some(idx) => self.cells[idx].is_some(),
            None => true,
        }
    }

    /// Check if a row is completely obstructed
    pub fn is_row_filled(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Clear every filled visible row and compact the rows above downward.
    ///
    /// Hidden rows are never considered for clearing but they do move down with
    /// the rest of the stack. Returns the number of rows removed.
    pub fn clear_empty_lines(&mut self) -> u32 {
        self.clear_filled_rows().len() as u32
    }

    /// Same as [`Playfield::clear_empty_lines`] but reports the cleared row
    /// indices (pre-clear coordinates, bottom to top).
    ///
    /// Two-pointer compaction: rows are decided before anything moves, so
    /// clearing is simultaneous.
    pub fn clear_filled_rows(&mut self) -> ArrayVec<usize, { VISIBLE_HEIGHT as usize }> {
        let mut cleared_rows = ArrayVec::new();
        let width = BOARD_WIDTH as usize;
        let visible_start = VISIBLE_START_Y as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if read_y >= visible_start && self.is_row_filled(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        // Vacated rows at the top
        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        if !cleared_rows.is_empty() {
            log::debug!("cleared rows {:?}", cleared_rows.as_slice());
        }
        cleared_rows
    }

    /// Write every occupied cell of `shape` placed at (x, y).
    ///
    /// Cells that fall outside the grid are skipped; placement legality is the
    /// caller's responsibility.
    pub fn lock_cells(&mut self, shape: &Shape, x: i8, y: i8, kind: PieceKind) {
        for (dx, dy) in shape.cells() {
            if !self.set(x + dx, y + dy, Some(kind)) {
                log::warn!("mino ({}, {}) of {kind} outside playfield", x + dx, y + dy);
            }
        }
    }

    /// Check whether `shape` at (x, y) overlaps a wall, the floor or a mino
    pub fn collides(&self, shape: &Shape, x: i8, y: i8) -> bool {
        shape
            .cells()
            .any(|(dx, dy)| self.is_obstructed(x + dx, y + dy))
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Visible rows, top to bottom
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[VISIBLE_START_Y as usize * BOARD_WIDTH as usize..].chunks(BOARD_WIDTH as usize)
    }

    /// Clear the entire playfield
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Create from rows given bottom-aligned, for tests.
    ///
    /// Each string is one row, `.` empty and any piece letter a mino.
    /// The last string lands on the bottom row.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut field = Self::new();
        let top = BOARD_HEIGHT as usize - rows.len();
        for (i, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    'I' => Some(PieceKind::I),
                    'J' => Some(PieceKind::J),
                    'L' => Some(PieceKind::L),
                    'O' => Some(PieceKind::O),
                    'S' => Some(PieceKind::S),
                    'T' => Some(PieceKind::T),
                    'Z' => Some(PieceKind::Z),
                    _ => None,
                };
                field.set(x as i8, (top + i) as i8, kind);
            }
        }
        field
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}
