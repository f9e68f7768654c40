use arrayvec::ArrayVec;

use crate::active::ActivePiece;
use crate::types::{
    Cell, Orientation, PieceKind, SessionState, BOARD_HEIGHT, BOARD_WIDTH, QUEUE_LEN,
};

/// How a renderer should draw a mino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinoStyle {
    Normal,
    Ghost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub orientation: Orientation,
    pub x: i8,
    pub y: i8,
    /// Absolute coordinates of the four minos
    pub cells: [(i8, i8); 4],
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        let mut cells = [(0, 0); 4];
        for (slot, cell) in cells.iter_mut().zip(value.cells()) {
            *slot = cell;
        }
        Self {
            kind: value.kind(),
            orientation: value.orientation(),
            x: value.x(),
            y: value.y(),
            cells,
        }
    }
}

/// Everything a renderer needs for one frame, copied out of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Full grid including the hidden rows, `board[y][x]`
    pub board: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    /// Landing row of the active piece; `None` when it already rests there
    pub ghost_y: Option<i8>,
    pub held: Option<PieceKind>,
    pub preview: [PieceKind; QUEUE_LEN],
    pub can_hold: bool,
    pub state: SessionState,
    pub score: u32,
    pub level: u32,
    pub goal: u32,
    pub lines: u32,
    pub back_to_back: bool,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Active and ghost minos with their draw style, ghost first so the active
    /// piece paints over any overlap
    pub fn piece_cells(&self) -> ArrayVec<(i8, i8, PieceKind, MinoStyle), 8> {
        let mut out = ArrayVec::new();
        let Some(active) = self.active else {
            return out;
        };
        if let Some(ghost_y) = self.ghost_y {
            let dy = ghost_y - active.y;
            for (x, y) in active.cells {
                out.push((x, y + dy, active.kind, MinoStyle::Ghost));
            }
        }
        for (x, y) in active.cells {
            out.push((x, y, active.kind, MinoStyle::Normal));
        }
        out
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            ghost_y: None,
            held: None,
            preview: [PieceKind::I; QUEUE_LEN],
            can_hold: true,
            state: SessionState::PreInit,
            score: 0,
            level: 0,
            goal: 0,
            lines: 0,
            back_to_back: false,
        }
    }
}
