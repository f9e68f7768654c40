//! Key mapping from terminal key codes to logical keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::Command;

/// Logical game keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    SoftDrop,
    RotateCw,
    RotateCcw,
    HardDrop,
    Hold,
    Pause,
    Restart,
    Quit,
}

impl Key {
    /// Keys that stay active while held and produce start/stop pairs
    pub fn is_held(&self) -> bool {
        matches!(self, Key::Left | Key::Right | Key::SoftDrop)
    }

    /// Command sent when the key goes down
    pub fn press_command(&self) -> Option<Command> {
        match self {
            Key::Left => Some(Command::MoveLeftStart),
            Key::Right => Some(Command::MoveRightStart),
            Key::SoftDrop => Some(Command::SoftDropStart),
            Key::RotateCw => Some(Command::RotateClockwise),
            Key::RotateCcw => Some(Command::RotateCounterClockwise),
            Key::HardDrop => Some(Command::HardDrop),
            Key::Hold => Some(Command::Hold),
            Key::Pause => Some(Command::TogglePause),
            Key::Restart => Some(Command::Restart),
            Key::Quit => None,
        }
    }

    /// Command sent when a held key is let go
    pub fn release_command(&self) -> Option<Command> {
        match self {
            Key::Left => Some(Command::MoveLeftStop),
            Key::Right => Some(Command::MoveRightStop),
            Key::SoftDrop => Some(Command::SoftDropStop),
            _ => None,
        }
    }
}

/// Map a terminal key code to a logical key.
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        // Movement
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => Some(Key::Right),
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => Some(Key::SoftDrop),

        // Rotation
        KeyCode::Up | KeyCode::Char('k' | 'K' | 'w' | 'W' | 'x' | 'X') => Some(Key::RotateCw),
        KeyCode::Char('z' | 'Z' | 'y' | 'Y') => Some(Key::RotateCcw),

        // Actions
        KeyCode::Char(' ') => Some(Key::HardDrop),
        KeyCode::Char('c' | 'C') => Some(Key::Hold),
        KeyCode::Char('p' | 'P') | KeyCode::Esc | KeyCode::F(1) => Some(Key::Pause),
        KeyCode::Char('r' | 'R') => Some(Key::Restart),
        KeyCode::Char('q' | 'Q') => Some(Key::Quit),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q' | 'Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
