//! Edge filter: turns raw terminal key events into start/stop commands.
//!
//! The core expects clean edges: one `*Start` when a held key goes down and one
//! `*Stop` when it comes back up. Terminals are noisier than that:
//!
//! - With keyboard enhancement enabled, held keys produce `Repeat` events.
//! - Without it, held keys produce a stream of `Press` events and never a
//!   release. [`EdgeFilter::expire`] synthesizes the release once no press has
//!   been seen for a while: the initial timeout until the OS starts repeating
//!   the key, the release timeout once it has.
//!
//! Left and right are exclusive here: pressing one direction releases the
//! other, since a terminal without release events cannot tell us otherwise.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyEvent, KeyEventKind};

use crate::map::{map_key, should_quit, Key};
use crate::types::Command;

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers auto-repeat.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

// Before the first OS repeat a key may be silent for the whole initial repeat
// delay. Must stay below the core's auto-repeat delay so a tap never auto-shifts.
const DEFAULT_INITIAL_RELEASE_TIMEOUT_MS: u64 = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    seen: Instant,
    /// A repeat (or repeated press) arrived since the key went down
    repeating: bool,
}

/// Per held key, when it was last seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Held {
    left: Option<HeldKey>,
    right: Option<HeldKey>,
    soft_drop: Option<HeldKey>,
}

impl Held {
    fn slot(&mut self, key: Key) -> Option<&mut Option<HeldKey>> {
        match key {
            Key::Left => Some(&mut self.left),
            Key::Right => Some(&mut self.right),
            Key::SoftDrop => Some(&mut self.soft_drop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeFilter {
    held: Held,
    release_timeout: Duration,
    initial_release_timeout: Duration,
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeFilter {
    pub fn new() -> Self {
        Self {
            held: Held::default(),
            release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
            initial_release_timeout: Duration::from_millis(DEFAULT_INITIAL_RELEASE_TIMEOUT_MS),
        }
    }

    /// Silence after which a repeating key counts as released
    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Silence after which a key that never repeated counts as released
    pub fn with_initial_release_timeout(mut self, timeout: Duration) -> Self {
        self.initial_release_timeout = timeout;
        self
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    pub fn initial_release_timeout(&self) -> Duration {
        self.initial_release_timeout
    }

    /// Whether a held-type key is currently down
    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Left => self.held.left.is_some(),
            Key::Right => self.held.right.is_some(),
            Key::SoftDrop => self.held.soft_drop.is_some(),
            _ => false,
        }
    }

    /// Filter one key event into zero, one or two commands.
    pub fn on_key_event(&mut self, event: KeyEvent, now: Instant) -> ArrayVec<Command, 2> {
        let mut out = ArrayVec::new();
        if should_quit(event) {
            return out;
        }
        let Some(key) = map_key(event.code) else {
            return out;
        };

        match event.kind {
            KeyEventKind::Repeat => {
                // Still down: keep the release timeout from firing
                if let Some(Some(held)) = self.held.slot(key) {
                    held.seen = now;
                    held.repeating = true;
                }
            }
            KeyEventKind::Press => {
                if !key.is_held() {
                    if let Some(command) = key.press_command() {
                        out.push(command);
                    }
                    return out;
                }

                let opposite = match key {
                    Key::Left => Some(Key::Right),
                    Key::Right => Some(Key::Left),
                    _ => None,
                };
                if let Some(opposite) = opposite {
                    if self.release(opposite) {
                        if let Some(stop) = opposite.release_command() {
                            out.push(stop);
                        }
                    }
                }

                if let Some(slot) = self.held.slot(key) {
                    let already_held = slot.is_some();
                    *slot = Some(HeldKey {
                        seen: now,
                        repeating: already_held,
                    });
                    if already_held {
                        log::trace!("dropping repeated press of {key:?}");
                        return out;
                    }
                }
                if let Some(command) = key.press_command() {
                    out.push(command);
                }
            }
            KeyEventKind::Release => {
                if self.release(key) {
                    if let Some(stop) = key.release_command() {
                        out.push(stop);
                    }
                }
            }
        }
        out
    }

    /// Synthesize releases for held keys that have gone quiet.
    ///
    /// A key that has repeated is released after the release timeout; one that
    /// has not yet repeated gets the longer initial timeout.
    pub fn expire(&mut self, now: Instant) -> ArrayVec<Command, 3> {
        let mut out = ArrayVec::new();
        for key in [Key::Left, Key::Right, Key::SoftDrop] {
            let timeout = self.timeout_for(key);
            let Some(slot) = self.held.slot(key) else {
                continue;
            };
            let Some(held) = *slot else {
                continue;
            };
            if now.saturating_duration_since(held.seen) > timeout {
                *slot = None;
                if let Some(stop) = key.release_command() {
                    log::trace!("auto-release of {key:?}");
                    out.push(stop);
                }
            }
        }
        out
    }

    /// Release every held key, e.g. when the terminal loses focus
    pub fn release_all(&mut self) -> ArrayVec<Command, 3> {
        let mut out = ArrayVec::new();
        for key in [Key::Left, Key::Right, Key::SoftDrop] {
            if self.release(key) {
                if let Some(stop) = key.release_command() {
                    out.push(stop);
                }
            }
        }
        out
    }

    fn timeout_for(&mut self, key: Key) -> Duration {
        match self.held.slot(key) {
            Some(Some(held)) if held.repeating => self.release_timeout,
            _ => self.initial_release_timeout,
        }
    }

    /// Mark a key as up, returning whether it was held
    fn release(&mut self, key: Key) -> bool {
        self.held
            .slot(key)
            .and_then(|slot| slot.take())
            .is_some()
    }
}
