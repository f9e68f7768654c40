//! Pausable deadline timer
//!
//! All game timing is expressed as deadlines compared against the single
//! `Instant` sampled at the start of each update. Pausing freezes the remaining
//! time so a resumed countdown picks up exactly where it left off.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseTimer {
    deadline: Instant,
    /// Remaining time, present only while paused
    paused: Option<Duration>,
}

impl PauseTimer {
    /// A running timer that has already passed at `now`
    pub fn new(now: Instant) -> Self {
        Self {
            deadline: now,
            paused: None,
        }
    }

    /// Set the deadline to `now + delay`, clearing any pause
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.set(now + delay);
    }

    /// Set an absolute deadline, clearing any pause
    pub fn set(&mut self, deadline: Instant) {
        self.deadline = deadline;
        self.paused = None;
    }

    /// True once `now` has reached the deadline; never true while paused
    pub fn has_passed(&self, now: Instant) -> bool {
        self.paused.is_none() && now >= self.deadline
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused.is_none() {
            self.paused = Some(self.deadline.saturating_duration_since(now));
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(remaining) = self.paused.take() {
            self.deadline = now + remaining;
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    /// Time left until the deadline (frozen while paused)
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.paused {
            Some(remaining) => remaining,
            None => self.deadline.saturating_duration_since(now),
        }
    }
}
