//! Scoring module - points, levels and fall speed
//!
//! The controller reports every clear through the [`ScoringSystem`] trait so
//! the leveling policy can be swapped without touching game flow. One policy
//! ships: [`FixedGoalScoring`].
//!
//! Rules implemented by [`FixedGoalScoring`]:
//! - Line clears award `LINE_CLEAR_REWARD[n - 1] * level`.
//! - T-Spins award `T_SPIN_REWARD[n] * level`, Mini T-Spins
//!   `MINI_T_SPIN_REWARD[n] * level`; these replace the line clear points.
//! - Back-to-back applies a 3/2 multiplier to clears with lines while the flag
//!   is set. Any four-line clear sets it, any other clear with lines resets
//!   it (spins included), zero-line T-Spins leave it alone.
//! - Every clear counts towards the level goal. The first level needs 5 lines,
//!   later ones 10; lines beyond the goal carry into the next one.

use crate::types::{
    B2B_DENOMINATOR, B2B_NUMERATOR, FALL_SPEED_MIN_MS, FALL_SPEED_TABLE_MS, HARD_DROP_REWARD,
    LINES_PER_LEVEL, LINE_CLEAR_REWARD, MINI_T_SPIN_REWARD, SOFT_DROP_REWARD, STARTING_GOAL,
    STARTING_LEVEL, T_SPIN_REWARD,
};

/// Scoring and leveling policy consumed by the game controller.
///
/// The `on_*` clear hooks return the points they awarded.
pub trait ScoringSystem {
    /// A regular clear of `n` lines
    fn on_lines_cleared(&mut self, n: u32) -> u32;
    /// A full T-Spin clearing `n` lines (may be 0)
    fn on_t_spin(&mut self, n: u32) -> u32;
    /// A Mini T-Spin clearing `n` lines (may be 0)
    fn on_mini_t_spin(&mut self, n: u32) -> u32;
    /// One successful soft drop step
    fn on_soft_drop(&mut self);
    /// A hard drop covering `rows` rows
    fn on_hard_drop(&mut self, rows: u32);
    /// Back to the initial state for a new game
    fn reset(&mut self);

    fn level(&self) -> u32;
    fn goal(&self) -> u32;
    fn score(&self) -> u32;
    fn lines(&self) -> u32;
    /// Gravity interval for the current level
    fn fall_speed_ms(&self) -> u32;
    fn back_to_back(&self) -> bool;
}

/// Gravity interval for a level (levels start at 1)
pub fn fall_speed_for_level(level: u32) -> u32 {
    level
        .checked_sub(1)
        .and_then(|i| FALL_SPEED_TABLE_MS.get(i as usize))
        .copied()
        .unwrap_or(if level == 0 {
            FALL_SPEED_TABLE_MS[0]
        } else {
            FALL_SPEED_MIN_MS
        })
}

/// Apply the back-to-back multiplier (3/2, truncated)
pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// What kind of clear is being scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearKind {
    Lines,
    TSpin,
    Mini,
}

/// Fixed-goal leveling: 5 lines for the first level, 10 for every later one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedGoalScoring {
    starting_level: u32,
    level: u32,
    goal: u32,
    score: u32,
    lines: u32,
    fall_speed_ms: u32,
    back_to_back: bool,
}

impl FixedGoalScoring {
    pub fn new(starting_level: u32) -> Self {
        let starting_level = starting_level.max(1);
        Self {
            starting_level,
            level: starting_level,
            goal: STARTING_GOAL,
            score: 0,
            lines: 0,
            fall_speed_ms: fall_speed_for_level(starting_level),
            back_to_back: false,
        }
    }

    /// Points for a clear, b2b bookkeeping and goal bookkeeping in one place
    fn clear(&mut self, kind: ClearKind, n: u32) -> u32 {
        let idx = n as usize;
        let base = match kind {
            ClearKind::Lines if n == 0 => 0,
            ClearKind::Lines => last_or(&LINE_CLEAR_REWARD, idx - 1),
            ClearKind::TSpin => last_or(&T_SPIN_REWARD, idx),
            ClearKind::Mini => last_or(&MINI_T_SPIN_REWARD, idx),
        };
        let mut points = base.saturating_mul(self.level);

        if n > 0 {
            if self.back_to_back {
                points = apply_b2b_multiplier(points);
            }
            // Only a four-line clear keeps the chain, spin or not
            self.back_to_back = n == 4;
        }

        self.score = self.score.saturating_add(points);
        self.advance_goal(n);
        points
    }

    fn advance_goal(&mut self, n: u32) {
        self.lines += n;
        let overhead = i64::from(n) - i64::from(self.goal);
        self.goal = self.goal.saturating_sub(n);

        if overhead >= 0 {
            self.level += 1;
            self.goal = LINES_PER_LEVEL.saturating_sub(overhead as u32);
            log::info!("level up: {} (next goal {})", self.level, self.goal);
        }

        self.fall_speed_ms = fall_speed_for_level(self.level);
    }
}

/// Table lookup that clamps to the last entry
fn last_or(table: &[u32], idx: usize) -> u32 {
    table
        .get(idx)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

impl Default for FixedGoalScoring {
    fn default() -> Self {
        Self::new(STARTING_LEVEL)
    }
}

impl ScoringSystem for FixedGoalScoring {
    fn on_lines_cleared(&mut self, n: u32) -> u32 {
        self.clear(ClearKind::Lines, n)
    }

    fn on_t_spin(&mut self, n: u32) -> u32 {
        self.clear(ClearKind::TSpin, n)
    }

    fn on_mini_t_spin(&mut self, n: u32) -> u32 {
        self.clear(ClearKind::Mini, n)
    }

    fn on_soft_drop(&mut self) {
        self.score = self.score.saturating_add(SOFT_DROP_REWARD);
    }

    fn on_hard_drop(&mut self, rows: u32) {
        self.score = self
            .score
            .saturating_add(rows.saturating_mul(HARD_DROP_REWARD));
    }

    fn reset(&mut self) {
        *self = Self::new(self.starting_level);
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn goal(&self) -> u32 {
        self.goal
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn lines(&self) -> u32 {
        self.lines
    }

    fn fall_speed_ms(&self) -> u32 {
        self.fall_speed_ms
    }

    fn back_to_back(&self) -> bool {
        self.back_to_back
    }
}
