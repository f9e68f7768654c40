//! Game controller - session state machine, timing and command handling
//!
//! The controller owns the playfield, the active piece, the randomizer and the
//! scoring system. It is driven from the outside:
//!
//! - [`GameController::update`] once per frame with one clock sample
//! - [`GameController::handle_command`] for each edge-triggered [`Command`]
//!
//! # Session states
//!
//! ```text
//! PreInit --start--> Running <--TogglePause--> Paused
//!                       |
//!                   block-out
//!                       v
//!                   GameOver --Restart--> Running
//! ```
//!
//! # Timing
//!
//! All timing is deadline based ([`PauseTimer`]). Gravity steps the piece down
//! every `fall_speed_ms` of the current level, soft drop every
//! `fall_speed / 20` (at least 1 ms). Once the piece rests on a surface a lock
//! deadline is armed; successful moves and rotations while resting push it
//! back, up to `lock_reset_limit` times per piece.
//!
//! # Lock sequence
//!
//! 1. Classify a T-Spin from the corners around the T before it locks
//! 2. Write the piece into the playfield
//! 3. Respawn from the queue (a blocked spawn ends the game)
//! 4. Clear lines and report them to the scoring system
//! 5. Record a [`LockEvent`] and take one forced gravity step

use std::time::{Duration, Instant};

use crate::active::ActivePiece;
use crate::bag::RandomizationQueue;
use crate::config::GameConfig;
use crate::playfield::Playfield;
use crate::scoring::{FixedGoalScoring, ScoringSystem};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::timer::PauseTimer;
use crate::types::{
    Command, LockEvent, Orientation, PieceKind, RotationDirection, SessionState, TSpinKind,
    BOARD_WIDTH, QUEUE_LEN,
};

/// Corners of the T's 3x3 box, relative to the piece position
const TOP_LEFT: (i8, i8) = (0, 0);
const TOP_RIGHT: (i8, i8) = (2, 0);
const BOTTOM_LEFT: (i8, i8) = (0, 2);
const BOTTOM_RIGHT: (i8, i8) = (2, 2);

/// Kick index of the last-resort SRS test
const LAST_RESORT_KICK: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Timers {
    gravity: PauseTimer,
    soft_drop: PauseTimer,
    lock: PauseTimer,
    repeat_left: PauseTimer,
    repeat_right: PauseTimer,
}

impl Timers {
    fn new(now: Instant) -> Self {
        Self {
            gravity: PauseTimer::new(now),
            soft_drop: PauseTimer::new(now),
            lock: PauseTimer::new(now),
            repeat_left: PauseTimer::new(now),
            repeat_right: PauseTimer::new(now),
        }
    }

    fn each(&mut self) -> [&mut PauseTimer; 5] {
        [
            &mut self.gravity,
            &mut self.soft_drop,
            &mut self.lock,
            &mut self.repeat_left,
            &mut self.repeat_right,
        ]
    }
}

/// A complete game session
#[derive(Debug, Clone)]
pub struct GameController<S: ScoringSystem = FixedGoalScoring> {
    config: GameConfig,
    scoring: S,
    playfield: Playfield,
    queue: RandomizationQueue,
    active: Option<ActivePiece>,
    state: SessionState,
    held: Option<PieceKind>,
    can_hold: bool,
    timers: Timers,
    moving_left: bool,
    moving_right: bool,
    soft_dropping: bool,
    /// Whether the piece rested on a surface at the last update
    in_contact: bool,
    last_action_was_rotation: bool,
    /// 1-based index of the kick used by the last successful rotation
    last_kick: Option<u8>,
    lock_resets: u8,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
}

impl GameController<FixedGoalScoring> {
    /// Create a session scored with [`FixedGoalScoring`]
    pub fn new(config: GameConfig) -> Self {
        let scoring = FixedGoalScoring::new(config.starting_level);
        Self::with_scoring(config, scoring)
    }
}

impl Default for GameController<FixedGoalScoring> {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl<S: ScoringSystem> GameController<S> {
    /// Create a session with a custom scoring system.
    ///
    /// The session waits in [`SessionState::PreInit`] until [`start`](Self::start).
    pub fn with_scoring(config: GameConfig, scoring: S) -> Self {
        let queue = match config.seed {
            Some(seed) => RandomizationQueue::new(seed),
            None => RandomizationQueue::from_os_rng(),
        };
        Self {
            config,
            scoring,
            playfield: Playfield::new(),
            queue,
            active: None,
            state: SessionState::PreInit,
            held: None,
            can_hold: true,
            timers: Timers::new(Instant::now()),
            moving_left: false,
            moving_right: false,
            soft_dropping: false,
            in_contact: false,
            last_action_was_rotation: false,
            last_kick: None,
            lock_resets: 0,
            last_event: None,
        }
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != SessionState::PreInit {
            return false;
        }
        log::info!("game started");
        self.begin(now);
        true
    }

    /// Shared by start and restart: fresh session flags, timers and first piece
    fn begin(&mut self, now: Instant) {
        self.state = SessionState::Running;
        self.held = None;
        self.can_hold = true;
        self.moving_left = false;
        self.moving_right = false;
        self.soft_dropping = false;
        self.last_event = None;
        self.reset_piece_state();

        self.timers = Timers::new(now);
        self.timers.gravity.schedule(now, self.fall_interval());

        let piece = ActivePiece::spawn(self.queue.pull_next());
        self.active = Some(piece);
        if piece.collides(&self.playfield) {
            self.game_over("first piece blocked");
        }
    }

    fn reset_piece_state(&mut self) {
        self.last_action_was_rotation = false;
        self.last_kick = None;
        self.lock_resets = 0;
        self.in_contact = false;
    }

    fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.scoring.fall_speed_ms().into())
    }

    fn soft_drop_interval(&self) -> Duration {
        self.config
            .soft_drop_interval(self.scoring.fall_speed_ms())
    }

    fn game_over(&mut self, reason: &str) {
        self.state = SessionState::GameOver;
        self.moving_left = false;
        self.moving_right = false;
        self.soft_dropping = false;
        log::info!(
            "game over ({reason}): score {} level {} lines {}",
            self.scoring.score(),
            self.scoring.level(),
            self.scoring.lines()
        );
    }

    /// Advance the simulation to `now`.
    ///
    /// Handles auto-repeat, surface contact, lock-down, soft drop and gravity,
    /// in that order. Does nothing unless the session is running.
    pub fn update(&mut self, now: Instant) {
        if self.state != SessionState::Running {
            return;
        }

        if self.moving_left && self.timers.repeat_left.has_passed(now) {
            self.shift(Shift::Left, now);
            self.timers
                .repeat_left
                .schedule(now, self.config.auto_repeat_interval);
        }
        if self.moving_right && self.timers.repeat_right.has_passed(now) {
            self.shift(Shift::Right, now);
            self.timers
                .repeat_right
                .schedule(now, self.config.auto_repeat_interval);
        }

        let Some(piece) = self.active else {
            return;
        };

        let contact = !piece.can_step_down(&self.playfield);
        if contact && !self.in_contact {
            self.timers.lock.schedule(now, self.config.lock_delay);
        } else if !contact && self.in_contact {
            self.timers.gravity.schedule(now, self.fall_interval());
            self.timers.soft_drop.schedule(now, self.soft_drop_interval());
        }
        self.in_contact = contact;

        if contact && self.timers.lock.has_passed(now) {
            self.lock_sequence(now);
        } else if self.soft_dropping && self.timers.soft_drop.has_passed(now) {
            if self.step_down() {
                self.scoring.on_soft_drop();
            }
            self.timers.soft_drop.schedule(now, self.soft_drop_interval());
        } else if self.timers.gravity.has_passed(now) {
            self.step_down();
            self.timers.gravity.schedule(now, self.fall_interval());
        }
    }

    /// Apply one command. Returns whether it had an effect.
    ///
    /// Releases are accepted in any state so a key let go during a pause is
    /// not stuck afterwards. Gameplay commands need a running session.
    pub fn handle_command(&mut self, command: Command, now: Instant) -> bool {
        log::trace!("command {}", command.as_str());
        match command {
            Command::MoveLeftStop => {
                self.moving_left = false;
                true
            }
            Command::MoveRightStop => {
                self.moving_right = false;
                true
            }
            Command::SoftDropStop => {
                self.soft_dropping = false;
                true
            }
            Command::TogglePause => self.toggle_pause(now),
            Command::Restart => self.restart(now),
            _ if self.state != SessionState::Running => false,
            Command::MoveLeftStart => {
                self.moving_left = true;
                self.timers
                    .repeat_left
                    .schedule(now, self.config.auto_repeat_delay);
                self.shift(Shift::Left, now)
            }
            Command::MoveRightStart => {
                self.moving_right = true;
                self.timers
                    .repeat_right
                    .schedule(now, self.config.auto_repeat_delay);
                self.shift(Shift::Right, now)
            }
            Command::SoftDropStart => {
                self.soft_dropping = true;
                self.timers.soft_drop.set(now);
                true
            }
            Command::RotateClockwise => self.rotate(RotationDirection::Clockwise, now),
            Command::RotateCounterClockwise => {
                self.rotate(RotationDirection::CounterClockwise, now)
            }
            Command::HardDrop => self.hard_drop(now),
            Command::Hold => self.hold(now),
        }
    }

    fn shift(&mut self, direction: Shift, now: Instant) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let moved = match direction {
            Shift::Left => piece.move_left(&self.playfield),
            Shift::Right => piece.move_right(&self.playfield),
        };
        if moved {
            self.last_action_was_rotation = false;
            self.extend_lock_delay(now);
        }
        moved
    }

    fn step_down(&mut self) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let moved = piece.step_down(&self.playfield);
        if moved {
            self.last_action_was_rotation = false;
        }
        moved
    }

    fn rotate(&mut self, direction: RotationDirection, now: Instant) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let kick = match direction {
            RotationDirection::Clockwise => piece.rotate_clockwise(&self.playfield),
            RotationDirection::CounterClockwise => piece.rotate_counter_clockwise(&self.playfield),
        };
        let Some(kick) = kick else {
            return false;
        };
        self.last_kick = Some(kick);
        self.last_action_was_rotation = true;
        self.extend_lock_delay(now);
        true
    }

    /// Push the lock deadline back after a successful move while resting
    fn extend_lock_delay(&mut self, now: Instant) {
        if !self.in_contact || self.lock_resets >= self.config.lock_reset_limit {
            return;
        }
        let Some(piece) = self.active else {
            return;
        };
        // Moved off the ledge: the next update restarts gravity instead
        if piece.can_step_down(&self.playfield) {
            return;
        }
        self.timers.lock.schedule(now, self.config.lock_delay);
        self.lock_resets += 1;
    }

    fn hard_drop(&mut self, now: Instant) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let rows = piece.hard_drop(&self.playfield);
        self.scoring.on_hard_drop(rows);
        if rows > 0 {
            self.last_action_was_rotation = false;
        }
        self.lock_sequence(now);
        true
    }

    fn lock_sequence(&mut self, now: Instant) {
        let Some(mut piece) = self.active else {
            return;
        };

        let t_spin = self.classify_t_spin(&piece);
        piece.lock_down(&mut self.playfield);
        let locked = piece.kind();

        let next = self.queue.pull_next();
        let spawned = piece.respawn(next, &self.playfield);
        self.active = Some(piece);
        self.reset_piece_state();
        if !spawned {
            self.game_over("block out on spawn");
            return;
        }

        let level_before = self.scoring.level();
        let lines = self.playfield.clear_empty_lines();
        let points = match t_spin {
            TSpinKind::None => self.scoring.on_lines_cleared(lines),
            TSpinKind::Mini => self.scoring.on_mini_t_spin(lines),
            TSpinKind::Full => self.scoring.on_t_spin(lines),
        };
        self.timers.gravity.schedule(now, self.fall_interval());
        self.can_hold = true;

        let event = LockEvent {
            lines_cleared: lines,
            t_spin,
            points,
            back_to_back: self.scoring.back_to_back(),
            level_up: self.scoring.level() > level_before,
        };
        log::debug!(
            "locked {locked}: {lines} lines, t-spin {}, {points} points",
            t_spin.as_str().unwrap_or("none")
        );
        self.last_event = Some(event);

        // Compaction can move hidden-row minos into the piece just spawned
        if lines > 0 && piece.collides(&self.playfield) {
            self.game_over("stack shifted into spawned piece");
            return;
        }

        self.step_down();
    }

    /// T-Spin classification from the four corners of the T's 3x3 box.
    ///
    /// Front corners are the two on the side the T points to.
    /// - Full: both front and at least one back corner, or the rotation took
    ///   the last-resort kick
    /// - Mini: both back and at least one front corner
    fn classify_t_spin(&self, piece: &ActivePiece) -> TSpinKind {
        if piece.kind() != PieceKind::T || !self.last_action_was_rotation {
            return TSpinKind::None;
        }

        let (x, y) = piece.position();
        let obstructed = |corners: [(i8, i8); 2]| {
            corners
                .iter()
                .filter(|&&(cx, cy)| self.playfield.is_obstructed(x + cx, y + cy))
                .count()
        };

        let (front, back) = match piece.orientation() {
            Orientation::North => ([TOP_LEFT, TOP_RIGHT], [BOTTOM_LEFT, BOTTOM_RIGHT]),
            Orientation::East => ([TOP_RIGHT, BOTTOM_RIGHT], [TOP_LEFT, BOTTOM_LEFT]),
            Orientation::South => ([BOTTOM_LEFT, BOTTOM_RIGHT], [TOP_LEFT, TOP_RIGHT]),
            Orientation::West => ([TOP_LEFT, BOTTOM_LEFT], [TOP_RIGHT, BOTTOM_RIGHT]),
        };
        let front = obstructed(front);
        let back = obstructed(back);

        if (front == 2 && back >= 1) || self.last_kick == Some(LAST_RESORT_KICK) {
            TSpinKind::Full
        } else if back == 2 && front >= 1 {
            TSpinKind::Mini
        } else {
            TSpinKind::None
        }
    }

    fn hold(&mut self, now: Instant) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(mut piece) = self.active else {
            return false;
        };

        let current = piece.kind();
        let next = match self.held.replace(current) {
            Some(kind) => kind,
            None => self.queue.pull_next(),
        };
        self.can_hold = false;
        self.reset_piece_state();
        self.timers.gravity.schedule(now, self.fall_interval());

        let spawned = piece.respawn(next, &self.playfield);
        self.active = Some(piece);
        log::debug!("hold: stored {current}, playing {next}");
        if !spawned {
            self.game_over("block out on hold");
            return true;
        }
        self.step_down();
        true
    }

    fn toggle_pause(&mut self, now: Instant) -> bool {
        match self.state {
            SessionState::Running => {
                for timer in self.timers.each() {
                    timer.pause(now);
                }
                self.state = SessionState::Paused;
                log::info!("paused");
                true
            }
            SessionState::Paused => {
                for timer in self.timers.each() {
                    timer.resume(now);
                }
                self.state = SessionState::Running;
                log::info!("resumed");
                true
            }
            SessionState::PreInit | SessionState::GameOver => false,
        }
    }

    fn restart(&mut self, now: Instant) -> bool {
        if self.state != SessionState::GameOver {
            return false;
        }
        self.playfield.reset();
        self.queue.reset();
        self.scoring.reset();
        log::info!("game restarted");
        self.begin(now);
        true
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// The falling piece; `None` before the game starts
    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|piece| piece.ghost_y(&self.playfield))
    }

    pub fn preview(&self) -> [PieceKind; QUEUE_LEN] {
        self.queue.preview()
    }

    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        for (row, src) in out
            .board
            .iter_mut()
            .zip(self.playfield.cells().chunks(BOARD_WIDTH as usize))
        {
            row.copy_from_slice(src);
        }

        out.active = self.active.as_ref().map(ActiveSnapshot::from);
        out.ghost_y = self.active.and_then(|piece| {
            let ghost = piece.ghost_y(&self.playfield);
            (ghost != piece.y()).then_some(ghost)
        });
        out.held = self.held;
        out.preview = self.queue.preview();
        out.can_hold = self.can_hold;
        out.state = self.state;
        out.score = self.scoring.score();
        out.level = self.scoring.level();
        out.goal = self.scoring.goal();
        out.lines = self.scoring.lines();
        out.back_to_back = self.scoring.back_to_back();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    #[cfg(test)]
    pub(crate) fn playfield_mut(&mut self) -> &mut Playfield {
        &mut self.playfield
    }

    /// Replace the active piece, for test setups
    #[cfg(test)]
    pub(crate) fn force_active(&mut self, piece: ActivePiece) {
        self.active = Some(piece);
        self.reset_piece_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn started(seed: u64) -> (GameController, Instant) {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
        let mut game = GameController::new(GameConfig::default().with_seed(seed));
        let t0 = Instant::now();
        assert!(game.start(t0));
        (game, t0)
    }

    fn piece_at(kind: PieceKind, cw_turns: usize, x: i8, y: i8) -> ActivePiece {
        let empty = Playfield::new();
        let mut piece = ActivePiece::spawn(kind);
        for _ in 0..cw_turns {
            piece.rotate_clockwise(&empty);
        }
        piece.set_position(x, y);
        piece
    }

    fn fill_row_except(field: &mut Playfield, y: i8, holes: &[i8]) {
        for x in 0..10 {
            if !holes.contains(&x) {
                field.set(x, y, Some(PieceKind::Z));
            }
        }
    }

    #[test]
    fn test_new_controller_waits_for_start() {
        let mut game = GameController::new(GameConfig::default().with_seed(1));
        let now = Instant::now();
        assert_eq!(game.state(), SessionState::PreInit);
        assert!(game.active().is_none());

        assert!(!game.handle_command(Command::MoveLeftStart, now));
        assert!(!game.handle_command(Command::HardDrop, now));
        assert!(!game.handle_command(Command::TogglePause, now));
        assert!(game.handle_command(Command::MoveLeftStop, now));

        game.update(now + ms(5_000));
        assert!(game.active().is_none());
    }

    #[test]
    fn test_start_spawns_first_piece() {
        let mut game = GameController::new(GameConfig::default().with_seed(3));
        let t0 = Instant::now();
        let expected = game.preview()[0];

        assert!(game.start(t0));
        assert!(!game.start(t0));
        assert_eq!(game.state(), SessionState::Running);
        let piece = game.active().copied().unwrap();
        assert_eq!(piece.kind(), expected);
        assert_eq!(piece.position(), (3, 18));
    }

    #[test]
    fn test_gravity_follows_fall_speed() {
        let (mut game, t0) = started(5);
        game.update(t0 + ms(999));
        assert_eq!(game.active().unwrap().y(), 18);
        game.update(t0 + ms(1_000));
        assert_eq!(game.active().unwrap().y(), 19);
        game.update(t0 + ms(1_999));
        assert_eq!(game.active().unwrap().y(), 19);
        game.update(t0 + ms(2_000));
        assert_eq!(game.active().unwrap().y(), 20);
    }

    #[test]
    fn test_four_rotations_restore_t() {
        let (mut game, t0) = started(5);
        game.force_active(ActivePiece::spawn(PieceKind::T));
        let before = *game.active().unwrap();

        for _ in 0..4 {
            assert!(game.handle_command(Command::RotateClockwise, t0));
        }
        let after = *game.active().unwrap();
        assert_eq!(after.orientation(), Orientation::North);
        assert_eq!(after.shape(), before.shape());
        assert_eq!(after.position(), before.position());
    }

    #[test]
    fn test_hard_drop_locks_and_records_event() {
        let (mut game, t0) = started(11);
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 0);
        assert_eq!(event.t_spin, TSpinKind::None);
        assert!(game.take_last_event().is_none());

        assert!(game.scoring().score() >= 2 * 18);
        assert!(game.playfield().cells().iter().filter(|c| c.is_some()).count() == 4);
        // Forced gravity step after the respawn
        assert_eq!(game.active().unwrap().y(), 19);
    }

    #[test]
    fn test_locking_into_gap_clears_row() {
        let (mut game, t0) = started(2);
        fill_row_except(game.playfield_mut(), 39, &[0]);
        game.playfield_mut().set(5, 38, Some(PieceKind::S));

        // Vertical I in column 0
        game.force_active(piece_at(PieceKind::I, 1, -2, 30));
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.points, 100);
        assert_eq!(game.scoring().lines(), 1);
        assert_eq!(game.scoring().score(), 6 * 2 + 100);

        let field = game.playfield();
        assert_eq!(field.get(5, 39), Some(Some(PieceKind::S)));
        assert_eq!(field.get(0, 39), Some(Some(PieceKind::I)));
        assert_eq!(field.get(0, 37), Some(Some(PieceKind::I)));
        assert_eq!(field.get(0, 36), Some(None));
        assert_eq!(field.get(1, 39), Some(None));
    }

    #[test]
    fn test_t_spin_double() {
        let (mut game, t0) = started(2);
        let field = game.playfield_mut();
        fill_row_except(field, 39, &[4]);
        fill_row_except(field, 38, &[3, 4, 5]);
        field.set(3, 37, Some(PieceKind::L));

        game.force_active(piece_at(PieceKind::T, 1, 3, 37));
        assert!(game.handle_command(Command::RotateClockwise, t0));
        assert_eq!(game.active().unwrap().orientation(), Orientation::South);
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.t_spin, TSpinKind::Full);
        assert_eq!(event.lines_cleared, 2);
        assert_eq!(event.points, 1200);
        // Only four-line clears start a back-to-back chain
        assert!(!event.back_to_back);
        assert!(!event.level_up);
        assert_eq!(game.playfield().get(3, 39), Some(Some(PieceKind::L)));
    }

    #[test]
    fn test_mini_t_spin_without_lines() {
        let (mut game, t0) = started(2);
        let field = game.playfield_mut();
        field.set(4, 39, Some(PieceKind::J));
        field.set(6, 39, Some(PieceKind::J));
        field.set(4, 37, Some(PieceKind::J));

        game.force_active(piece_at(PieceKind::T, 1, 4, 37));
        assert!(game.handle_command(Command::RotateCounterClockwise, t0));
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.t_spin, TSpinKind::Mini);
        assert_eq!(event.lines_cleared, 0);
        assert_eq!(event.points, 100);
    }

    #[test]
    fn test_last_resort_kick_is_full_t_spin() {
        let (mut game, _) = started(2);
        let piece = piece_at(PieceKind::T, 0, 3, 30);
        game.force_active(piece);
        assert_eq!(game.classify_t_spin(&piece), TSpinKind::None);

        game.last_action_was_rotation = true;
        game.last_kick = Some(LAST_RESORT_KICK);
        assert_eq!(game.classify_t_spin(&piece), TSpinKind::Full);

        // Non-T pieces never count
        let piece = piece_at(PieceKind::L, 0, 3, 30);
        assert_eq!(game.classify_t_spin(&piece), TSpinKind::None);
    }

    #[test]
    fn test_moves_clear_rotation_flag() {
        let (mut game, t0) = started(2);
        game.force_active(ActivePiece::spawn(PieceKind::T));

        assert!(game.handle_command(Command::RotateClockwise, t0));
        assert!(game.last_action_was_rotation);
        assert_eq!(game.last_kick, Some(1));
        assert!(game.handle_command(Command::MoveRightStart, t0));
        assert!(!game.last_action_was_rotation);
        game.handle_command(Command::MoveRightStop, t0);

        assert!(game.handle_command(Command::RotateCounterClockwise, t0));
        assert!(game.last_action_was_rotation);
        game.update(t0 + ms(1_000));
        assert_eq!(game.active().unwrap().y(), 19);
        assert!(!game.last_action_was_rotation);
    }

    #[test]
    fn test_hard_drop_in_place_keeps_rotation_flag() {
        let (mut game, t0) = started(2);
        let field = game.playfield_mut();
        fill_row_except(field, 39, &[4]);
        fill_row_except(field, 38, &[3, 4, 5]);
        field.set(3, 37, Some(PieceKind::L));

        // Already resting in the slot once rotated: the drop covers no rows
        game.force_active(piece_at(PieceKind::T, 1, 3, 37));
        assert!(game.handle_command(Command::RotateClockwise, t0));
        assert_eq!(game.ghost_y(), Some(37));
        let score_before = game.scoring().score();
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.t_spin, TSpinKind::Full);
        assert_eq!(game.scoring().score() - score_before, event.points);
    }

    #[test]
    fn test_hard_drop_from_above_cancels_spin() {
        let (mut game, t0) = started(2);
        let field = game.playfield_mut();
        fill_row_except(field, 39, &[4]);
        fill_row_except(field, 38, &[3, 4, 5]);
        field.set(3, 37, Some(PieceKind::L));

        // Rotate high above the slot, then fall: the drop cancels the spin
        game.force_active(piece_at(PieceKind::T, 2, 3, 30));
        assert!(game.handle_command(Command::RotateClockwise, t0));
        assert!(game.handle_command(Command::RotateCounterClockwise, t0));
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.t_spin, TSpinKind::None);
    }

    #[test]
    fn test_lock_delay_after_contact() {
        let (mut game, t0) = started(4);
        game.force_active(piece_at(PieceKind::O, 0, 3, 38));

        game.update(t0);
        assert!(game.take_last_event().is_none());
        game.update(t0 + ms(499));
        assert!(game.take_last_event().is_none());
        game.update(t0 + ms(500));
        assert!(game.take_last_event().is_some());
    }

    #[test]
    fn test_move_while_resting_resets_lock_delay() {
        let (mut game, t0) = started(4);
        game.force_active(piece_at(PieceKind::O, 0, 3, 38));

        game.update(t0);
        assert!(game.handle_command(Command::MoveLeftStart, t0 + ms(400)));
        assert!(game.handle_command(Command::MoveLeftStop, t0 + ms(400)));

        game.update(t0 + ms(899));
        assert!(game.take_last_event().is_none());
        game.update(t0 + ms(900));
        assert!(game.take_last_event().is_some());
    }

    #[test]
    fn test_leaving_ledge_restarts_gravity() {
        let (mut game, t0) = started(4);
        // O at x 4..5 resting on a single mino under column 5
        game.playfield_mut().set(5, 32, Some(PieceKind::Z));
        game.force_active(piece_at(PieceKind::O, 0, 3, 30));

        game.update(t0 + ms(100));
        assert!(game.in_contact);

        // Off the ledge before the lock deadline; the old gravity deadline
        // (t0 + 1000) no longer applies
        assert!(game.handle_command(Command::MoveLeftStart, t0 + ms(500)));
        assert!(game.handle_command(Command::MoveLeftStop, t0 + ms(500)));
        game.update(t0 + ms(500));
        assert!(!game.in_contact);
        assert_eq!(game.active().unwrap().position(), (2, 30));

        game.update(t0 + ms(1_000));
        assert_eq!(game.active().unwrap().y(), 30);
        game.update(t0 + ms(1_499));
        assert_eq!(game.active().unwrap().y(), 30);
        game.update(t0 + ms(1_500));
        assert_eq!(game.active().unwrap().y(), 31);
        assert!(game.take_last_event().is_none());
    }

    #[test]
    fn test_lock_reset_limit() {
        let mut game = GameController::new(
            GameConfig::default()
                .with_seed(4)
                .with_lock_reset_limit(0),
        );
        let t0 = Instant::now();
        game.start(t0);
        game.force_active(piece_at(PieceKind::O, 0, 3, 38));

        game.update(t0);
        game.handle_command(Command::MoveLeftStart, t0 + ms(400));
        game.handle_command(Command::MoveLeftStop, t0 + ms(400));
        game.update(t0 + ms(500));
        assert!(game.take_last_event().is_some());
    }

    #[test]
    fn test_auto_repeat() {
        let (mut game, t0) = started(6);
        game.force_active(ActivePiece::spawn(PieceKind::T));

        assert!(game.handle_command(Command::MoveRightStart, t0));
        assert_eq!(game.active().unwrap().x(), 4);

        game.update(t0 + ms(499));
        assert_eq!(game.active().unwrap().x(), 4);
        game.update(t0 + ms(500));
        assert_eq!(game.active().unwrap().x(), 5);
        game.update(t0 + ms(549));
        assert_eq!(game.active().unwrap().x(), 5);
        game.update(t0 + ms(550));
        assert_eq!(game.active().unwrap().x(), 6);

        assert!(game.handle_command(Command::MoveRightStop, t0 + ms(560)));
        game.update(t0 + ms(700));
        assert_eq!(game.active().unwrap().x(), 6);
    }

    #[test]
    fn test_soft_drop() {
        let (mut game, t0) = started(6);
        assert!(game.handle_command(Command::SoftDropStart, t0));

        game.update(t0);
        assert_eq!(game.active().unwrap().y(), 19);
        assert_eq!(game.scoring().score(), 1);

        game.update(t0 + ms(49));
        assert_eq!(game.active().unwrap().y(), 19);
        game.update(t0 + ms(50));
        assert_eq!(game.active().unwrap().y(), 20);
        assert_eq!(game.scoring().score(), 2);

        game.handle_command(Command::SoftDropStop, t0 + ms(60));
        game.update(t0 + ms(100));
        assert_eq!(game.active().unwrap().y(), 20);
    }

    #[test]
    fn test_pause_preserves_gravity_countdown() {
        let (mut game, t0) = started(8);

        assert!(game.handle_command(Command::TogglePause, t0 + ms(400)));
        assert_eq!(game.state(), SessionState::Paused);
        assert!(!game.handle_command(Command::HardDrop, t0 + ms(500)));
        game.update(t0 + ms(2_000));
        assert_eq!(game.active().unwrap().y(), 18);

        assert!(game.handle_command(Command::TogglePause, t0 + ms(5_000)));
        assert_eq!(game.state(), SessionState::Running);
        game.update(t0 + ms(5_599));
        assert_eq!(game.active().unwrap().y(), 18);
        game.update(t0 + ms(5_600));
        assert_eq!(game.active().unwrap().y(), 19);
    }

    #[test]
    fn test_hold_and_swap() {
        let (mut game, t0) = started(9);
        let first = game.active().unwrap().kind();
        let next = game.preview()[0];

        assert!(game.handle_command(Command::Hold, t0));
        assert_eq!(game.held(), Some(first));
        assert_eq!(game.active().unwrap().kind(), next);
        assert_eq!(game.active().unwrap().y(), 19);
        assert!(!game.can_hold());
        assert!(!game.handle_command(Command::Hold, t0));

        assert!(game.handle_command(Command::HardDrop, t0));
        assert!(game.can_hold());
        let third = game.active().unwrap().kind();

        assert!(game.handle_command(Command::Hold, t0));
        assert_eq!(game.active().unwrap().kind(), first);
        assert_eq!(game.held(), Some(third));
    }

    #[test]
    fn test_block_out_and_restart() {
        let (mut game, t0) = started(10);
        game.force_active(piece_at(PieceKind::O, 0, -1, 30));
        // Every spawn shape covers (4, 19)
        game.playfield_mut().set(4, 19, Some(PieceKind::Z));

        assert!(game.handle_command(Command::HardDrop, t0));
        assert_eq!(game.state(), SessionState::GameOver);
        assert!(!game.handle_command(Command::MoveLeftStart, t0));
        assert!(!game.handle_command(Command::TogglePause, t0));

        let frozen = game.snapshot();
        game.update(t0 + ms(10_000));
        assert_eq!(game.snapshot(), frozen);

        assert!(game.handle_command(Command::Restart, t0 + ms(10_000)));
        assert_eq!(game.state(), SessionState::Running);
        assert_eq!(game.scoring().score(), 0);
        assert_eq!(game.held(), None);
        assert!(game.playfield().cells().iter().all(|c| c.is_none()));
        assert!(!game.handle_command(Command::Restart, t0 + ms(10_000)));
    }

    #[test]
    fn test_clear_shifting_hidden_minos_into_spawn_is_block_out() {
        let (mut game, t0) = started(13);
        let field = game.playfield_mut();
        fill_row_except(field, 39, &[0]);
        // Clear of the spawn box before the clear, inside it after one row
        // of compaction, whatever kind comes next
        for x in 3..6 {
            field.set(x, 17, Some(PieceKind::S));
        }
        field.set(6, 18, Some(PieceKind::S));

        game.force_active(piece_at(PieceKind::I, 1, -2, 30));
        assert!(game.handle_command(Command::HardDrop, t0));

        let event = game.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(game.state(), SessionState::GameOver);
        assert_eq!(game.playfield().get(4, 18), Some(Some(PieceKind::S)));
        assert_eq!(game.playfield().get(6, 19), Some(Some(PieceKind::S)));
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let (mut game, t0) = started(12);
        game.handle_command(Command::Hold, t0);

        let snapshot = game.snapshot();
        assert_eq!(snapshot.state, SessionState::Running);
        assert_eq!(snapshot.held, game.held());
        assert_eq!(snapshot.preview, game.preview());
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.goal, 5);
        assert!(snapshot.ghost_y.is_some());
        assert_eq!(snapshot.piece_cells().len(), 8);

        let mut reused = GameSnapshot::default();
        game.snapshot_into(&mut reused);
        assert_eq!(reused, snapshot);
    }
}
