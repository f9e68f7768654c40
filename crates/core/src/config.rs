//! Game configuration
//!
//! Defaults come from the constants in `tetrion-types`; every field can be
//! overridden with a `with_*` builder method.
//!
//! ```
//! use std::time::Duration;
//! use tetrion_core::GameConfig;
//!
//! let config = GameConfig::default()
//!     .with_seed(7)
//!     .with_starting_level(3)
//!     .with_lock_delay(Duration::from_millis(300));
//! assert_eq!(config.starting_level, 3);
//! ```

use std::time::Duration;

use crate::types::{
    AUTO_REPEAT_DELAY_MS, AUTO_REPEAT_INTERVAL_MS, LOCK_DELAY_MS, LOCK_RESET_LIMIT,
    SOFT_DROP_DIVISOR, STARTING_LEVEL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Piece sequence seed; `None` seeds from the OS
    pub seed: Option<u64>,
    pub starting_level: u32,
    pub lock_delay: Duration,
    /// Delay before a held horizontal direction starts repeating
    pub auto_repeat_delay: Duration,
    pub auto_repeat_interval: Duration,
    /// Soft drop step is `fall_speed / soft_drop_divisor`
    pub soft_drop_divisor: u32,
    pub lock_reset_limit: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_level: STARTING_LEVEL,
            lock_delay: Duration::from_millis(LOCK_DELAY_MS.into()),
            auto_repeat_delay: Duration::from_millis(AUTO_REPEAT_DELAY_MS.into()),
            auto_repeat_interval: Duration::from_millis(AUTO_REPEAT_INTERVAL_MS.into()),
            soft_drop_divisor: SOFT_DROP_DIVISOR,
            lock_reset_limit: LOCK_RESET_LIMIT,
        }
    }
}

impl GameConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_starting_level(mut self, level: u32) -> Self {
        self.starting_level = level.max(1);
        self
    }

    pub fn with_lock_delay(mut self, delay: Duration) -> Self {
        self.lock_delay = delay;
        self
    }

    pub fn with_auto_repeat(mut self, delay: Duration, interval: Duration) -> Self {
        self.auto_repeat_delay = delay;
        self.auto_repeat_interval = interval;
        self
    }

    pub fn with_soft_drop_divisor(mut self, divisor: u32) -> Self {
        self.soft_drop_divisor = divisor.max(1);
        self
    }

    pub fn with_lock_reset_limit(mut self, limit: u8) -> Self {
        self.lock_reset_limit = limit;
        self
    }

    /// Soft drop step for a given gravity interval, never below 1 ms
    pub fn soft_drop_interval(&self, fall_speed_ms: u32) -> Duration {
        let ms = (fall_speed_ms / self.soft_drop_divisor.max(1)).max(1);
        Duration::from_millis(ms.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_constants() {
        let config = GameConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.starting_level, 1);
        assert_eq!(config.lock_delay, Duration::from_millis(500));
        assert_eq!(config.auto_repeat_delay, Duration::from_millis(500));
        assert_eq!(config.auto_repeat_interval, Duration::from_millis(50));
        assert_eq!(config.lock_reset_limit, 15);
    }

    #[test]
    fn test_soft_drop_interval() {
        let config = GameConfig::default();
        assert_eq!(config.soft_drop_interval(1000), Duration::from_millis(50));
        assert_eq!(config.soft_drop_interval(7), Duration::from_millis(1));

        let config = config.with_soft_drop_divisor(0);
        assert_eq!(config.soft_drop_interval(100), Duration::from_millis(100));
    }
}
