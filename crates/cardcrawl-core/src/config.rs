//! Battle configuration and fixed rule constants.
//!
//! [`BattleConfig`] holds the tunables a host may want to change (hand size,
//! pacing delays). The arithmetic constants in [`rules`] are part of the game
//! rules and are not configurable: the damage preview shown to the player must
//! match the live pipeline exactly.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::config::BattleConfig;
//!
//! let config = BattleConfig::default();
//! assert_eq!(config.hand_size, 5);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rule constants shared by the damage, block, and status arithmetic.
pub mod rules {
    /// Incoming damage multiplier while `vulnerable` (3/2, rounded up).
    pub const VULNERABLE_MULTIPLIER: (i32, i32) = (3, 2);
    /// Outgoing damage multiplier while `weak` (3/4, rounded down).
    pub const WEAK_MULTIPLIER: (i32, i32) = (3, 4);
    /// Block gain multiplier while `frail` (3/4, rounded down).
    pub const FRAIL_MULTIPLIER: (i32, i32) = (3, 4);
    /// Default starting energy per turn.
    pub const DEFAULT_MAX_ENERGY: u32 = 3;
    /// Default number of potion slots.
    pub const DEFAULT_POTION_SLOTS: usize = 3;

    /// Multiplies `value` by `num/den`, rounding toward negative infinity.
    #[must_use]
    pub const fn scale_floor(value: i32, (num, den): (i32, i32)) -> i32 {
        (value * num).div_euclid(den)
    }

    /// Multiplies `value` by `num/den`, rounding toward positive infinity.
    #[must_use]
    pub const fn scale_ceil(value: i32, (num, den): (i32, i32)) -> i32 {
        -((-value * num).div_euclid(den))
    }
}

/// Tunable parameters for a single battle.
///
/// All fields have defaults, so a partial TOML or JSON document deserializes
/// into a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Cards drawn at the start of every player turn.
    pub hand_size: usize,
    /// Pacing delay handed to the host before the enemy turn resolves.
    pub enemy_turn_delay_ms: u64,
    /// Pacing delay handed to the host between individual hits.
    pub hit_delay_ms: u64,
}

impl BattleConfig {
    /// Pacing delay before the enemy turn.
    #[must_use]
    pub const fn enemy_turn_delay(&self) -> Duration {
        Duration::from_millis(self.enemy_turn_delay_ms)
    }

    /// Pacing delay between hits.
    #[must_use]
    pub const fn hit_delay(&self) -> Duration {
        Duration::from_millis(self.hit_delay_ms)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            hand_size: 5,
            enemy_turn_delay_ms: 600,
            hit_delay_ms: 120,
        }
    }
}
