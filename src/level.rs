//! Difficulty table for the 50 levels.
//!
//! The AI flips every `max(450, 3000 - 50 * (level - 1))` milliseconds and a cleared
//! level pays `100 + 20 * (level - 1)` points. Every round deals 28 cards per side.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const LEVEL_COUNT: usize = 50;
pub const DECK_SIZE: u32 = 28;
pub const MAX_CARDS: u32 = 56;
pub const MIN_AI_FLIP_INTERVAL_MS: u64 = 450;

const BASE_AI_FLIP_INTERVAL_MS: u64 = 3_000;
const AI_FLIP_STEP_MS: u64 = 50;
const BASE_REWARD: u64 = 100;
const REWARD_STEP: u64 = 20;

/// A level number, guaranteed to lie in `1..=50`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Level(u32);

impl Level {
    pub const FIRST: Level = Level(1);
    pub const LAST: Level = Level(LEVEL_COUNT as u32);

    pub fn new(number: u32) -> Result<Self, GameError> {
        if (1..=LEVEL_COUNT as u32).contains(&number) {
            Ok(Self(number))
        } else {
            Err(GameError::InvalidLevel(number))
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// The following level, or `None` past the final one.
    pub fn next(self) -> Option<Level> {
        if self.is_last() { None } else { Some(Level(self.0 + 1)) }
    }

    /// Every level in ascending order.
    pub fn all() -> impl Iterator<Item = Level> {
        (1..=LEVEL_COUNT as u32).map(Level)
    }
}

impl TryFrom<u32> for Level {
    type Error = GameError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tuning values for a single level.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelConfig {
    pub ai_flip_interval_ms: u64,
    /// Cards dealt to each side when a round starts.
    pub deck_size: u32,
    /// Total cards across both sides. Informational only.
    pub max_cards: u32,
    pub reward: u64,
}

impl LevelConfig {
    pub fn ai_flip_interval(&self) -> Duration {
        Duration::from_millis(self.ai_flip_interval_ms)
    }
}

const fn build_table() -> [LevelConfig; LEVEL_COUNT] {
    let mut table = [LevelConfig {
        ai_flip_interval_ms: 0,
        deck_size: 0,
        max_cards: 0,
        reward: 0,
    }; LEVEL_COUNT];
    let mut i = 0;
    while i < LEVEL_COUNT {
        let step = i as u64;
        let slowdown = AI_FLIP_STEP_MS * step;
        let interval = if BASE_AI_FLIP_INTERVAL_MS > slowdown + MIN_AI_FLIP_INTERVAL_MS {
            BASE_AI_FLIP_INTERVAL_MS - slowdown
        } else {
            MIN_AI_FLIP_INTERVAL_MS
        };
        table[i] = LevelConfig {
            ai_flip_interval_ms: interval,
            deck_size: DECK_SIZE,
            max_cards: MAX_CARDS,
            reward: BASE_REWARD + REWARD_STEP * step,
        };
        i += 1;
    }
    table
}

/// Built at compile time; index `level - 1`.
pub const LEVEL_TABLE: [LevelConfig; LEVEL_COUNT] = build_table();

pub fn level_config(level: Level) -> LevelConfig {
    LEVEL_TABLE[(level.get() - 1) as usize]
}
