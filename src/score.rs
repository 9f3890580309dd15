//! Bell evaluation and scoring.
//!
//! Ringing tallies the two face-up cards into one bucket per fruit kind. The ring
//! succeeds when any bucket total is a target of the current level; it then pays the
//! level reward. Two cards of the same kind add up into a single bucket.

use serde::{Deserialize, Serialize};

use crate::card::{Card, FRUIT_KINDS, FruitType};
use crate::level::{Level, level_config};
use crate::targets::Targets;

/// Fruit totals on the table, one bucket per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FruitTally([u8; FRUIT_KINDS]);

impl FruitTally {
    pub fn from_board(player_card: Option<Card>, ai_card: Option<Card>) -> Self {
        let mut buckets = [0u8; FRUIT_KINDS];
        for card in [player_card, ai_card].into_iter().flatten() {
            buckets[card.fruit.index()] += card.count;
        }
        Self(buckets)
    }

    pub fn total(&self, fruit: FruitType) -> u8 {
        self.0[fruit.index()]
    }

    /// Buckets with at least one fruit, in enum order.
    pub fn non_zero(&self) -> impl Iterator<Item = (FruitType, u8)> + '_ {
        FruitType::ALL
            .into_iter()
            .map(|fruit| (fruit, self.total(fruit)))
            .filter(|(_, total)| *total > 0)
    }

    pub fn hits(&self, targets: &Targets) -> bool {
        self.0.iter().any(|total| targets.contains(*total))
    }

    /// Human readable board summary, e.g. `"🍇 x5, 🍌 x2"`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .non_zero()
            .map(|(fruit, total)| format!("{} x{}", fruit.icon(), total))
            .collect();
        if parts.is_empty() {
            String::from("no fruit on the table")
        } else {
            parts.join(", ")
        }
    }
}

/// Result of a bell ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BellVerdict {
    pub tally: FruitTally,
    pub targets: Targets,
    /// Points awarded; zero on a miss.
    pub reward: u64,
}

impl BellVerdict {
    pub fn evaluate(level: Level, targets: Targets, tally: FruitTally) -> Self {
        let reward = if tally.hits(&targets) {
            level_config(level).reward
        } else {
            0
        };
        Self {
            tally,
            targets,
            reward,
        }
    }

    pub fn is_success(&self) -> bool {
        self.reward > 0
    }
}
