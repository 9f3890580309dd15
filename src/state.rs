use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::level::{DECK_SIZE, Level, LevelConfig, level_config};
use crate::targets::{Targets, targets_for_level};

/// Status of the whole session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Start,
    Playing,
    LevelClear,
    GameOver,
    Victory,
}

impl GameStatus {
    /// `GameOver` and `Victory` end the session until a restart.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

/// One side of the table.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Ai => "Computer",
        }
    }
}

/// Immutable snapshot of the game. The engine swaps in a new value on every transition.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub level: Level,
    pub score: u64,
    pub high_score: u64,
    pub player_deck: u32,
    pub ai_deck: u32,
    pub player_card: Option<Card>,
    pub ai_card: Option<Card>,
    pub status: GameStatus,
    /// Last outcome text. Display only.
    pub message: String,
}

impl GameState {
    /// Fresh session at level 1 in the `Start` status.
    pub fn initial(high_score: u64, message: impl Into<String>) -> Self {
        Self {
            level: Level::FIRST,
            score: 0,
            high_score,
            player_deck: DECK_SIZE,
            ai_deck: DECK_SIZE,
            player_card: None,
            ai_card: None,
            status: GameStatus::Start,
            message: message.into(),
        }
    }

    /// Whose deck the next flip draws from: the player when the remaining total is even.
    pub fn turn(&self) -> Side {
        if (self.player_deck + self.ai_deck) % 2 == 0 {
            Side::Player
        } else {
            Side::Ai
        }
    }

    pub fn deck(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_deck,
            Side::Ai => self.ai_deck,
        }
    }

    pub fn active_card(&self, side: Side) -> Option<Card> {
        match side {
            Side::Player => self.player_card,
            Side::Ai => self.ai_card,
        }
    }

    pub fn targets(&self) -> Targets {
        targets_for_level(self.level)
    }

    pub fn level_config(&self) -> LevelConfig {
        level_config(self.level)
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_belongs_to_player() {
        let state = GameState::initial(0, "Ready?");
        assert_eq!(state.turn(), Side::Player);
        let after_one = GameState {
            player_deck: DECK_SIZE - 1,
            ..state
        };
        assert_eq!(after_one.turn(), Side::Ai);
    }

    #[test]
    fn terminal_statuses() {
        assert!(GameStatus::GameOver.is_terminal());
        assert!(GameStatus::Victory.is_terminal());
        assert!(!GameStatus::LevelClear.is_terminal());
        assert!(!GameStatus::Playing.is_terminal());
    }
}
