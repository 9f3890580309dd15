use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::card::{Card, CardGenerator, FruitType};
use crate::error::GameError;
use crate::level::{DECK_SIZE, Level};
use crate::score::{BellVerdict, FruitTally};
use crate::state::{GameState, GameStatus, Side};
use crate::store::{HighScoreStore, MemoryStore};

const DEFAULT_SEED: u64 = 0xF2_B1_7E_11_5EED_0001;

const READY_MESSAGE: &str = "Ready?";
const START_MESSAGE: &str = "Watch the fruit!";
const RESTART_MESSAGE: &str = "Try again!";

/// Configuration required to bootstrap a game instance.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub seed: u64,
    /// Level the first round is played at. Restarts always return to level 1.
    pub starting_level: Level,
    /// Card faces dealt before random generation kicks in.
    pub script: Vec<(FruitType, u8)>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            starting_level: Level::FIRST,
            script: Vec::new(),
        }
    }
}

/// Builder that enables deterministic card injection for tests and simulations.
pub struct GameBuilder {
    config: GameConfig,
    store: Option<Box<dyn HighScoreStore>>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            store: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_script(mut self, faces: impl IntoIterator<Item = (FruitType, u8)>) -> Self {
        self.config.script.extend(faces);
        self
    }

    pub fn with_starting_level(mut self, level: Level) -> Self {
        self.config.starting_level = level;
        self
    }

    /// Persist high scores through `store`. Defaults to an in-memory store.
    pub fn with_store(mut self, store: impl HighScoreStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful [`Game::flip`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flip {
    Revealed { side: Side, card: Card },
    /// The side to act had no cards left; the game is over.
    DeckExhausted { side: Side },
}

/// What an accepted action did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Started,
    Flipped(Flip),
    Rang(BellVerdict),
    Advanced(Level),
    Restarted,
}

/// Round engine: owns the game state and applies the five actions to it.
pub struct Game {
    state: GameState,
    cards: CardGenerator,
    store: Box<dyn HighScoreStore>,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        GameBuilder {
            config,
            store: None,
        }
        .build()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy of the current state, for publishing to observers.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn level(&self) -> Level {
        self.state.level
    }

    /// Dispatches a user-facing action to its operation.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, GameError> {
        match action {
            Action::Start => self.start().map(|()| Outcome::Started),
            Action::Flip => self.flip().map(Outcome::Flipped),
            Action::RingBell => self.ring_bell().map(Outcome::Rang),
            Action::NextLevel => self.next_level().map(Outcome::Advanced),
            Action::Restart => {
                self.restart();
                Ok(Outcome::Restarted)
            }
        }
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        self.require(Action::Start, GameStatus::Start)?;
        self.state = GameState {
            player_deck: DECK_SIZE,
            ai_deck: DECK_SIZE,
            player_card: None,
            ai_card: None,
            status: GameStatus::Playing,
            message: START_MESSAGE.to_string(),
            ..self.state.clone()
        };
        debug!(level = %self.state.level, "round started");
        Ok(())
    }

    /// Reveals a card for whichever side the deck parity says is next.
    pub fn flip(&mut self) -> Result<Flip, GameError> {
        self.require(Action::Flip, GameStatus::Playing)?;
        let side = self.state.turn();
        if self.state.deck(side) == 0 {
            let message = match side {
                Side::Player => "You ran out of cards!",
                Side::Ai => "The computer ran out of cards!",
            };
            self.state = GameState {
                status: GameStatus::GameOver,
                message: message.to_string(),
                ..self.state.clone()
            };
            info!(side = side.label(), level = %self.state.level, "deck exhausted");
            return Ok(Flip::DeckExhausted { side });
        }

        let card = self.cards.generate();
        let prev = &self.state;
        self.state = match side {
            Side::Player => GameState {
                player_card: Some(card),
                player_deck: prev.player_deck - 1,
                ..prev.clone()
            },
            Side::Ai => GameState {
                ai_card: Some(card),
                ai_deck: prev.ai_deck - 1,
                ..prev.clone()
            },
        };
        debug!(side = side.label(), card = %card, remaining = self.state.deck(side), "flipped");
        Ok(Flip::Revealed { side, card })
    }

    /// Judges the table against the level targets.
    pub fn ring_bell(&mut self) -> Result<BellVerdict, GameError> {
        self.require(Action::RingBell, GameStatus::Playing)?;
        let prev = &self.state;
        let tally = FruitTally::from_board(prev.player_card, prev.ai_card);
        let verdict = BellVerdict::evaluate(prev.level, prev.targets(), tally);

        if !verdict.is_success() {
            let message = format!(
                "Not a target! (On the table: {}) Targets: {}",
                tally.summary(),
                verdict.targets
            );
            self.state = GameState {
                status: GameStatus::GameOver,
                message,
                ..prev.clone()
            };
            info!(level = %self.state.level, score = self.state.score, "missed bell");
            return Ok(verdict);
        }

        let score = prev.score + verdict.reward;
        let high_score = if score > prev.high_score {
            self.persist_high_score(score);
            score
        } else {
            self.state.high_score
        };
        let prev = &self.state;
        self.state = if prev.level.is_last() {
            GameState {
                score,
                high_score,
                status: GameStatus::Victory,
                message: format!("All 50 levels conquered! Final score: {score}"),
                ..prev.clone()
            }
        } else {
            GameState {
                score,
                high_score,
                status: GameStatus::LevelClear,
                message: format!("Success! On the table: {}", tally.summary()),
                ..prev.clone()
            }
        };
        info!(
            level = %self.state.level,
            reward = verdict.reward,
            score,
            status = ?self.state.status,
            "bell hit"
        );
        Ok(verdict)
    }

    pub fn next_level(&mut self) -> Result<Level, GameError> {
        self.require(Action::NextLevel, GameStatus::LevelClear)?;
        let Some(level) = self.state.level.next() else {
            return Err(GameError::InvalidTransition {
                action: Action::NextLevel,
                status: self.state.status,
            });
        };
        self.state = GameState {
            level,
            player_deck: DECK_SIZE,
            ai_deck: DECK_SIZE,
            player_card: None,
            ai_card: None,
            status: GameStatus::Playing,
            ..self.state.clone()
        };
        debug!(level = %level, "advanced");
        Ok(level)
    }

    /// Back to level 1 with a zero score. Allowed from every status.
    pub fn restart(&mut self) {
        let high_score = self.store.load().max(self.state.high_score);
        self.state = GameState::initial(high_score, RESTART_MESSAGE);
        debug!(high_score, "restarted");
    }

    fn require(&self, action: Action, expected: GameStatus) -> Result<(), GameError> {
        if self.state.status == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                action,
                status: self.state.status,
            })
        }
    }

    fn persist_high_score(&mut self, score: u64) {
        match self.store.save(score) {
            Ok(()) => info!(score, "new high score"),
            Err(err) => warn!(score, error = %err, "failed to persist high score"),
        }
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder { config, store } = builder;
        let cards = CardGenerator::new(config.seed).with_script(config.script)?;
        let store: Box<dyn HighScoreStore> = match store {
            Some(store) => store,
            None => Box::new(MemoryStore::new()),
        };
        let mut state = GameState::initial(store.load(), READY_MESSAGE);
        state.level = config.starting_level;
        Ok(Game {
            state,
            cards,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_outside_their_status_leave_state_untouched() -> Result<(), GameError> {
        let mut game = GameBuilder::new().build()?;
        let before = game.snapshot();
        for action in [Action::Flip, Action::RingBell, Action::NextLevel] {
            let err = game.apply(action).expect_err("not allowed before start");
            assert_eq!(
                err,
                GameError::InvalidTransition {
                    action,
                    status: GameStatus::Start
                }
            );
            assert_eq!(game.state(), &before);
        }
        game.start()?;
        assert!(matches!(
            game.start(),
            Err(GameError::InvalidTransition { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_scripted_counts() {
        let result = GameBuilder::new()
            .with_script([(FruitType::Lime, 6)])
            .build();
        assert!(matches!(result, Err(GameError::InvalidConfiguration(_))));
    }

    #[test]
    fn apply_reports_outcomes() -> Result<(), GameError> {
        let mut game = GameBuilder::new()
            .with_script([(FruitType::Banana, 5)])
            .build()?;
        assert_eq!(game.apply(Action::Start)?, Outcome::Started);
        let flipped = game.apply(Action::Flip)?;
        assert!(matches!(
            flipped,
            Outcome::Flipped(Flip::Revealed {
                side: Side::Player,
                ..
            })
        ));
        let Outcome::Rang(verdict) = game.apply(Action::RingBell)? else {
            panic!("expected a bell verdict");
        };
        assert!(verdict.is_success());
        assert_eq!(game.apply(Action::NextLevel)?, Outcome::Advanced(Level::new(2)?));
        assert_eq!(game.apply(Action::Restart)?, Outcome::Restarted);
        assert_eq!(game.status(), GameStatus::Start);
        Ok(())
    }
}
