//! Fruit bell reflex card game: round engine, AI flip timer and terminal front end.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod driver;
pub mod error;
pub mod game;
pub mod level;
pub mod score;
pub mod session;
pub mod state;
pub mod store;
pub mod targets;
pub mod tips;
pub mod visualize;

pub use crate::action::Action;
pub use crate::bot::Bot;
pub use crate::bots::{RandomBot, ReflexBot, create_bot_from_spec, label_for_spec};
pub use crate::card::{Card, CardGenerator, CardId, FruitType};
pub use crate::driver::{AiDriver, AiTick};
pub use crate::error::{GameError, StoreError, TipError};
pub use crate::game::{Flip, Game, GameBuilder, GameConfig, Outcome};
pub use crate::level::{LEVEL_COUNT, LEVEL_TABLE, Level, LevelConfig, level_config};
pub use crate::score::{BellVerdict, FruitTally};
pub use crate::session::{Screen, SessionConfig, SessionHandle};
pub use crate::state::{GameState, GameStatus, Side};
pub use crate::store::{HIGH_SCORE_KEY, HighScoreStore, JsonFileStore, MemoryStore};
pub use crate::targets::{Targets, targets_for_level};
pub use crate::tips::{GenerativeTips, StaticTips, TipConfig, TipProvider, tip_or_fallback};
pub use crate::visualize::{describe_outcome, render_screen, render_state};
