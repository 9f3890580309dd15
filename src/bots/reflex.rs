use crate::action::Action;
use crate::bot::Bot;
use crate::score::FruitTally;
use crate::state::{GameState, GameStatus, Side};

/// Rings the moment the table hits a target and otherwise keeps its own deck moving.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReflexBot;

impl Bot for ReflexBot {
    fn select_action(&mut self, state: &GameState) -> Option<Action> {
        match state.status {
            GameStatus::Start => Some(Action::Start),
            GameStatus::LevelClear => Some(Action::NextLevel),
            GameStatus::GameOver | GameStatus::Victory => None,
            GameStatus::Playing => {
                let tally = FruitTally::from_board(state.player_card, state.ai_card);
                if tally.hits(&state.targets()) {
                    Some(Action::RingBell)
                } else if state.turn() == Side::Player {
                    Some(Action::Flip)
                } else {
                    None
                }
            }
        }
    }
}
