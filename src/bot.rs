use crate::action::Action;
use crate::state::GameState;

/// Interface for automated players. Called whenever the bot gets a chance to act.
///
/// Returning `None` lets the moment pass without doing anything.
pub trait Bot {
    fn select_action(&mut self, state: &GameState) -> Option<Action>;
}
