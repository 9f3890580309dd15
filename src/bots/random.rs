use rand::Rng;

use crate::action::Action;
use crate::bot::Bot;
use crate::state::{GameState, GameStatus};

/// Baseline bot that rings the bell at random while playing.
pub struct RandomBot<R: Rng> {
    rng: R,
    /// Chance of ringing instead of flipping on each opportunity.
    ring_probability: f64,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self::with_ring_probability(rng, 0.2)
    }

    pub fn with_ring_probability(rng: R, ring_probability: f64) -> Self {
        Self {
            rng,
            ring_probability: ring_probability.clamp(0.0, 1.0),
        }
    }
}

impl<R: Rng> Bot for RandomBot<R> {
    fn select_action(&mut self, state: &GameState) -> Option<Action> {
        match state.status {
            GameStatus::Start => Some(Action::Start),
            GameStatus::LevelClear => Some(Action::NextLevel),
            GameStatus::GameOver | GameStatus::Victory => None,
            GameStatus::Playing if self.rng.gen_bool(self.ring_probability) => {
                Some(Action::RingBell)
            }
            GameStatus::Playing => Some(Action::Flip),
        }
    }
}
