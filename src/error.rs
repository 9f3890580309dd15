use thiserror::Error;

use crate::action::Action;
use crate::state::GameStatus;

/// Errors that can occur when manipulating the game state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The action is not allowed in the current status. The state is left untouched.
    #[error("{action:?} is not allowed while the game is {status:?}")]
    InvalidTransition { action: Action, status: GameStatus },
    #[error("level {0} is out of range (1-50)")]
    InvalidLevel(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("game session has shut down")]
    SessionClosed,
}

/// Failures of the high-score store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the level tip service. Always recovered with a fallback tip.
#[derive(Debug, Error)]
pub enum TipError {
    #[error("tip service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tip service is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("tip service returned no text")]
    EmptyResponse,
    #[error("tip service did not answer within {0:?}")]
    Timeout(std::time::Duration),
}
