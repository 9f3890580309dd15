use std::fmt;

use serde::{Deserialize, Serialize};

/// The five user-facing controls. Each maps to one engine operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Action {
    Start,
    /// Reveal the next card for whichever side's turn it is.
    Flip,
    /// Claim that one fruit kind on the table hits a target.
    RingBell,
    NextLevel,
    Restart,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Start,
        Action::Flip,
        Action::RingBell,
        Action::NextLevel,
        Action::Restart,
    ];

    /// Single-key shortcut used by the terminal front end.
    pub fn key(self) -> char {
        match self {
            Action::Start => 's',
            Action::Flip => 'f',
            Action::RingBell => 'b',
            Action::NextLevel => 'n',
            Action::Restart => 'r',
        }
    }

    pub fn from_key(key: char) -> Option<Action> {
        Self::ALL
            .into_iter()
            .find(|action| action.key() == key.to_ascii_lowercase())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Start => "Start",
            Action::Flip => "Flip card",
            Action::RingBell => "Ring the bell",
            Action::NextLevel => "Next level",
            Action::Restart => "Restart",
        };
        f.write_str(label)
    }
}
