use std::fmt::Write;

use crate::action::Action;
use crate::card::Card;
use crate::game::{Flip, Outcome};
use crate::session::Screen;
use crate::state::{GameState, GameStatus, Side};

/// Customize state rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_card_ids: bool,
    pub show_controls: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_card_ids: false,
            show_controls: true,
        }
    }
}

pub fn render_state(state: &GameState) -> String {
    render_state_with_options(state, VisualOptions::default())
}

pub fn render_state_with_options(state: &GameState, options: VisualOptions) -> String {
    let mut out = String::new();
    let config = state.level_config();
    let _ = writeln!(
        out,
        "Level {}  |  Score {}  |  High score {}",
        state.level, state.score, state.high_score
    );
    let _ = writeln!(
        out,
        "Targets: {}  |  Computer flips every {}ms  |  Reward {}",
        state.targets().join(" or "),
        config.ai_flip_interval_ms,
        config.reward
    );
    let _ = writeln!(out, "Status: {}", status_label(state.status));
    for side in [Side::Ai, Side::Player] {
        let turn_tag = if state.is_playing() && state.turn() == side {
            "  <- next flip"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<8} deck {:>2}  card {}{}",
            side.label(),
            state.deck(side),
            format_card(state.active_card(side), options),
            turn_tag
        );
    }
    let _ = writeln!(out, "{}", state.message);
    if options.show_controls {
        let controls = available_actions(state.status)
            .iter()
            .map(|action| format!("[{}] {}", action.key(), action))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "Controls: {controls}  [q] Quit");
    }
    out
}

/// State plus the tip line and bell indicator.
pub fn render_screen(screen: &Screen) -> String {
    let mut out = render_state(&screen.state);
    if screen.bell_ringing {
        let _ = writeln!(out, "*** DING! ***");
    }
    let _ = writeln!(out, "Tip: \"{}\"", screen.tip);
    out
}

/// Actions the engine accepts in `status`.
pub fn available_actions(status: GameStatus) -> &'static [Action] {
    match status {
        GameStatus::Start => &[Action::Start, Action::Restart],
        GameStatus::Playing => &[Action::Flip, Action::RingBell, Action::Restart],
        GameStatus::LevelClear => &[Action::NextLevel, Action::Restart],
        GameStatus::GameOver | GameStatus::Victory => &[Action::Restart],
    }
}

pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Started => String::from("Round started"),
        Outcome::Flipped(Flip::Revealed { side, card }) => {
            format!("{} flipped {}", side.label(), card)
        }
        Outcome::Flipped(Flip::DeckExhausted { side }) => {
            format!("{} has no cards left", side.label())
        }
        Outcome::Rang(verdict) if verdict.is_success() => {
            format!("Bell hit for {} points ({})", verdict.reward, verdict.tally.summary())
        }
        Outcome::Rang(verdict) => format!(
            "Bell missed ({}; targets {})",
            verdict.tally.summary(),
            verdict.targets
        ),
        Outcome::Advanced(level) => format!("Advanced to level {level}"),
        Outcome::Restarted => String::from("Restarted"),
    }
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Start => "Waiting to start",
        GameStatus::Playing => "Playing",
        GameStatus::LevelClear => "Level clear!",
        GameStatus::GameOver => "Game over",
        GameStatus::Victory => "Champion!",
    }
}

fn format_card(card: Option<Card>, options: VisualOptions) -> String {
    match card {
        Some(card) if options.show_card_ids => format!("{card} ({})", card.id),
        Some(card) => card.to_string(),
        None => String::from("--"),
    }
}
