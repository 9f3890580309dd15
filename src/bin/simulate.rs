use std::collections::BTreeMap;
use std::error::Error;
use std::process;

use clap::{ArgAction, Parser};
use tracing::debug;

use fruitbell::visualize::{VisualOptions, render_state_with_options};
use fruitbell::{
    Action, Bot, Flip, Game, GameError, GameStatus, Outcome, create_bot_from_spec,
    describe_outcome, label_for_spec,
};

/// Default base seed for deterministic runs.
const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    about = "Play bots against the computer on a virtual clock and summarize the runs."
)]
struct Args {
    /// Number of games to simulate
    #[arg(short = 'g', long = "games", default_value_t = 100)]
    games: usize,

    /// Base RNG seed (cards and bot RNGs are derived deterministically)
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Bot spec: reflex or random[:ring_probability]
    #[arg(short = 'b', long = "bot", default_value = "reflex")]
    bot: String,

    /// Milliseconds between bot decisions
    #[arg(short = 'r', long = "reaction-ms", default_value_t = 400)]
    reaction_ms: u64,

    /// Safety cap on decisions per game; longer games are aborted
    #[arg(long = "max-steps", default_value_t = 100_000)]
    max_steps: usize,

    /// Print every state and outcome of the first game
    #[arg(long = "visualize", action = ArgAction::SetTrue)]
    visualize: bool,

    /// Show card ids next to each card when visualizing
    #[arg(long = "show-ids", action = ArgAction::SetTrue)]
    show_ids: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Default)]
struct Summary {
    victories: usize,
    exhausted: usize,
    missed: usize,
    aborted: usize,
    total_score: u64,
    best_score: u64,
    levels_reached: BTreeMap<u32, usize>,
}

enum Ending {
    Victory,
    DeckExhausted,
    MissedBell,
    Aborted,
}

fn main() {
    let args = Args::parse();
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.games == 0 {
        return Err("games must be positive".into());
    }
    if args.reaction_ms == 0 {
        return Err("reaction-ms must be positive".into());
    }

    let mut summary = Summary::default();
    for index in 0..args.games {
        let seed = args.seed.wrapping_add(index as u64);
        let mut game = Game::builder().with_seed(seed).build()?;
        let mut bot = create_bot_from_spec(&args.bot, seed)?;
        let visualize = (args.visualize && index == 0).then_some(VisualOptions {
            show_card_ids: args.show_ids,
            ..VisualOptions::default()
        });
        let ending = play_game(&mut game, bot.as_mut(), &args, visualize)?;

        let state = game.state();
        match ending {
            Ending::Victory => summary.victories += 1,
            Ending::DeckExhausted => summary.exhausted += 1,
            Ending::MissedBell => summary.missed += 1,
            Ending::Aborted => summary.aborted += 1,
        }
        summary.total_score += state.score;
        summary.best_score = summary.best_score.max(state.score);
        *summary.levels_reached.entry(state.level.get()).or_default() += 1;
        debug!(game = index, level = %state.level, score = state.score, "game finished");
    }

    print_summary(&args, &summary);
    Ok(())
}

/// Runs one game. The computer flips on its level interval and the bot gets a turn
/// every `reaction_ms`; both timers restart whenever the status or level changes.
fn play_game(
    game: &mut Game,
    bot: &mut dyn Bot,
    args: &Args,
    visualize: Option<VisualOptions>,
) -> Result<Ending, GameError> {
    let mut now = 0u64;
    let mut next_ai = 0u64;
    let mut next_bot = 0u64;
    let mut last_miss = false;

    for _ in 0..args.max_steps {
        let status = game.status();
        if status.is_terminal() {
            return Ok(match status {
                GameStatus::Victory => Ending::Victory,
                _ if last_miss => Ending::MissedBell,
                _ => Ending::DeckExhausted,
            });
        }
        if status != GameStatus::Playing {
            let Some(action) = bot.select_action(game.state()) else {
                return Ok(Ending::Aborted);
            };
            step(game, action, visualize, &mut last_miss)?;
            next_ai = now + game.state().level_config().ai_flip_interval_ms;
            next_bot = now + args.reaction_ms;
            continue;
        }

        if next_bot <= next_ai {
            now = next_bot;
            next_bot += args.reaction_ms;
            if let Some(action) = bot.select_action(game.state()) {
                step(game, action, visualize, &mut last_miss)?;
                if !game.state().is_playing() {
                    continue;
                }
            }
        } else {
            now = next_ai;
            next_ai += game.state().level_config().ai_flip_interval_ms;
            step(game, Action::Flip, visualize, &mut last_miss)?;
        }
    }
    Ok(Ending::Aborted)
}

fn step(
    game: &mut Game,
    action: Action,
    visualize: Option<VisualOptions>,
    last_miss: &mut bool,
) -> Result<(), GameError> {
    let outcome = match game.apply(action) {
        Ok(outcome) => outcome,
        Err(GameError::InvalidTransition { .. }) => return Ok(()),
        Err(err) => return Err(err),
    };
    *last_miss = match &outcome {
        Outcome::Rang(verdict) => !verdict.is_success(),
        Outcome::Flipped(Flip::DeckExhausted { .. }) => false,
        _ => *last_miss,
    };
    if let Some(options) = visualize {
        println!("{}", describe_outcome(&outcome));
        println!("{}", render_state_with_options(game.state(), options));
    }
    Ok(())
}

fn print_summary(args: &Args, summary: &Summary) {
    let games = args.games as f64;
    println!(
        "Simulated {} games with bot '{}' (reaction {}ms).",
        args.games,
        label_for_spec(&args.bot),
        args.reaction_ms
    );
    println!(
        "  victories {}  |  decks exhausted {}  |  missed bells {}  |  aborted {}",
        summary.victories, summary.exhausted, summary.missed, summary.aborted
    );
    println!(
        "  mean score {:.1}  |  best score {}",
        summary.total_score as f64 / games,
        summary.best_score
    );
    println!("  final level distribution:");
    for (level, count) in &summary.levels_reached {
        println!(
            "    level {:>2}: {:>5} ({:.1}%)",
            level,
            count,
            *count as f64 * 100.0 / games
        );
    }
}
