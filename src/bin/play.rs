use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use fruitbell::{
    Action, Game, GenerativeTips, JsonFileStore, SessionConfig, SessionHandle, StaticTips,
    TipConfig, TipProvider, render_screen,
};

const DEFAULT_SEED: u64 = 0xBE11_F00D_5EED_0042;

#[derive(Parser, Debug)]
#[command(name = "play", about = "Ring the bell when one fruit hits the target.")]
struct Args {
    /// Seed for card generation
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// File the high score is kept in
    #[arg(long = "store", default_value = "fruitbell-highscore.json")]
    store: PathBuf,

    /// Use built-in tips instead of the text-generation service
    #[arg(long = "offline", action = ArgAction::SetTrue)]
    offline: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (_, 0) => tracing::Level::WARN,
        (_, 1) => tracing::Level::INFO,
        (_, 2) => tracing::Level::DEBUG,
        (_, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(args).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let store = JsonFileStore::new(&args.store);
    info!(path = %store.path().display(), "high score file");
    let game = Game::builder()
        .with_seed(args.seed)
        .with_store(store)
        .build()?;

    let tip_config = TipConfig::from_env();
    if args.offline || tip_config.api_key.is_none() {
        if !args.offline {
            info!("{} not set; using built-in tips", TipConfig::API_KEY_ENV);
        }
        play(game, StaticTips::default()).await
    } else {
        play(game, GenerativeTips::new(tip_config)?).await
    }
}

async fn play<P: TipProvider>(game: Game, tips: P) -> Result<(), Box<dyn Error>> {
    let session = SessionHandle::spawn(game, tips, SessionConfig::default());

    let mut screens = session.subscribe();
    let printer = tokio::spawn(async move {
        println!("{}", render_screen(&screens.borrow_and_update()));
        while screens.changed().await.is_ok() {
            let screen = screens.borrow_and_update().clone();
            println!("{}", render_screen(&screen));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
            println!("Bye!");
            break;
        }
        let Some(key) = trimmed.chars().next() else {
            continue;
        };
        match Action::from_key(key) {
            Some(action) => session.send(action)?,
            None => println!("Unknown key '{key}'. Use s, f, b, n, r or q."),
        }
    }

    session.shutdown().await;
    printer.abort();
    Ok(())
}
