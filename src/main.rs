//! Dots-and-Boxes engine.
//!
//! ## Usage
//!
//! - `dotsboxes-rust` - Show a demo
//! - `dotsboxes-rust play` - Start the text protocol on stdin/stdout
//! - `dotsboxes-rust demo` - Watch the computer play itself

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dotsboxes_rust::constants::{DEFAULT_SEED, DOTS};
use dotsboxes_rust::game::Match;
use dotsboxes_rust::geometry::{DotMap, Grid};
use dotsboxes_rust::protocol::Engine;
use dotsboxes_rust::strategy::{Bot, Tier, TurnOutcome};

/// Dots-and-Boxes: board engine and computer opponent
#[derive(Parser)]
#[command(name = "dotsboxes-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server for use with a UI or a session relay
    Play(GameArgs),
    /// Let the computer play both sides
    Demo(GameArgs),
}

#[derive(Args, Default)]
struct GameArgs {
    /// JSON board description (rows of 0/1 dot flags)
    #[arg(long)]
    board: Option<PathBuf>,

    /// Strength of the computer player
    #[arg(long, value_enum, default_value_t = Tier::default())]
    level: Tier,

    /// Seed for the computer's random choices
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => {
            let grid = load_grid(args.board.as_deref())?;
            let mut engine = Engine::new(grid, Bot::with_seed(args.level, args.seed));
            let stdin = std::io::stdin();
            engine
                .run(stdin.lock(), std::io::stdout())
                .context("protocol I/O failed")
        }
        Some(Commands::Demo(args)) => run_demo(&args),
        None => run_demo(&GameArgs {
            level: Tier::Expert,
            seed: DEFAULT_SEED,
            ..GameArgs::default()
        }),
    }
}

fn load_grid(path: Option<&Path>) -> Result<Arc<Grid>> {
    let map = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading board description {}", path.display()))?;
            DotMap::from_json(&text)
                .with_context(|| format!("parsing board description {}", path.display()))?
        }
        None => DotMap::rectangular(DOTS, DOTS),
    };
    let grid = Grid::new(&map).context("building board geometry")?;
    info!(edges = grid.num_edges(), boxes = grid.num_boxes(), "board loaded");
    Ok(Arc::new(grid))
}

fn run_demo(args: &GameArgs) -> Result<()> {
    println!("Dots-and-Boxes: computer vs computer ({})\n", args.level);

    let grid = load_grid(args.board.as_deref())?;
    let mut game = Match::new(grid);
    let mut bots = [
        Bot::with_seed(args.level, args.seed),
        Bot::with_seed(args.level, args.seed.wrapping_add(1)),
    ];

    loop {
        let player = game.turn();
        let report = bots[player.index()].take_turn(&mut game)?;
        if !report.events.is_empty() {
            println!(
                "{player} drew {} edge(s), captured {}",
                report.events.len(),
                report.captured()
            );
        }
        if report.outcome == TurnOutcome::NoMovesAvailable {
            break;
        }
    }

    println!("\n{}", game.board());
    let end = game.standings();
    match end.winner {
        Some(p) => println!("{p} wins {}-{}", end.first, end.second),
        None => println!("tie {}-{}", end.first, end.second),
    }
    Ok(())
}
