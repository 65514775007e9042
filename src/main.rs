use std::{path::PathBuf, process::ExitCode};

use blind_chess::{
    color::Color, config::Settings, fuzz::fuzz, oracle::ChessOracle, repl::repl,
    session::BlindSession, store::MemoryStore,
};
use clap::{Parser, Subcommand};

/// Terminal client for the blind opening phase: make your first few moves
/// without seeing your opponent's.
#[derive(Parser, Debug)]
#[command(name = "blind-chess", version, about)]
struct Cli {
    /// TOML file with `[limits]` and `[timing]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color to play; can also be picked in the session with `play <color>`
    #[arg(long)]
    color: Option<Color>,

    /// Overrides `limits.max_moves`
    #[arg(long)]
    max_moves: Option<u8>,

    /// Overrides `limits.max_per_piece`
    #[arg(long)]
    max_per_piece: Option<u8>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the blind phase interactively (default)
    Play,
    /// Play random blind phases and check the rule invariants
    Fuzz {
        #[arg(long, default_value_t = 1000)]
        games: u32,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path).map_err(|err| format!("{}: {err}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(max_moves) = cli.max_moves {
        settings.limits.max_moves = max_moves;
    }
    if let Some(max_per_piece) = cli.max_per_piece {
        settings.limits.max_per_piece = max_per_piece;
    }
    settings.limits = settings.limits.validate().map_err(|err| err.to_string())?;
    Ok(settings)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, &cli.log_level),
    )
    .init();

    let settings = match settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("{settings:?}");
    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            let mut session = BlindSession::new(
                ChessOracle,
                MemoryStore::new(),
                settings.limits,
                settings.timing,
            );
            if let Err(err) = cli.color.map_or(Ok(()), |color| session.assign_color(color)) {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
            if let Err(err) = repl(session) {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        }
        Command::Fuzz { games, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            log::info!("fuzzing {games} games with seed {seed}");
            fuzz(settings, games, seed);
            println!("{games} games passed (seed {seed})");
        }
    }
    ExitCode::SUCCESS
}
