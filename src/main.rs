//! Forager CLI - plan single ticks and run simulated games.

// Allow unwrap in tests, print in the CLI binary
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use forager::sim::SimConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Forager - fleet harvesting strategy on a toroidal grid
#[derive(Parser, Debug)]
#[command(name = "forager")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan one tick for a snapshot file ("-" reads stdin)
    Decide {
        /// Snapshot JSON file
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Strategy config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for random tie breaks (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text (wire commands) or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Play one simulated game with a brain per player
    Simulate {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum turns (default: 400)
        #[arg(short, long, default_value = "400")]
        turns: u32,

        /// Map width (default: 32)
        #[arg(long, default_value = "32")]
        width: u16,

        /// Map height (default: 32)
        #[arg(long, default_value = "32")]
        height: u16,

        /// Number of players (1-4)
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Starting budget per player (default: 5000)
        #[arg(short, long, default_value = "5000")]
        budget: u32,

        /// Strategy config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many simulated games in parallel and aggregate statistics
    Batch {
        /// Number of games to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 400)
        #[arg(short, long, default_value = "400")]
        turns: u32,

        /// Map width (default: 32)
        #[arg(long, default_value = "32")]
        width: u16,

        /// Map height (default: 32)
        #[arg(long, default_value = "32")]
        height: u16,

        /// Number of players (1-4)
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Strategy config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Decide {
            snapshot,
            config,
            seed,
            format,
        } => cli::decide::execute(&snapshot, config.as_deref(), seed, format),

        Commands::Simulate {
            seed,
            turns,
            width,
            height,
            players,
            budget,
            config,
            format,
        } => {
            let sim = SimConfig {
                width,
                height,
                players,
                max_turns: turns,
                starting_budget: budget,
                seed: cli::resolve_seed(seed),
            };
            cli::simulate::execute(&sim, config.as_deref(), format)
        }

        Commands::Batch {
            games,
            seed,
            threads,
            turns,
            width,
            height,
            players,
            config,
            format,
            progress,
        } => {
            let sim = SimConfig {
                width,
                height,
                players,
                max_turns: turns,
                seed: cli::resolve_seed(seed),
                ..SimConfig::default()
            };
            cli::batch::execute(&sim, games, threads, config.as_deref(), format, progress)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
