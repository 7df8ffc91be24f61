//! Batch command implementation.

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, load_strategy};
use forager::sim::{SimConfig, run_simulation};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::warn;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the progress bar
/// template is rejected.
pub(crate) fn execute(
    sim: &SimConfig,
    games: u64,
    threads: Option<usize>,
    config: Option<&Path>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let strategy = load_strategy(config)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let num_players = sim.players;

    // Each thread folds into its own stats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(num_players),
            |mut local, i| {
                let game = SimConfig {
                    seed: sim.seed.wrapping_add(i),
                    ..*sim
                };
                match run_simulation(&game, &strategy) {
                    Ok(result) => local.add_result(&result),
                    Err(e) => warn!(seed = game.seed, %e, "game failed"),
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || BatchStats::new(num_players),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_per_sec(duration.as_secs_f64())
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Duration: {:.2}s ({:.0} games/sec)", duration.as_secs_f64(), games_per_sec);
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
