//! Simulate command implementation.

use super::output::{JsonSimResult, format_sim_text};
use super::{CliError, OutputFormat, load_strategy};
use forager::sim::{SimConfig, run_simulation};
use std::path::Path;
use std::time::Instant;

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the game cannot be set up.
pub(crate) fn execute(
    sim: &SimConfig,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let strategy = load_strategy(config)?;

    let start = Instant::now();
    let result = run_simulation(sim, &strategy)?;
    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            print!("{}", format_sim_text(&result));
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSimResult::from_sim_result(&result))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
