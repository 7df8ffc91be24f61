//! Decide command implementation.

use super::{CliError, OutputFormat, load_strategy};
use forager::{Brain, Snapshot};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Execute the decide command.
///
/// # Errors
///
/// Returns an error if the snapshot or config cannot be read, or the
/// snapshot is inconsistent.
pub(crate) fn execute(
    snapshot: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut strategy = load_strategy(config)?;
    if let Some(seed) = seed {
        strategy.seed = seed;
    }

    let text = if snapshot == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(snapshot).map_err(|e| {
            CliError::new(format!("Failed to read {}: {e}", snapshot.display()))
        })?
    };
    let snapshot: Snapshot = serde_json::from_str(&text)
        .map_err(|e| CliError::new(format!("Invalid snapshot JSON: {e}")))?;

    let plan = Brain::new(strategy).take_turn(&snapshot)?;

    match format {
        OutputFormat::Text => println!("{}", plan.to_wire()),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
