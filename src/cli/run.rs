//! Run command implementation.

use super::output::format_text;
use super::{CliError, OutputFormat};
use conquest::{GameSession, Scenario};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or the result cannot
/// be serialized.
pub(crate) fn execute(
    scenario_path: PathBuf,
    ticks: Option<u64>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let scenario = Scenario::load(&scenario_path)?;
    let label = scenario_label(&scenario_path);

    let mut session = GameSession::from_scenario(&scenario)?;
    if let Some(limit) = ticks {
        session.set_max_ticks(limit);
    }

    info!(
        scenario = %label,
        players = scenario.players.len(),
        max_ticks = session.max_ticks(),
        "running session"
    );

    let start = Instant::now();
    let result = session.run();
    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &label));
            println!();
            println!("Duration: {:.3}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Short display name for a scenario file.
pub(crate) fn scenario_label(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}
