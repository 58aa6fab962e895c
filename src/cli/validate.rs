//! Scenario validation command implementation.

use super::CliError;
use conquest::Scenario;
use conquest::scenario::ModeConfig;
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be read or is invalid.
pub(crate) fn execute(scenario_path: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", scenario_path.display());
    println!();

    let scenario = Scenario::load(&scenario_path)?;

    let mode = match &scenario.mode {
        ModeConfig::FreeForAll => "free-for-all".to_string(),
        ModeConfig::Teams { teams } => {
            let mut distinct = teams.clone();
            distinct.sort_unstable();
            distinct.dedup();
            format!("teams ({} teams)", distinct.len())
        }
    };

    println!("Summary:");
    println!(
        "  Map:          {}x{}",
        scenario.map.width, scenario.map.height
    );
    println!(
        "  Players:      {} (of {} slots)",
        scenario.players.len(),
        scenario.effective_max_players()
    );
    println!("  Mode:         {mode}");
    println!(
        "  Shared border required: {}",
        if scenario.require_shared_border { "yes" } else { "no" }
    );
    println!("  Max ticks:    {}", scenario.max_ticks);
    println!("  Actions:      {}", scenario.actions.len());
    println!(
        "  Income:       every {} ticks",
        scenario.economy.income_interval
    );

    println!();
    println!("Validation successful!");

    Ok(())
}
