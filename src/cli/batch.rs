//! Batch command implementation.

use super::output::{BatchEntry, BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::run::scenario_label;
use super::{BatchFormat, CliError};
use conquest::{Scenario, run_scenario};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Execute the batch command.
///
/// Scenarios that fail to load are reported per row and do not abort the
/// batch.
///
/// # Errors
///
/// Returns an error if the thread pool or progress bar cannot be set up,
/// or the JSON output cannot be serialized.
pub(crate) fn execute(
    scenarios: Vec<PathBuf>,
    threads: Option<usize>,
    ticks: Option<u64>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(scenarios.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sessions ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates its own stats; merged once at the end.
    let mut stats = scenarios
        .par_iter()
        .enumerate()
        .fold(BatchStats::default, |mut local, (index, path)| {
            let label = scenario_label(path);
            let outcome = Scenario::load(path)
                .and_then(|scenario| run_scenario(&scenario, ticks))
                .map_err(|e| {
                    warn!(scenario = %label, error = %e, "scenario failed");
                    e.to_string()
                });
            local.add(BatchEntry {
                index,
                label,
                outcome,
            });
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(BatchStats::default, |mut a, b| {
            a.merge(b);
            a
        });
    stats.sort();

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
