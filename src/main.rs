//! Conquest CLI - Command-line interface for running territory scenarios.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Conquest - A deterministic attack lifecycle engine
#[derive(Parser, Debug)]
#[command(name = "conquest")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single scenario to completion
    Run {
        /// Scenario JSON file
        #[arg(required = true)]
        scenario: PathBuf,

        /// Override the scenario's tick limit
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many scenarios in parallel and aggregate statistics
    Batch {
        /// Scenario JSON files
        #[arg(required = true, num_args = 1..)]
        scenarios: Vec<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Override every scenario's tick limit
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a scenario file
    Validate {
        /// Scenario JSON file to validate
        #[arg(required = true)]
        scenario: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::logging::init(args.verbose);

    let result = match args.command {
        Commands::Run {
            scenario,
            ticks,
            format,
        } => cli::run::execute(scenario, ticks, format),

        Commands::Batch {
            scenarios,
            threads,
            ticks,
            format,
            progress,
        } => cli::batch::execute(scenarios, threads, ticks, format, progress),

        Commands::Validate { scenario } => cli::validate::execute(scenario),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
