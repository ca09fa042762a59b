//! namescope CLI - report names bound between binding snapshots
//!
//! Commands:
//! - diff: enter a scope on the first snapshot and report the names each
//!   later snapshot adds
//! - selftest: run the built-in tracker scenario

mod config;
mod output;
mod selftest;
mod snapshot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter};

#[derive(Parser)]
#[command(name = "namescope")]
#[command(version)]
#[command(about = "Report which names were bound inside a scope")]
struct Cli {
    /// Write tracker events to this log file
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Diff JSON binding snapshots against the first one
    Diff(DiffArgs),
    /// Run the built-in tracker scenario
    Selftest,
}

#[derive(clap::Args)]
struct DiffArgs {
    /// Snapshot files (JSON objects of name -> value); the first is the baseline
    #[arg(required = true, num_args = 2.., value_name = "SNAPSHOT")]
    snapshots: Vec<PathBuf>,

    /// Refresh the baseline after each snapshot
    #[arg(long)]
    refresh: bool,

    /// Exit with code 2 when new names are found
    #[arg(long)]
    check: bool,

    /// Name treated as already bound (can be specified multiple times)
    #[arg(long = "extra", short = 'e', value_name = "NAME")]
    extras: Vec<String>,

    /// Report names starting with an underscore
    #[arg(long)]
    include_underscore: bool,

    /// Output format: text, json
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .namescope.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        namescope::logging::init_logger(Some(log_path))
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        namescope::logging::log(&format!("namescope {}", env!("CARGO_PKG_VERSION")));
    }

    match cli.command {
        Command::Diff(args) => run_diff(args),
        Command::Selftest => Ok(run_selftest()),
    }
}

fn run_diff(args: DiffArgs) -> Result<ExitCode> {
    // Load config file
    let (mut config, config_path) = if args.no_config {
        (Config::default(), None)
    } else if let Some(path) = &args.config {
        (Config::load_path(path)?, Some(path.clone()))
    } else {
        match Config::load()? {
            Some((cfg, path)) => (cfg, Some(path)),
            None => (Config::default(), None),
        }
    };
    config.merge_cli(&args.extras, args.include_underscore);

    let output_format = resolve_format(args.json, args.format.as_deref(), &config)?;

    if args.verbose && output_format == OutputFormat::Text {
        if let Some(path) = &config_path {
            println!("{}: {}", "Using config".bold(), path.display());
        }
        println!(
            "{}: {}",
            "Mode".bold(),
            if args.refresh { "refresh each step" } else { "cumulative" }
        );
    }

    let snapshots = args
        .snapshots
        .iter()
        .map(|path| -> Result<(String, snapshot::Snapshot)> {
            Ok((path.display().to_string(), snapshot::load_snapshot(path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let steps = snapshot::replay(&snapshots, &config, args.refresh)?;

    let mut reporter = Reporter::new(output_format, args.verbose);
    if let Some((label, initial)) = snapshots.first() {
        reporter.report_baseline(label, initial.len());
    }
    for step in steps {
        reporter.report_step(step);
    }

    let found_new = reporter.summary().new_names > 0;
    reporter.finish();

    Ok(ExitCode::from(diff_exit_code(args.check, found_new)))
}

/// Output format: `--json`, then `--format`, then config, then text
fn resolve_format(json: bool, format: Option<&str>, config: &Config) -> Result<OutputFormat> {
    if json {
        return Ok(OutputFormat::Json);
    }
    let format = format.or(config.output.format.as_deref()).unwrap_or("text");
    OutputFormat::from_str(format).ok_or_else(|| {
        anyhow::anyhow!("Invalid output format '{}'. Valid options: text, json", format)
    })
}

/// 2 when `--check` found new names, 0 otherwise
fn diff_exit_code(check: bool, found_new: bool) -> u8 {
    if check && found_new {
        2
    } else {
        0
    }
}

fn run_selftest() -> ExitCode {
    let mut failed = 0;
    for check in selftest::run() {
        match check.outcome {
            Ok(()) => println!("  {} {}", "ok".green(), check.name),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {:#}", "FAILED".red(), check.name, e);
            }
        }
    }

    if failed == 0 {
        println!("pass");
        ExitCode::SUCCESS
    } else {
        println!("{} scenario(s) failed", failed);
        ExitCode::from(1)
    }
}
