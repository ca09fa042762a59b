//! Output formatting for namescope
//!
//! Supports text (colored terminal) and JSON output formats.

use colored::*;
use serde::Serialize;
use serde_json::Value;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// A name bound since the baseline, with its current value
#[derive(Debug, Clone, Serialize)]
pub struct NewBinding {
    pub name: String,
    pub value: Value,
}

/// New bindings found at one snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub snapshot: String,
    pub new_bindings: Vec<NewBinding>,
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub snapshots: usize,
    pub steps_with_new_names: usize,
    pub new_names: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub steps: Vec<StepReport>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    steps: Vec<StepReport>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            steps: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Record the snapshot the scope was entered with
    pub fn report_baseline(&mut self, label: &str, names: usize) {
        self.summary.snapshots += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: {} ({} names)", "Baseline".bold(), label, names);
        }
    }

    pub fn report_step(&mut self, step: StepReport) {
        self.summary.snapshots += 1;
        if !step.new_bindings.is_empty() {
            self.summary.steps_with_new_names += 1;
            self.summary.new_names += step.new_bindings.len();
        }

        if self.format == OutputFormat::Text {
            if step.new_bindings.is_empty() {
                if self.verbose {
                    println!("{}: no new names", step.snapshot);
                }
            } else {
                println!("{}:", step.snapshot.bold());
                for binding in &step.new_bindings {
                    println!("  {} {} = {}", "+".green(), binding.name.green(), binding.value);
                }
            }
        }

        self.steps.push(step);
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Print the final output
    pub fn finish(self) {
        match self.format {
            OutputFormat::Text => self.print_text_summary(),
            OutputFormat::Json => self.print_json(),
        }
    }

    fn print_text_summary(&self) {
        println!();
        if self.summary.new_names == 0 {
            println!("{}", "No new names".green());
        } else {
            println!(
                "{} new name(s) across {} of {} snapshot(s)",
                self.summary.new_names.to_string().yellow(),
                self.summary.steps_with_new_names,
                self.summary.snapshots.saturating_sub(1)
            );
        }
    }

    fn print_json(&self) {
        let output = JsonOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: self.summary.clone(),
            steps: self.steps.clone(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}: failed to serialize output: {}", "Error".red(), e),
        }
    }
}
