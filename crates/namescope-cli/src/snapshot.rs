//! Replaying binding snapshots through a scope tracker
//!
//! A snapshot is a JSON object of name -> value. The first snapshot is the
//! state at enter; every later one replaces the observed bindings and is
//! diffed against the tracker's baseline.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use namescope::shared;
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::output::{NewBinding, StepReport};

/// Bindings as read from a snapshot file, in file order
pub type Snapshot = IndexMap<String, Value>;

/// Read a snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_snapshot(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_snapshot(contents: &str) -> Result<Snapshot> {
    match serde_json::from_str::<Snapshot>(contents) {
        Ok(snapshot) => Ok(snapshot),
        Err(err) => match serde_json::from_str::<Value>(contents) {
            Ok(other) if !other.is_object() => {
                bail!("expected a JSON object of bindings, got {}", kind(&other))
            }
            _ => Err(err.into()),
        },
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Diff each snapshot after the first against the tracked baseline
///
/// With `refresh` the baseline is refreshed after every step, so each step
/// only reports its own additions.
pub fn replay(snapshots: &[(String, Snapshot)], config: &Config, refresh: bool) -> Result<Vec<StepReport>> {
    let Some(((_, initial), steps)) = snapshots.split_first() else {
        bail!("at least one snapshot is required");
    };

    let locals = shared(initial.clone());
    let mut tracker = config.tracker().with_bindings(locals.clone());

    let reports = tracker.scope(|scope| -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(steps.len());
        for (label, snapshot) in steps {
            *locals.borrow_mut() = snapshot.clone();

            let new_bindings = scope
                .items()?
                .map(|(name, value)| NewBinding { name, value })
                .collect();
            reports.push(StepReport {
                snapshot: label.clone(),
                new_bindings,
            });

            if refresh {
                scope.refresh()?;
            }
        }
        Ok(reports)
    })??;

    Ok(reports)
}
