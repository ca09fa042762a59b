//! Configuration file support for namescope
//!
//! Loads `.namescope.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use namescope::{Bindings, Extras, ScopeTracker};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".namescope.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Leave names starting with `_` out of reports
    pub ignore_underscore: bool,
    /// Names treated as already bound when the scope is entered
    pub extras: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ignore_underscore: true,
            extras: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.namescope.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file settings
    pub fn merge_cli(&mut self, extras: &[String], include_underscore: bool) {
        self.tracker.extras.extend(extras.iter().cloned());
        if include_underscore {
            self.tracker.ignore_underscore = false;
        }
    }

    /// Build an unentered tracker with these settings
    pub fn tracker<M: Bindings + 'static>(&self) -> ScopeTracker<M> {
        let extras: Extras = self.tracker.extras.iter().cloned().collect();
        ScopeTracker::new()
            .with_extras(extras)
            .ignore_underscore(self.tracker.ignore_underscore)
    }
}
