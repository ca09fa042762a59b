//! Logging module for namescope
//!
//! Opt-in file logging of tracker lifecycle events. Nothing is written
//! until [`init_logger`] has been called.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static LOGGER: Mutex<Option<ScopeLogger>> = Mutex::new(None);

/// Appends timestamped lines to a log file
pub struct ScopeLogger {
    file: File,
    path: PathBuf,
}

impl ScopeLogger {
    /// Create a new logger, truncating any existing file
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        Ok(Self {
            file,
            path: log_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }
}

/// Route tracker events to `log_path`
///
/// Without an explicit path a timestamped file in the temp dir is used.
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = match log_path {
        Some(path) => path.to_path_buf(),
        None => std::env::temp_dir().join(format!(
            "namescope-{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )),
    };

    let logger = ScopeLogger::new(&path)?;
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
    Ok(path)
}

/// Stop logging and close the log file
pub fn shutdown() {
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = None;
    }
}

pub fn is_enabled() -> bool {
    LOGGER.lock().map(|slot| slot.is_some()).unwrap_or(false)
}

/// Run `f` against the global logger, if one is installed
fn with_logger(f: impl FnOnce(&mut ScopeLogger)) {
    if let Ok(mut slot) = LOGGER.lock() {
        if let Some(logger) = slot.as_mut() {
            f(logger);
        }
    }
}

/// Log a free-form message
pub fn log(message: &str) {
    with_logger(|logger| logger.log(message));
}

pub fn log_enter(source: &str, baseline: usize, extras: usize) {
    with_logger(|logger| {
        logger.log(&format!(
            "ENTER: observing {} ({} names in baseline, {} extras)",
            source, baseline, extras
        ))
    });
}

pub fn log_refresh(before: usize, after: usize) {
    with_logger(|logger| {
        logger.log(&format!(
            "REFRESH: baseline {} -> {} names (+{})",
            before,
            after,
            after.saturating_sub(before)
        ))
    });
}

pub fn log_diff(new_names: usize, ignore_underscore: bool) {
    let underscore = if ignore_underscore { "ignored" } else { "included" };
    with_logger(|logger| {
        logger.log(&format!(
            "DIFF: {} new names (underscore names {})",
            new_names, underscore
        ))
    });
}

pub fn log_exit(baseline: usize) {
    with_logger(|logger| {
        logger.log(&format!("EXIT: released bindings ({} names in baseline)", baseline))
    });
}
