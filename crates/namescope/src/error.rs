//! Errors raised by scope tracking

use std::fmt;
use thiserror::Error;

/// Lifecycle state of a [`ScopeTracker`](crate::ScopeTracker)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Constructed but never entered
    Inactive,
    /// Between enter and exit
    Active,
    /// Exited; the tracker cannot be entered again
    Exited,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Inactive => write!(f, "not entered"),
            TrackerState::Active => write!(f, "already active"),
            TrackerState::Exited => write!(f, "already exited"),
        }
    }
}

/// Errors that can occur while tracking a scope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("No bindings given and caller locals are unavailable: {0}")]
    ReflectionUnavailable(String),

    #[error("Cannot {operation}: scope tracker is {state}")]
    InvalidState {
        operation: &'static str,
        state: TrackerState,
    },

    #[error("Observed bindings are mutably borrowed")]
    BindingsBorrowed,
}

impl ScopeError {
    pub(crate) fn invalid_state(operation: &'static str, state: TrackerState) -> Self {
        ScopeError::InvalidState { operation, state }
    }
}
