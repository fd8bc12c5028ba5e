use thiserror::Error;

use super::state::Phase;

/// Errors returned by the cabinet controller and the game registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CabinetError {
    /// Launch requested for an id nobody registered.
    #[error("game not found: {0}")]
    UnknownGame(String),

    /// Launch requested while another game still owns the cabinet.
    #[error("cabinet busy: {active} must exit to the menu first")]
    Busy { active: String },

    /// Lifecycle call made from the wrong phase.
    #[error("{operation} is not allowed while {phase}")]
    IllegalState {
        operation: &'static str,
        phase: Phase,
    },

    /// Two modules registered under the same id.
    #[error("a game is already registered as {0}")]
    DuplicateGame(String),
}

/// Returned by the loop scheduler when a second loop is started.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("frame loop {0} is already running")]
    AlreadyRunning(u64),
}

/// One teardown action failed while the cleanup registry was drained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cleanup action `{label}` failed: {message}")]
pub struct CleanupActionError {
    pub label: String,
    pub message: String,
}
