//! Machine lifecycle errors.

use super::transition::StateId;
use thiserror::Error;

/// Errors returned by [`Machine::start`](super::Machine::start).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State {0} is not part of this machine")]
    UnknownState(StateId),

    #[error("Machine not initialized. Call .begin() before .start()")]
    NotInitialized,

    #[error("Machine already running in state '{current}'")]
    AlreadyRunning { current: String },
}

/// Aggregated initialisation failure from [`Machine::begin`](super::Machine::begin).
///
/// Every state is registered and attempted; this lists all that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("States failed to begin: {failed:?}")]
pub struct BeginError {
    pub failed: Vec<String>,
}
