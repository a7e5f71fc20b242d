//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("State '{0}' is defined more than once")]
    DuplicateState(String),

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition exit code not specified. Call .on(exit)")]
    MissingExit,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(String),
}
