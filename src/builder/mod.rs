//! Builder API for static machine configuration.
//!
//! A machine's whole configuration surface is an ordered set of states and
//! an ordered transition table, assembled once before `begin()`. This
//! module provides fluent builders, a table macro, and serde-loadable
//! settings for writing that surface by state name.

pub mod config;
pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use config::MachineConfig;
pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::{TransitionBuilder, TransitionSpec};

use crate::core::ExitCode;

/// Transitions that walk `states` in order on `exit`, wrapping from the last
/// back to the first.
///
/// # Example
///
/// ```
/// use coop_fsm::builder::{cycle, TransitionSpec};
/// use coop_fsm::core::ExitCode;
///
/// let table = cycle(&["OFF", "ON", "BLINK"], ExitCode::USER);
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table[2], TransitionSpec::new("BLINK", ExitCode::USER, "OFF"));
/// ```
pub fn cycle(states: &[&str], exit: ExitCode) -> Vec<TransitionSpec> {
    states
        .iter()
        .zip(states.iter().cycle().skip(1))
        .map(|(from, to)| TransitionSpec::new(*from, exit, *to))
        .collect()
}
