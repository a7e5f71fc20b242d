//! The machine: states, transition table, and the lifecycle that drives
//! enter, run and exit hooks.
//!
//! # Key Concepts
//!
//! - **Transition table**: ordered `(from, exit, to)` triples, resolved by
//!   first match
//! - **Exit arbitration**: an explicit exit requested during an activation
//!   always beats the implicit timeout
//! - **Invalid transitions**: offered to the active action first, then to the
//!   machine's policy, which halts by default

mod error;
mod machine;
mod transition;

pub use error::{BeginError, MachineError};
pub use machine::Machine;
pub use transition::{find_next_state, Fault, InvalidTransitionPolicy, StateId, Transition};
