//! Transition table entries, lookup, and invalid-transition policy.

use crate::core::ExitCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a state inside its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(usize);

impl StateId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Edge of the machine: leaving `from` with `exit` enters `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: StateId,
    pub exit: ExitCode,
    pub to: StateId,
}

impl Transition {
    pub const fn new(from: StateId, exit: ExitCode, to: StateId) -> Self {
        Self { from, exit, to }
    }

    pub fn matches(&self, from: StateId, exit: ExitCode) -> bool {
        self.from == from && self.exit == exit
    }
}

/// First entry in table order matching `(from, exit)`.
///
/// Later duplicates of the same pair are never consulted.
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::ExitCode;
/// use coop_fsm::engine::{find_next_state, StateId, Transition};
///
/// let a = StateId::new(0);
/// let b = StateId::new(1);
/// let c = StateId::new(2);
/// let table = [
///     Transition::new(a, ExitCode::USER, b),
///     Transition::new(a, ExitCode::USER, c),
/// ];
///
/// assert_eq!(find_next_state(&table, a, ExitCode::USER), Some(b));
/// assert_eq!(find_next_state(&table, b, ExitCode::USER), None);
/// ```
pub fn find_next_state(table: &[Transition], from: StateId, exit: ExitCode) -> Option<StateId> {
    table
        .iter()
        .find(|t| t.matches(from, exit))
        .map(|t| t.to)
}

/// Diagnostic left behind when an exit code could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// No table entry (or no valid target) for `exit` from `from`.
    InvalidTransition {
        from: Option<StateId>,
        exit: ExitCode,
    },
    /// Exit requests kept re-queueing themselves within one call; `exit` is
    /// the first request that was dropped.
    ExitLoop {
        from: Option<StateId>,
        exit: ExitCode,
    },
}

/// Machine-level handling of exits the active action did not handle itself.
#[derive(Default)]
pub enum InvalidTransitionPolicy {
    /// Stop the machine; `execute` becomes a no-op and the current state
    /// stays observable.
    #[default]
    Halt,
    /// Keep running in the current state.
    Ignore,
    /// Decide per fault; return `true` to keep running.
    Custom(Box<dyn FnMut(&Fault) -> bool>),
}

impl InvalidTransitionPolicy {
    pub fn custom<F>(handler: F) -> Self
    where
        F: FnMut(&Fault) -> bool + 'static,
    {
        Self::Custom(Box::new(handler))
    }

    /// Whether the machine keeps running after `fault`.
    pub(crate) fn keep_running(&mut self, fault: &Fault) -> bool {
        match self {
            Self::Halt => false,
            Self::Ignore => true,
            Self::Custom(handler) => handler(fault),
        }
    }
}

impl fmt::Debug for InvalidTransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Halt => f.write_str("Halt"),
            Self::Ignore => f.write_str("Ignore"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: StateId = StateId::new(0);
    const B: StateId = StateId::new(1);
    const C: StateId = StateId::new(2);

    #[test]
    fn lookup_matches_pair() {
        let table = [
            Transition::new(A, ExitCode::USER, B),
            Transition::new(B, ExitCode::USER, C),
            Transition::new(B, ExitCode::TIMEOUT, A),
        ];

        assert_eq!(find_next_state(&table, B, ExitCode::TIMEOUT), Some(A));
        assert_eq!(find_next_state(&table, B, ExitCode::USER), Some(C));
        assert_eq!(find_next_state(&table, C, ExitCode::USER), None);
        assert_eq!(find_next_state(&table, A, ExitCode::ERROR), None);
    }

    #[test]
    fn earliest_duplicate_wins() {
        let table = [
            Transition::new(A, ExitCode::ERROR, C),
            Transition::new(A, ExitCode::ERROR, B),
        ];
        assert_eq!(find_next_state(&table, A, ExitCode::ERROR), Some(C));
    }

    #[test]
    fn empty_table_matches_nothing() {
        assert_eq!(find_next_state(&[], A, ExitCode::NONE), None);
    }

    #[test]
    fn policies_decide_whether_to_keep_running() {
        let fault = Fault::InvalidTransition {
            from: Some(A),
            exit: ExitCode::USER,
        };

        assert!(!InvalidTransitionPolicy::Halt.keep_running(&fault));
        assert!(InvalidTransitionPolicy::Ignore.keep_running(&fault));

        let mut seen = Vec::new();
        let mut policy = InvalidTransitionPolicy::custom(move |f: &Fault| {
            seen.push(*f);
            seen.len() < 2
        });
        assert!(policy.keep_running(&fault));
        assert!(!policy.keep_running(&fault));
    }

    #[test]
    fn default_policy_halts() {
        assert!(matches!(
            InvalidTransitionPolicy::default(),
            InvalidTransitionPolicy::Halt
        ));
    }

    #[test]
    fn state_id_serializes_as_index() {
        assert_eq!(serde_json::to_string(&B).unwrap(), "1");
        assert_eq!(B.to_string(), "#1");
    }
}
