//! Transition history tracking.
//!
//! The machine keeps a bounded record of its most recent transitions for
//! diagnostics. The ring never grows past its capacity, so recording stays
//! constant-cost inside a tight control loop.

use super::exit::ExitCode;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Capacity used when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Record of a single transition.
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{ExitCode, TransitionRecord};
///
/// let record = TransitionRecord {
///     sequence: 1,
///     from: "OFF".to_string(),
///     to: "ON".to_string(),
///     exit: Some(ExitCode::USER),
///     at_ms: 1200,
/// };
/// assert!(!record.is_forced());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Value of the machine's transition counter after this transition
    pub sequence: u64,
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// Exit code that selected the transition; `None` when forced
    pub exit: Option<ExitCode>,
    /// Monotonic time of the transition
    pub at_ms: u64,
}

impl TransitionRecord {
    pub fn is_forced(&self) -> bool {
        self.exit.is_none()
    }
}

/// Ordered, bounded history of transitions.
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{ExitCode, TransitionHistory, TransitionRecord};
///
/// let mut history = TransitionHistory::with_capacity(8);
/// history.record(TransitionRecord {
///     sequence: 1,
///     from: "OFF".to_string(),
///     to: "ON".to_string(),
///     exit: Some(ExitCode::USER),
///     at_ms: 10,
/// });
/// history.record(TransitionRecord {
///     sequence: 2,
///     from: "ON".to_string(),
///     to: "OFF".to_string(),
///     exit: Some(ExitCode::TIMEOUT),
///     at_ms: 5011,
/// });
///
/// assert_eq!(history.path(), vec!["OFF", "ON", "OFF"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl TransitionHistory {
    /// Create an empty history keeping at most `capacity` records.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Names of the states traversed: the oldest retained source, then the
    /// target of every retained transition.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sequence: u64, from: &str, to: &str) -> TransitionRecord {
        TransitionRecord {
            sequence,
            from: from.to_string(),
            to: to.to_string(),
            exit: Some(ExitCode::USER),
            at_ms: sequence * 10,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = TransitionHistory::default();
        assert!(history.is_empty());
        assert!(history.path().is_empty());
        assert!(history.last().is_none());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn path_follows_transitions() {
        let mut history = TransitionHistory::with_capacity(4);
        history.record(record(1, "OFF", "ON"));
        history.record(record(2, "ON", "BLINK"));

        assert_eq!(history.path(), vec!["OFF", "ON", "BLINK"]);
        assert_eq!(history.last().map(|r| r.sequence), Some(2));
    }

    #[test]
    fn oldest_records_are_evicted() {
        let mut history = TransitionHistory::with_capacity(2);
        history.record(record(1, "A", "B"));
        history.record(record(2, "B", "C"));
        history.record(record(3, "C", "D"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.path(), vec!["B", "C", "D"]);
        let sequences: Vec<u64> = history.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![2, 3]);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = TransitionHistory::with_capacity(0);
        history.record(record(1, "A", "B"));
        assert!(history.is_empty());
    }

    #[test]
    fn forced_records_have_no_exit() {
        let mut forced = record(1, "A", "B");
        forced.exit = None;
        assert!(forced.is_forced());
        assert!(!record(2, "B", "C").is_forced());
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = TransitionHistory::with_capacity(4);
        history.record(record(1, "OFF", "ON"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: TransitionHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.last(), history.last());
    }
}
