//! Read-only diagnostic snapshots of a running machine.
//!
//! A snapshot captures everything observable about a machine at one instant
//! (active state, per-state exit codes, counters, recent transitions) in a
//! serializable form. Actions and devices are not serializable, so a snapshot
//! cannot be turned back into a machine; it exists to be logged, shipped or
//! compared.

use crate::core::{Cadence, ExitCode, TransitionHistory};
use crate::engine::{Fault, Machine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Observable condition of one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateReport {
    pub name: String,
    /// Whether the scheduler currently ticks this state
    pub enabled: bool,
    pub entered_at_ms: u64,
    pub exit_code: ExitCode,
    pub cadence: Cadence,
}

/// Serializable picture of a machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// Wall-clock time the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Machine clock at the time the snapshot was taken
    pub now_ms: u64,

    pub initialized: bool,
    pub running: bool,

    /// Name of the active state
    pub current: Option<String>,

    /// Name of the state active before the last transition
    pub previous: Option<String>,

    pub transition_count: u64,
    pub last_fault: Option<Fault>,

    /// Every state, in registration order
    pub states: Vec<StateReport>,

    /// Most recent transitions
    pub history: TransitionHistory,
}

impl MachineSnapshot {
    /// Report for the state called `name`.
    pub fn state(&self, name: &str) -> Option<&StateReport> {
        self.states.iter().find(|report| report.name == name)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate_version()
    }

    fn validate_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

impl Machine {
    /// Capture the observable state of the machine.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coop_fsm::builder::MachineBuilder;
    /// use coop_fsm::core::{Action, ActionContext, State};
    ///
    /// struct Idle;
    ///
    /// impl Action for Idle {
    ///     fn name(&self) -> &str {
    ///         "idle"
    ///     }
    ///
    ///     fn on_run(&mut self, _ctx: &mut ActionContext<'_>) -> bool {
    ///         false
    ///     }
    /// }
    ///
    /// let mut machine = MachineBuilder::new()
    ///     .state(State::new("IDLE", Idle))
    ///     .build()
    ///     .unwrap();
    /// machine.begin().unwrap();
    /// machine.start(machine.state_id("IDLE").unwrap()).unwrap();
    ///
    /// let snapshot = machine.snapshot();
    /// assert_eq!(snapshot.current.as_deref(), Some("IDLE"));
    /// assert!(snapshot.state("IDLE").unwrap().enabled);
    /// ```
    pub fn snapshot(&self) -> MachineSnapshot {
        let name_of = |id| self.state(id).map(|s| s.name().to_string());

        MachineSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            now_ms: self.now_ms(),
            initialized: self.is_initialized(),
            running: self.is_running(),
            current: self.current_state().and_then(name_of),
            previous: self.previous_state().and_then(name_of),
            transition_count: self.transition_count(),
            last_fault: self.last_fault(),
            states: self
                .states()
                .map(|(id, state)| StateReport {
                    name: state.name().to_string(),
                    enabled: self.is_enabled(id),
                    entered_at_ms: state.entered_at_ms(),
                    exit_code: state.exit_code(),
                    cadence: state.cadence(),
                })
                .collect(),
            history: self.history().clone(),
        }
    }
}
