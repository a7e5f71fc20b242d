//! Cooperative scheduling primitive consumed by the machine.
//!
//! The machine treats the scheduler as a black box with a small contract:
//! register a unit with its cadence, enable and disable units
//! independently, and report on each poll whether an enabled unit is due,
//! idle, or was just switched off by its own cadence. The machine turns
//! those answers into state hooks.
//!
//! [`CooperativeScheduler`] is the default implementation. Anything else
//! honouring the contract can be plugged in through
//! [`MachineBuilder::scheduler`](crate::builder::MachineBuilder::scheduler).

pub mod clock;
mod cooperative;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cooperative::CooperativeScheduler;

use crate::core::Cadence;
use serde::{Deserialize, Serialize};

/// Handle of a registered unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Why a unit stopped being enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisableReason {
    /// An explicit disable call (transition or machine stop).
    Requested,
    /// The finite iteration count ran out.
    Exhausted,
    /// The activation outlasted its timeout window.
    TimedOut,
}

/// Answer of a single poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Poll {
    /// Disabled, or enabled but not yet due.
    Idle,
    /// Due: invoke the unit's tick now.
    Run,
    /// The cadence has just disabled the unit.
    Disabled(DisableReason),
}

/// Cooperative task runner contract.
pub trait Scheduler {
    /// Add a unit. Units start disabled.
    fn register(&mut self, cadence: Cadence) -> TaskId;

    /// Number of registered units.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enable a unit and restart its cadence. Returns `false` for an unknown
    /// handle.
    fn enable(&mut self, task: TaskId, now_ms: u64) -> bool;

    /// Disable a unit. Returns whether it was enabled.
    fn disable(&mut self, task: TaskId) -> bool;

    fn is_enabled(&self, task: TaskId) -> bool;

    /// Advance a unit's bookkeeping to `now_ms` and say what to do with it.
    fn poll(&mut self, task: TaskId, now_ms: u64) -> Poll;
}
