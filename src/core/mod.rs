//! Core engine types.
//!
//! This module contains the building blocks of a machine:
//! - Exit codes and their reserved ranges
//! - The `Device` capability contract
//! - The `Action` behaviour contract and its hook context
//! - `State`, which binds an action to a scheduling cadence
//! - Bounded transition history

mod action;
mod device;
mod exit;
mod history;
mod state;

pub use action::{Action, ActionContext, Disposition};
pub use device::{shared, Device, DeviceHandle, DeviceState};
pub use exit::{ExitCode, ExitCodeError};
pub use history::{TransitionHistory, TransitionRecord, DEFAULT_HISTORY_CAPACITY};
pub use state::{Cadence, Iterations, State, DEFAULT_INTERVAL_MS};
