//! Scheduled state wrapper around an action.
//!
//! A state binds one [`Action`] to a [`Cadence`] and turns the scheduler's
//! enable, tick and disable events into the action's lifecycle hooks.

use super::action::{Action, ActionContext, Disposition};
use super::exit::ExitCode;
use crate::scheduler::{DisableReason, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

/// Interval used when a state is created without an explicit cadence.
pub const DEFAULT_INTERVAL_MS: u64 = 1;

/// How many times a state's tick runs per activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Iterations {
    #[default]
    Forever,
    Count(u32),
}

/// Scheduling configuration of a state.
///
/// `timeout_ms` bounds the wall-clock length of an activation; when it
/// elapses without an explicit exit the state leaves with
/// [`ExitCode::TIMEOUT`]. A finite iteration count that runs out without an
/// explicit exit leaves with [`ExitCode::COMPLETE`].
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{Cadence, Iterations};
///
/// let cadence: Cadence = serde_json::from_str(
///     r#"{ "interval_ms": 10, "iterations": { "count": 5 }, "timeout_ms": 5000 }"#,
/// ).unwrap();
///
/// assert_eq!(cadence.iterations, Iterations::Count(5));
/// assert_eq!(cadence.timeout_ms, Some(5000));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub interval_ms: u64,
    #[serde(default)]
    pub iterations: Iterations,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            iterations: Iterations::Forever,
            timeout_ms: None,
        }
    }
}

/// One operational mode of the machine.
pub struct State {
    name: String,
    action: Box<dyn Action>,
    cadence: Cadence,
    exit_code: ExitCode,
    entered_at_ms: u64,
    task: Option<TaskId>,
}

impl State {
    /// Create a state with the default cadence (every millisecond, forever).
    pub fn new(name: impl Into<String>, action: impl Action + 'static) -> Self {
        Self::boxed(name, Box::new(action))
    }

    pub fn boxed(name: impl Into<String>, action: Box<dyn Action>) -> Self {
        Self {
            name: name.into(),
            action,
            cadence: Cadence::default(),
            exit_code: ExitCode::NONE,
            entered_at_ms: 0,
            task: None,
        }
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.cadence.interval_ms = interval_ms;
        self
    }

    pub fn iterations(mut self, iterations: Iterations) -> Self {
        self.cadence.iterations = iterations;
        self
    }

    /// Leave with [`ExitCode::TIMEOUT`] once an activation outlasts `timeout_ms`.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.cadence.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Exit code of the current (or most recent) activation.
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// Monotonic time of the most recent entry.
    pub fn entered_at_ms(&self) -> u64 {
        self.entered_at_ms
    }

    pub(crate) fn task(&self) -> Option<TaskId> {
        self.task
    }

    pub(crate) fn attach(&mut self, task: TaskId) {
        self.task = Some(task);
    }

    pub(crate) fn begin(&mut self) -> bool {
        self.action.begin()
    }

    pub(crate) fn end(&mut self) {
        self.action.end();
    }

    /// Scheduler enabled this state.
    pub(crate) fn on_enable(&mut self, now_ms: u64, pending: &mut VecDeque<ExitCode>) {
        self.entered_at_ms = now_ms;
        self.exit_code = ExitCode::NONE;
        trace!(state = %self.name, now_ms, "on_enter");
        let mut ctx = ActionContext::new(
            &self.name,
            &mut self.exit_code,
            pending,
            now_ms,
            self.entered_at_ms,
        );
        self.action.on_enter(&mut ctx);
    }

    /// Scheduler found this state due.
    pub(crate) fn on_tick(&mut self, now_ms: u64, pending: &mut VecDeque<ExitCode>) -> bool {
        let mut ctx = ActionContext::new(
            &self.name,
            &mut self.exit_code,
            pending,
            now_ms,
            self.entered_at_ms,
        );
        self.action.on_run(&mut ctx)
    }

    /// Scheduler disabled this state.
    ///
    /// `on_exit` always runs first. An exit is synthesized afterwards only
    /// when the cadence ended the activation and the action never requested
    /// one, so an explicit request always beats the implicit timeout.
    pub(crate) fn on_disable(
        &mut self,
        reason: DisableReason,
        now_ms: u64,
        pending: &mut VecDeque<ExitCode>,
    ) {
        trace!(state = %self.name, ?reason, exit = %self.exit_code, "on_exit");
        let mut ctx = ActionContext::new(
            &self.name,
            &mut self.exit_code,
            pending,
            now_ms,
            self.entered_at_ms,
        );
        self.action.on_exit(&mut ctx);

        if !self.exit_code.is_none() {
            return;
        }
        let implicit = match reason {
            DisableReason::TimedOut => ExitCode::TIMEOUT,
            DisableReason::Exhausted => ExitCode::COMPLETE,
            DisableReason::Requested => return,
        };
        debug!(state = %self.name, exit = %implicit, "synthesized exit");
        self.exit_code = implicit;
        pending.push_back(implicit);
    }

    pub(crate) fn on_invalid_transition(
        &mut self,
        exit_code: ExitCode,
        now_ms: u64,
        pending: &mut VecDeque<ExitCode>,
    ) -> Disposition {
        let mut ctx = ActionContext::new(
            &self.name,
            &mut self.exit_code,
            pending,
            now_ms,
            self.entered_at_ms,
        );
        self.action.on_invalid_transition(&mut ctx, exit_code)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("action", &self.action.name())
            .field("cadence", &self.cadence)
            .field("exit_code", &self.exit_code)
            .field("entered_at_ms", &self.entered_at_ms)
            .finish()
    }
}
