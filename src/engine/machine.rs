//! Machine that owns the states and drives them through the scheduler.

use super::error::{BeginError, MachineError};
use super::transition::{find_next_state, Fault, InvalidTransitionPolicy, StateId, Transition};
use crate::core::{Disposition, ExitCode, State, TransitionHistory, TransitionRecord};
use crate::scheduler::{
    Clock, CooperativeScheduler, DisableReason, Poll, Scheduler, SystemClock,
};
use std::collections::VecDeque;
use stillwater::validation::Validation;
use tracing::{debug, error, info, trace, warn};

/// Orchestrates a fixed set of states and a static transition table.
///
/// The machine is single-threaded and cooperative: every method runs to
/// completion before returning and nothing blocks. A driving loop owns the
/// machine and calls [`execute`](Machine::execute) as often as it likes.
///
/// Exits requested by an action are resolved as soon as the hook that
/// requested them returns. Requests raised while a transition is in flight
/// are queued and resolved in order after it completes.
///
/// Most machines are assembled with
/// [`MachineBuilder`](crate::builder::MachineBuilder).
pub struct Machine {
    states: Vec<State>,
    transitions: Vec<Transition>,
    scheduler: Box<dyn Scheduler>,
    clock: Box<dyn Clock>,
    policy: InvalidTransitionPolicy,
    history: TransitionHistory,
    pending: VecDeque<ExitCode>,
    current: Option<StateId>,
    previous: Option<StateId>,
    running: bool,
    initialized: bool,
    transition_count: u64,
    last_fault: Option<Fault>,
}

impl Machine {
    /// Create a machine from states and a raw transition table, using the
    /// system clock and the cooperative scheduler.
    ///
    /// Table entries are not validated here; an entry whose target is not a
    /// configured state behaves like a missing entry.
    pub fn new(states: Vec<State>, transitions: Vec<Transition>) -> Self {
        Self::from_parts(
            states,
            transitions,
            Box::new(CooperativeScheduler::new()),
            Box::new(SystemClock::new()),
            InvalidTransitionPolicy::default(),
            TransitionHistory::default(),
        )
    }

    pub(crate) fn from_parts(
        states: Vec<State>,
        transitions: Vec<Transition>,
        scheduler: Box<dyn Scheduler>,
        clock: Box<dyn Clock>,
        policy: InvalidTransitionPolicy,
        history: TransitionHistory,
    ) -> Self {
        Self {
            states,
            transitions,
            scheduler,
            clock,
            policy,
            history,
            pending: VecDeque::new(),
            current: None,
            previous: None,
            running: false,
            initialized: false,
            transition_count: 0,
            last_fault: None,
        }
    }

    /// Register every state with the scheduler and run every `begin()`.
    ///
    /// A failing state does not stop the loop; all states are registered and
    /// attempted, and every failure is reported. Registration happens once;
    /// calling `begin` again only re-runs the `begin()` hooks.
    pub fn begin(&mut self) -> Result<(), BeginError> {
        let register = !self.initialized;
        let mut checks: Vec<Validation<(), Vec<String>>> = Vec::with_capacity(self.states.len());

        for state in &mut self.states {
            if register {
                let task = self.scheduler.register(state.cadence());
                state.attach(task);
            }
            let check = if state.begin() {
                Validation::Success(())
            } else {
                warn!(state = %state.name(), "begin failed");
                Validation::Failure(vec![state.name().to_string()])
            };
            checks.push(check);
        }
        self.initialized = true;

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(failed) => Err(BeginError { failed }),
        }
    }

    /// Stop the machine and release every action's devices.
    pub fn end(&mut self) {
        self.stop();
        for state in &mut self.states {
            state.end();
        }
    }

    /// Enter `initial` and start processing.
    ///
    /// A state left enabled by a halt or by a forced transition before the
    /// first start is disabled first, so exactly one state runs.
    pub fn start(&mut self, initial: StateId) -> Result<(), MachineError> {
        if self.running {
            return Err(MachineError::AlreadyRunning {
                current: self.current_name().unwrap_or_default().to_string(),
            });
        }
        if !self.initialized {
            return Err(MachineError::NotInitialized);
        }
        if initial.index() >= self.states.len() {
            return Err(MachineError::UnknownState(initial));
        }

        info!(state = %self.states[initial.index()].name(), "machine started");
        let now = self.clock.now_ms();
        if let Some(stale) = self.current {
            self.disable_state(stale, DisableReason::Requested, now);
        }
        self.last_fault = None;
        self.pending.clear();
        self.current = Some(initial);
        self.running = true;
        self.enable_state(initial, now);
        self.drain_pending();
        Ok(())
    }

    /// Leave the current state and stop processing. Idempotent.
    ///
    /// Exits requested by the action while it is being stopped are dropped.
    pub fn stop(&mut self) {
        if let Some(current) = self.current {
            let now = self.clock.now_ms();
            self.disable_state(current, DisableReason::Requested, now);
        }
        if !self.pending.is_empty() {
            debug!(dropped = self.pending.len(), "discarding exits requested during stop");
            self.pending.clear();
        }
        if self.running {
            info!(state = self.current_name().unwrap_or("<none>"), "machine stopped");
        }
        self.running = false;
    }

    /// Run one scheduling pass.
    ///
    /// Does nothing unless the machine is running. Each registered state is
    /// polled once, so the cost is bounded by the number of states. Returns
    /// whether any tick reported useful work, which lets a driving loop
    /// idle when nothing happened.
    pub fn execute(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let now = self.clock.now_ms();
        let mut busy = false;

        for index in 0..self.states.len() {
            let Some(task) = self.states[index].task() else {
                continue;
            };
            match self.scheduler.poll(task, now) {
                Poll::Idle => continue,
                Poll::Run => {
                    let worked = self.states[index].on_tick(now, &mut self.pending);
                    trace!(state = %self.states[index].name(), worked, "tick");
                    busy |= worked;
                }
                Poll::Disabled(reason) => {
                    debug!(state = %self.states[index].name(), ?reason, "cadence ended activation");
                    self.states[index].on_disable(reason, now, &mut self.pending);
                }
            }
            self.drain_pending();
            if !self.running {
                break;
            }
        }
        busy
    }

    /// Resolve `exit` from the current state through the transition table.
    ///
    /// The first entry in table order matching the current state and `exit`
    /// wins. Without a match the current action's
    /// [`on_invalid_transition`](crate::core::Action::on_invalid_transition)
    /// is consulted, then the machine's [`InvalidTransitionPolicy`].
    pub fn request_transition(&mut self, exit: ExitCode) {
        self.resolve(exit);
        self.drain_pending();
    }

    /// Transition to `target` regardless of the table.
    ///
    /// Intended for fault recovery. A target outside the configured states
    /// takes the invalid-transition path with [`ExitCode::NONE`].
    pub fn force_transition_to(&mut self, target: StateId) {
        self.transition_to(target, None);
        self.drain_pending();
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    pub fn previous_state(&self) -> Option<StateId> {
        self.previous
    }

    /// The active state, if any.
    pub fn current(&self) -> Option<&State> {
        self.current.and_then(|id| self.state(id))
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Look a state up by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name() == name)
            .map(StateId::new)
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(index, state)| (StateId::new(index), state))
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `id` is currently enabled in the scheduler.
    pub fn is_enabled(&self, id: StateId) -> bool {
        self.state(id)
            .and_then(State::task)
            .is_some_and(|task| self.scheduler.is_enabled(task))
    }

    /// Number of transitions executed since the machine was created.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// The most recent unresolved exit, kept until the next `start`.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn current_name(&self) -> Option<&str> {
        self.current().map(State::name)
    }

    /// Resolve queued exits, at most one per state and table entry.
    fn drain_pending(&mut self) {
        let mut budget = self.states.len() + self.transitions.len();
        while let Some(exit) = self.pending.pop_front() {
            if budget == 0 {
                self.pending.clear();
                self.exit_loop(exit);
                return;
            }
            budget -= 1;
            self.resolve(exit);
        }
    }

    fn exit_loop(&mut self, exit: ExitCode) {
        let fault = Fault::ExitLoop {
            from: self.current,
            exit,
        };
        self.last_fault = Some(fault);
        if self.policy.keep_running(&fault) {
            warn!(
                state = self.current_name().unwrap_or("<none>"),
                %exit,
                "exit requests keep looping, dropping the rest"
            );
        } else {
            error!(
                state = self.current_name().unwrap_or("<none>"),
                %exit,
                "exit requests keep looping, halting machine"
            );
            self.running = false;
        }
    }

    fn resolve(&mut self, exit: ExitCode) {
        let next = self
            .current
            .and_then(|from| find_next_state(&self.transitions, from, exit));
        match next {
            Some(target) => self.transition_to(target, Some(exit)),
            None => self.invalid_transition(exit),
        }
    }

    fn transition_to(&mut self, target: StateId, exit: Option<ExitCode>) {
        if target.index() >= self.states.len() {
            self.invalid_transition(exit.unwrap_or(ExitCode::NONE));
            return;
        }

        let now = self.clock.now_ms();
        let from = self.current;
        self.previous = from;
        if let Some(from) = from {
            self.disable_state(from, DisableReason::Requested, now);
        }
        self.current = Some(target);
        self.enable_state(target, now);
        self.transition_count += 1;

        let to_name = self.states[target.index()].name().to_string();
        match exit {
            Some(exit) => debug!(from = ?from, to = %to_name, %exit, count = self.transition_count, "transition"),
            None => debug!(from = ?from, to = %to_name, count = self.transition_count, "forced transition"),
        }

        if let Some(from_state) = from.and_then(|id| self.states.get(id.index())) {
            let record = TransitionRecord {
                sequence: self.transition_count,
                from: from_state.name().to_string(),
                to: to_name,
                exit,
                at_ms: now,
            };
            self.history.record(record);
        }
    }

    fn invalid_transition(&mut self, exit: ExitCode) {
        let now = self.clock.now_ms();
        if let Some(state) = self.current.and_then(|id| self.states.get_mut(id.index())) {
            warn!(state = %state.name(), %exit, "no transition for exit code");
            let disposition = state.on_invalid_transition(exit, now, &mut self.pending);
            if disposition == Disposition::Handled {
                self.resume_current(now);
                return;
            }
        }

        let fault = Fault::InvalidTransition {
            from: self.current,
            exit,
        };
        self.last_fault = Some(fault);
        if !self.policy.keep_running(&fault) {
            error!(
                state = self.current_name().unwrap_or("<none>"),
                %exit,
                "unhandled invalid transition, halting machine"
            );
            self.running = false;
        }
    }

    /// Re-enter the current state if its cadence switched it off.
    fn resume_current(&mut self, now: u64) {
        let Some(current) = self.current else {
            return;
        };
        if self.running && !self.is_enabled(current) {
            debug!(state = self.current_name().unwrap_or("<none>"), "re-entering after handled exit");
            self.enable_state(current, now);
        }
    }

    fn enable_state(&mut self, id: StateId, now: u64) {
        let Some(state) = self.states.get_mut(id.index()) else {
            return;
        };
        if let Some(task) = state.task() {
            self.scheduler.enable(task, now);
        }
        state.on_enable(now, &mut self.pending);
    }

    fn disable_state(&mut self, id: StateId, reason: DisableReason, now: u64) {
        let Some(state) = self.states.get_mut(id.index()) else {
            return;
        };
        let Some(task) = state.task() else {
            return;
        };
        if self.scheduler.disable(task) {
            state.on_disable(reason, now, &mut self.pending);
        }
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("running", &self.running)
            .field("transition_count", &self.transition_count)
            .field("last_fault", &self.last_fault)
            .finish()
    }
}
