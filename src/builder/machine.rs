//! Builder for constructing machines.

use crate::builder::config::MachineConfig;
use crate::builder::error::BuildError;
use crate::builder::transition::{TransitionBuilder, TransitionSpec};
use crate::core::{State, TransitionHistory};
use crate::engine::{InvalidTransitionPolicy, Machine, StateId, Transition};
use crate::scheduler::{Clock, CooperativeScheduler, Scheduler, SystemClock};
use std::collections::HashMap;
use tracing::warn;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use coop_fsm::builder::{MachineBuilder, TransitionSpec};
/// use coop_fsm::core::{Action, ActionContext, ExitCode, State};
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
///     .state(State::new("OFF", Idle))
///     .state(State::new("ON", Idle).timeout_ms(5000))
///     .add_transition(TransitionSpec::new("OFF", ExitCode::USER, "ON"))
///     .add_transition(TransitionSpec::new("ON", ExitCode::TIMEOUT, "OFF"))
///     .build()
///     .unwrap();
///
/// machine.begin().unwrap();
/// let off = machine.state_id("OFF").unwrap();
/// machine.start(off).unwrap();
/// machine.request_transition(ExitCode::USER);
/// assert_eq!(machine.current().map(|s| s.name()), Some("ON"));
/// ```
pub struct MachineBuilder {
    states: Vec<State>,
    transitions: Vec<TransitionSpec>,
    scheduler: Option<Box<dyn Scheduler>>,
    clock: Option<Box<dyn Clock>>,
    policy: InvalidTransitionPolicy,
    config: MachineConfig,
}

impl MachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            scheduler: None,
            clock: None,
            policy: InvalidTransitionPolicy::default(),
            config: MachineConfig::default(),
        }
    }

    /// Add a state. Registration order is also the scheduling order.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionSpec) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once, keeping their order.
    pub fn transitions(mut self, transitions: Vec<TransitionSpec>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Use a custom clock instead of [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Use a custom scheduler instead of [`CooperativeScheduler`].
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// How the machine reacts to exits nobody handled. Defaults to halting.
    pub fn on_invalid_transition(mut self, policy: InvalidTransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the machine.
    ///
    /// Fails on an empty state set, duplicate state names, and transitions
    /// or cadence overrides naming unknown states. Duplicate
    /// `(from, exit)` pairs are accepted; only the first is ever used.
    pub fn build(self) -> Result<Machine, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut ids: HashMap<String, StateId> = HashMap::with_capacity(self.states.len());
        for (index, state) in self.states.iter().enumerate() {
            if ids
                .insert(state.name().to_string(), StateId::new(index))
                .is_some()
            {
                return Err(BuildError::DuplicateState(state.name().to_string()));
            }
        }
        let resolve = |name: &str| {
            ids.get(name).copied().ok_or_else(|| BuildError::UnknownState {
                name: name.to_string(),
            })
        };

        let mut table: Vec<Transition> = Vec::with_capacity(self.transitions.len());
        for spec in &self.transitions {
            let from = resolve(spec.from.as_str())?;
            let to = resolve(spec.to.as_str())?;
            if table.iter().any(|t| t.matches(from, spec.exit)) {
                warn!(from = %spec.from, exit = %spec.exit, to = %spec.to, "shadowed transition, earlier entry wins");
            }
            table.push(Transition::new(from, spec.exit, to));
        }

        for name in self.config.cadences.keys() {
            resolve(name.as_str())?;
        }
        let cadences = self.config.cadences;
        let states = self
            .states
            .into_iter()
            .map(|state| match cadences.get(state.name()) {
                Some(cadence) => state.with_cadence(*cadence),
                None => state,
            })
            .collect();

        Ok(Machine::from_parts(
            states,
            table,
            self.scheduler
                .unwrap_or_else(|| Box::new(CooperativeScheduler::new())),
            self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            self.policy,
            TransitionHistory::with_capacity(self.config.history_capacity),
        ))
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
