//! Behaviour units bound to states.
//!
//! An action decides what happens when its state is entered, on every
//! scheduled tick while the state is active, and when the state is left. It
//! ends an activation by requesting an exit through its [`ActionContext`].

use super::device::DeviceHandle;
use super::exit::ExitCode;
use std::collections::VecDeque;

/// Outcome of an action's invalid-transition hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposition {
    /// The action dealt with the unmatched exit code; the machine keeps going.
    ///
    /// When the exit came from the state's own timeout or iteration count,
    /// the state has already been switched off and is entered again.
    Handled,
    /// Defer to the machine's invalid-transition policy.
    #[default]
    Escalate,
}

/// The action's view of the machine while one of its hooks runs.
///
/// `request_exit` is the single trigger for every non-timeout transition.
/// The request is resolved by the machine as soon as the running hook
/// returns, before the scheduler moves on. Requests made while a transition
/// is already in flight (from `on_enter` or `on_exit`) are resolved in order
/// once it completes.
pub struct ActionContext<'a> {
    state_name: &'a str,
    exit_code: &'a mut ExitCode,
    pending: &'a mut VecDeque<ExitCode>,
    now_ms: u64,
    entered_at_ms: u64,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        state_name: &'a str,
        exit_code: &'a mut ExitCode,
        pending: &'a mut VecDeque<ExitCode>,
        now_ms: u64,
        entered_at_ms: u64,
    ) -> Self {
        Self {
            state_name,
            exit_code,
            pending,
            now_ms,
            entered_at_ms,
        }
    }

    /// Record `code` as this activation's exit code and ask the machine to
    /// transition out of the current state.
    pub fn request_exit(&mut self, code: ExitCode) {
        *self.exit_code = code;
        self.pending.push_back(code);
    }

    /// Most recent exit code requested since the state was entered.
    pub fn exit_code(&self) -> ExitCode {
        *self.exit_code
    }

    /// Name of the state this action is bound to.
    pub fn state_name(&self) -> &str {
        self.state_name
    }

    /// Monotonic time sampled when the hook was invoked.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn entered_at_ms(&self) -> u64 {
        self.entered_at_ms
    }

    /// Time spent in the current activation.
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.entered_at_ms)
    }
}

/// Behaviour bound to zero or more devices.
///
/// Only [`on_run`](Action::on_run) is required. The default
/// [`begin`](Action::begin) and [`end`](Action::end) walk the handles
/// returned by [`devices`](Action::devices).
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{Action, ActionContext, ExitCode};
///
/// /// Requests `COMPLETE` after three ticks.
/// struct Countdown {
///     ticks: u32,
/// }
///
/// impl Action for Countdown {
///     fn name(&self) -> &str {
///         "countdown"
///     }
///
///     fn on_enter(&mut self, _ctx: &mut ActionContext<'_>) {
///         self.ticks = 0;
///     }
///
///     fn on_run(&mut self, ctx: &mut ActionContext<'_>) -> bool {
///         self.ticks += 1;
///         if self.ticks == 3 {
///             ctx.request_exit(ExitCode::COMPLETE);
///         }
///         true
///     }
/// }
/// ```
pub trait Action {
    fn name(&self) -> &str;

    /// Devices this action drives.
    fn devices(&self) -> &[DeviceHandle] {
        &[]
    }

    /// One-time setup. Every device is attempted even after a failure; the
    /// result is the AND of all of them.
    fn begin(&mut self) -> bool {
        self.devices()
            .iter()
            .fold(true, |ok, device| device.borrow_mut().begin() && ok)
    }

    /// Release every device.
    fn end(&mut self) {
        for device in self.devices() {
            device.borrow_mut().end();
        }
    }

    /// Called once when the owning state becomes active. Reset any
    /// per-activation counters here.
    fn on_enter(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Called on every scheduled tick while active. Returns whether the tick
    /// did useful work; exits are requested explicitly, never returned.
    fn on_run(&mut self, ctx: &mut ActionContext<'_>) -> bool;

    /// Called once when the owning state is deactivated. A cadence timeout or
    /// exhaustion has not been turned into an exit code yet, so a request
    /// made here replaces it.
    fn on_exit(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Called when this action requested `exit_code` but the active state
    /// has no matching transition.
    fn on_invalid_transition(
        &mut self,
        _ctx: &mut ActionContext<'_>,
        _exit_code: ExitCode,
    ) -> Disposition {
        Disposition::Escalate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::{shared, Device, DeviceState};

    struct Probe {
        ok: bool,
        begins: usize,
        ends: usize,
    }

    impl Device for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn state(&self) -> DeviceState {
            DeviceState::Off
        }

        fn begin(&mut self) -> bool {
            self.begins += 1;
            self.ok
        }

        fn start(&mut self) -> bool {
            true
        }

        fn stop(&mut self) {}

        fn end(&mut self) {
            self.ends += 1;
        }
    }

    struct Driven {
        devices: Vec<DeviceHandle>,
    }

    impl Action for Driven {
        fn name(&self) -> &str {
            "driven"
        }

        fn devices(&self) -> &[DeviceHandle] {
            &self.devices
        }

        fn on_run(&mut self, _ctx: &mut ActionContext<'_>) -> bool {
            true
        }
    }

    fn probe(ok: bool) -> std::rc::Rc<std::cell::RefCell<Probe>> {
        shared(Probe {
            ok,
            begins: 0,
            ends: 0,
        })
    }

    #[test]
    fn begin_without_devices_succeeds() {
        let mut action = Driven { devices: vec![] };
        assert!(action.begin());
    }

    #[test]
    fn begin_attempts_every_device_after_failure() {
        let first = probe(false);
        let second = probe(true);
        let mut action = Driven {
            devices: vec![first.clone(), second.clone()],
        };

        assert!(!action.begin());
        assert_eq!(first.borrow().begins, 1);
        assert_eq!(second.borrow().begins, 1);
    }

    #[test]
    fn end_releases_every_device() {
        let first = probe(true);
        let second = probe(true);
        let mut action = Driven {
            devices: vec![first.clone(), second.clone()],
        };

        action.end();
        assert_eq!(first.borrow().ends, 1);
        assert_eq!(second.borrow().ends, 1);
    }

    #[test]
    fn request_exit_records_and_queues() {
        let mut exit = ExitCode::NONE;
        let mut pending = VecDeque::new();
        let mut ctx = ActionContext::new("S", &mut exit, &mut pending, 150, 100);

        assert_eq!(ctx.elapsed_ms(), 50);
        ctx.request_exit(ExitCode::ERROR);
        ctx.request_exit(ExitCode::CANCEL);
        assert_eq!(ctx.exit_code(), ExitCode::CANCEL);
        assert_eq!(ctx.state_name(), "S");

        assert_eq!(exit, ExitCode::CANCEL);
        assert_eq!(
            pending.into_iter().collect::<Vec<_>>(),
            vec![ExitCode::ERROR, ExitCode::CANCEL]
        );
    }

    #[test]
    fn invalid_transition_escalates_by_default() {
        let mut action = Driven { devices: vec![] };
        let mut exit = ExitCode::NONE;
        let mut pending = VecDeque::new();
        let mut ctx = ActionContext::new("S", &mut exit, &mut pending, 0, 0);
        assert_eq!(
            action.on_invalid_transition(&mut ctx, ExitCode::USER),
            Disposition::Escalate
        );
    }
}
