//! Property-based tests for the engine.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use coop_fsm::builder::MachineBuilder;
use coop_fsm::core::{Action, ActionContext, ExitCode, State};
use coop_fsm::engine::{find_next_state, Fault, InvalidTransitionPolicy, StateId, Transition};
use coop_fsm::scheduler::ManualClock;
use coop_fsm::{transition_table, Machine};
use proptest::prelude::*;

struct Passive;

impl Action for Passive {
    fn name(&self) -> &str {
        "passive"
    }

    fn on_run(&mut self, _ctx: &mut ActionContext<'_>) -> bool {
        true
    }
}

fn code(offset: u8) -> ExitCode {
    ExitCode::user(offset).unwrap()
}

/// Three states in a ring: `USER` advances, `USER+1` re-enters, anything
/// else is unmatched.
fn ring(clock: &ManualClock) -> Machine {
    let mut machine = MachineBuilder::new()
        .state(State::new("A", Passive))
        .state(State::new("B", Passive))
        .state(State::new("C", Passive))
        .transitions(transition_table! {
            "A" => code(0) => "B",
            "B" => code(0) => "C",
            "C" => code(0) => "A",
            "A" => code(1) => "A",
            "B" => code(1) => "B",
            "C" => code(1) => "C",
        })
        .on_invalid_transition(InvalidTransitionPolicy::Ignore)
        .clock(clock.clone())
        .build()
        .unwrap();
    machine.begin().unwrap();
    machine.start(StateId::new(0)).unwrap();
    machine
}

prop_compose! {
    fn arbitrary_transition()(from in 0..4usize, exit in 0..3u8, to in 0..4usize) -> Transition {
        Transition::new(StateId::new(from), code(exit), StateId::new(to))
    }
}

proptest! {
    #[test]
    fn lookup_returns_first_match(
        table in prop::collection::vec(arbitrary_transition(), 0..16),
        from in 0..4usize,
        exit in 0..3u8,
    ) {
        let from = StateId::new(from);
        let exit = code(exit);
        let expected = table.iter().find(|t| t.from == from && t.exit == exit).map(|t| t.to);
        prop_assert_eq!(find_next_state(&table, from, exit), expected);
    }

    #[test]
    fn exit_code_accepts_everything_outside_the_gap(raw in any::<u8>()) {
        let result = ExitCode::new(raw);
        if (6..16).contains(&raw) {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(result.map(ExitCode::raw), Ok(raw));
        }
    }

    #[test]
    fn transitions_keep_counters_consistent(requests in prop::collection::vec(0..3u8, 0..40)) {
        let clock = ManualClock::new();
        let mut machine = ring(&clock);

        for offset in requests {
            let before = machine.current_state();
            let count = machine.transition_count();

            machine.request_transition(code(offset));

            prop_assert!(machine.is_running());
            let enabled = machine.states().filter(|(id, _)| machine.is_enabled(*id)).count();
            prop_assert_eq!(enabled, 1);

            if offset < 2 {
                prop_assert_eq!(machine.transition_count(), count + 1);
                prop_assert_eq!(machine.previous_state(), before);
            } else {
                prop_assert_eq!(machine.transition_count(), count);
                prop_assert_eq!(machine.current_state(), before);
                prop_assert_eq!(
                    machine.last_fault(),
                    Some(Fault::InvalidTransition { from: before, exit: code(offset) })
                );
            }
        }
        prop_assert_eq!(machine.history().len() as u64, machine.transition_count().min(32));
    }

    #[test]
    fn silent_actions_never_change_state(steps in prop::collection::vec(0..50u64, 1..60)) {
        let clock = ManualClock::new();
        let mut machine = ring(&clock);

        for step in steps {
            clock.advance(step);
            machine.execute();
        }

        prop_assert_eq!(machine.current_state(), Some(StateId::new(0)));
        prop_assert_eq!(machine.transition_count(), 0);
        prop_assert!(machine.history().is_empty());
    }
}
