//! coop-fsm: a cooperative finite-state-machine engine for single-threaded
//! control loops.
//!
//! Each state of a machine owns an [`Action`](core::Action) and a scheduling
//! [`Cadence`](core::Cadence). Only the active state is enabled in the
//! scheduler; the control loop calls [`Machine::execute`](engine::Machine::execute)
//! repeatedly, and the active action requests exits that the machine resolves
//! through a static transition table.
//!
//! # Core Concepts
//!
//! - **Exit codes**: small integers with reserved kinds (`COMPLETE`,
//!   `TIMEOUT`, ...) and a user range starting at `USER`
//! - **Devices**: shared hardware handles with a begin/start/stop lifecycle
//! - **Actions**: enter, run and exit hooks that talk to the machine through
//!   an [`ActionContext`](core::ActionContext)
//! - **Scheduler**: black-box cooperative timing behind the
//!   [`Scheduler`](scheduler::Scheduler) trait
//! - **Snapshots**: serializable, read-only diagnostics of a running machine
//!
//! # Example
//!
//! ```rust
//! use coop_fsm::builder::MachineBuilder;
//! use coop_fsm::core::{Action, ActionContext, ExitCode, State};
//! use coop_fsm::scheduler::ManualClock;
//! use coop_fsm::transition_table;
//!
//! const PRESS: ExitCode = ExitCode::USER;
//!
//! struct WaitForPress {
//!     presses: u32,
//! }
//!
//! impl Action for WaitForPress {
//!     fn name(&self) -> &str {
//!         "wait-for-press"
//!     }
//!
//!     fn on_run(&mut self, ctx: &mut ActionContext<'_>) -> bool {
//!         self.presses += 1;
//!         if self.presses % 3 == 0 {
//!             ctx.request_exit(PRESS);
//!         }
//!         true
//!     }
//! }
//!
//! let clock = ManualClock::new();
//! let mut machine = MachineBuilder::new()
//!     .state(State::new("OFF", WaitForPress { presses: 0 }))
//!     .state(State::new("ON", WaitForPress { presses: 0 }).timeout_ms(5000))
//!     .transitions(transition_table! {
//!         "OFF" => PRESS => "ON",
//!         "ON" => PRESS => "OFF",
//!         "ON" => ExitCode::TIMEOUT => "OFF",
//!     })
//!     .clock(clock.clone())
//!     .build()
//!     .unwrap();
//!
//! machine.begin().unwrap();
//! machine.start(machine.state_id("OFF").unwrap()).unwrap();
//!
//! for _ in 0..3 {
//!     clock.advance(1);
//!     machine.execute();
//! }
//! assert_eq!(machine.current().map(|s| s.name()), Some("ON"));
//!
//! clock.advance(5001);
//! machine.execute();
//! assert_eq!(machine.current().map(|s| s.name()), Some("OFF"));
//! assert_eq!(machine.history().path(), vec!["OFF", "ON", "OFF"]);
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod scheduler;
pub mod snapshot;

pub use crate::builder::{MachineBuilder, TransitionSpec};
pub use crate::core::{Action, ActionContext, Device, DeviceState, ExitCode, State};
pub use crate::engine::{Machine, StateId};
pub use crate::snapshot::MachineSnapshot;
