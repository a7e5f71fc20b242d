//! LED Mode Cycle
//!
//! This example drives a simulated indicator light through four modes with
//! a push button, the way a microcontroller main loop would.
//!
//! Key concepts:
//! - Devices shared between several actions
//! - Per-state cadence (blink rates) and timeout (ON auto-exits after 5s)
//! - Transition table written with `transition_table!`
//! - Diagnostic snapshot at the end
//!
//! Run with: cargo run --example led_cycle
//! Set RUST_LOG=coop_fsm=debug to see every transition.

use coop_fsm::builder::MachineBuilder;
use coop_fsm::core::{Action, ActionContext, Device, DeviceHandle, DeviceState, ExitCode, State};
use coop_fsm::scheduler::ManualClock;
use coop_fsm::transition_table;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const BTN: ExitCode = ExitCode::USER;

/// Millisecond offsets at which the simulated button is pressed.
const PRESSES: [u64; 6] = [200, 900, 2400, 3100, 4000, 12_000];

struct Led {
    state: DeviceState,
    lit: bool,
}

impl Led {
    fn set(&mut self, lit: bool) {
        if self.lit != lit {
            self.lit = lit;
            println!("  LED {}", if lit { "*" } else { "." });
        }
    }
}

impl Device for Led {
    fn name(&self) -> &str {
        "led"
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn begin(&mut self) -> bool {
        true
    }

    fn start(&mut self) -> bool {
        self.state = DeviceState::On;
        self.set(true);
        true
    }

    fn stop(&mut self) {
        self.state = DeviceState::Off;
        self.set(false);
    }
}

/// Edge-triggered button fed by the simulation loop.
struct Button {
    state: DeviceState,
    pressed: bool,
}

impl Device for Button {
    fn name(&self) -> &str {
        "button"
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn begin(&mut self) -> bool {
        true
    }

    fn start(&mut self) -> bool {
        self.state = DeviceState::On;
        true
    }

    fn stop(&mut self) {
        self.state = DeviceState::Off;
    }
}

enum Pattern {
    Dark,
    Solid,
    Blink,
}

struct LedMode {
    name: &'static str,
    pattern: Pattern,
    led: Rc<RefCell<Led>>,
    button: Rc<RefCell<Button>>,
    devices: Vec<DeviceHandle>,
}

impl LedMode {
    fn new(
        name: &'static str,
        pattern: Pattern,
        led: &Rc<RefCell<Led>>,
        button: &Rc<RefCell<Button>>,
    ) -> Self {
        Self {
            name,
            pattern,
            led: Rc::clone(led),
            button: Rc::clone(button),
            devices: vec![
                Rc::clone(led) as DeviceHandle,
                Rc::clone(button) as DeviceHandle,
            ],
        }
    }
}

impl Action for LedMode {
    fn name(&self) -> &str {
        self.name
    }

    fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        println!("[{:>6} ms] >> {}", ctx.now_ms(), ctx.state_name());
        match self.pattern {
            Pattern::Dark => self.led.borrow_mut().stop(),
            Pattern::Solid | Pattern::Blink => {
                self.led.borrow_mut().start();
            }
        }
    }

    fn on_run(&mut self, ctx: &mut ActionContext<'_>) -> bool {
        if std::mem::take(&mut self.button.borrow_mut().pressed) {
            ctx.request_exit(BTN);
            return true;
        }
        if let Pattern::Blink = self.pattern {
            let mut led = self.led.borrow_mut();
            let lit = !led.lit;
            led.set(lit);
            return true;
        }
        false
    }

    fn on_exit(&mut self, ctx: &mut ActionContext<'_>) {
        println!(
            "[{:>6} ms] << {} after {} ms (exit {})",
            ctx.now_ms(),
            ctx.state_name(),
            ctx.elapsed_ms(),
            ctx.exit_code()
        );
    }
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "coop_fsm=info".parse() {
        filter = filter.add_directive(directive);
    }
    fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    println!("=== LED Mode Cycle ===\n");

    let led = Rc::new(RefCell::new(Led {
        state: DeviceState::Off,
        lit: false,
    }));
    let button = Rc::new(RefCell::new(Button {
        state: DeviceState::Off,
        pressed: false,
    }));
    let clock = ManualClock::new();

    let mut machine = MachineBuilder::new()
        .state(State::new("OFF", LedMode::new("off", Pattern::Dark, &led, &button)).interval_ms(10))
        .state(
            State::new("ON", LedMode::new("on", Pattern::Solid, &led, &button))
                .interval_ms(10)
                .timeout_ms(5000),
        )
        .state(State::new("BLINK_SLOW", LedMode::new("blink-slow", Pattern::Blink, &led, &button)).interval_ms(500))
        .state(State::new("BLINK_FAST", LedMode::new("blink-fast", Pattern::Blink, &led, &button)).interval_ms(100))
        .transitions(transition_table! {
            "OFF" => BTN => "ON",
            "ON" => BTN => "BLINK_SLOW",
            "ON" => ExitCode::TIMEOUT => "OFF",
            "BLINK_SLOW" => BTN => "BLINK_FAST",
            "BLINK_FAST" => BTN => "OFF",
        })
        .clock(clock.clone())
        .build()?;

    machine.begin()?;
    let off = machine.state_id("OFF").ok_or("OFF state missing")?;
    machine.start(off)?;

    let mut presses = PRESSES.iter().peekable();
    for now in 0..=14_000u64 {
        clock.set(now);
        if presses.next_if(|at| **at == now).is_some() {
            info!(now_ms = now, "button pressed");
            button.borrow_mut().pressed = true;
        }
        machine.execute();
    }

    println!("\nTransitions: {}", machine.transition_count());
    println!("Path: {}", machine.history().path().join(" -> "));

    machine.end();

    println!("\nFinal snapshot:");
    println!("{}", machine.snapshot().to_json()?);

    println!("\n=== Example Complete ===");
    Ok(())
}
