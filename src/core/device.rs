//! Capability contract for hardware driven by actions.
//!
//! Devices are created once at setup and live for the whole process. The
//! same device is commonly referenced by several actions (one LED shared by
//! the "off", "on" and "blink" behaviours), so actions hold a shared handle
//! rather than owning the device.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Lifecycle of a device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    #[default]
    Off,
    On,
    Starting,
    Stopping,
}

/// A piece of hardware with an on/off lifecycle.
///
/// Concrete drivers own all hardware-specific failure semantics; the engine
/// only sees boolean success from [`begin`](Device::begin) and
/// [`start`](Device::start).
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{Device, DeviceState};
///
/// struct Relay {
///     state: DeviceState,
/// }
///
/// impl Device for Relay {
///     fn name(&self) -> &str {
///         "relay"
///     }
///
///     fn state(&self) -> DeviceState {
///         self.state
///     }
///
///     fn begin(&mut self) -> bool {
///         true
///     }
///
///     fn start(&mut self) -> bool {
///         self.state = DeviceState::On;
///         true
///     }
///
///     fn stop(&mut self) {
///         self.state = DeviceState::Off;
///     }
/// }
///
/// let mut relay = Relay { state: DeviceState::Off };
/// relay.start();
/// relay.end();
/// assert_eq!(relay.state(), DeviceState::Off);
/// ```
pub trait Device {
    /// Name used for logging and identification.
    fn name(&self) -> &str;

    fn state(&self) -> DeviceState;

    /// Acquire and initialise the hardware. Must be idempotent.
    fn begin(&mut self) -> bool;

    /// Activate the device; sets the lifecycle to [`DeviceState::On`].
    fn start(&mut self) -> bool;

    /// Deactivate the device; sets the lifecycle to [`DeviceState::Off`].
    fn stop(&mut self);

    /// Release the hardware. Stops the device first.
    fn end(&mut self) {
        self.stop();
    }
}

/// Shared, non-thread-safe handle to a device.
pub type DeviceHandle = Rc<RefCell<dyn Device>>;

/// Wrap a device for sharing between actions.
///
/// The typed handle keeps the concrete API available to the action that
/// built it and coerces to a [`DeviceHandle`] for the engine.
pub fn shared<D: Device + 'static>(device: D) -> Rc<RefCell<D>> {
    Rc::new(RefCell::new(device))
}
