//! Provider traits for platform resources.
//!
//! A driver never talks to a GPIO controller or clock tree directly. It asks
//! a provider for a descriptor and hands the descriptor back when done.
//! Every `get`-style method that succeeds creates exactly one obligation to
//! call the matching release method.
//!
//! Providers return [`DriverError::ResourceUnavailable`] when the resource is
//! expected to appear later (the owning controller has not registered yet)
//! and another error when it never will.

use crate::error::DriverError;
use crate::gpio::GpioFlags;
use crate::of::DeviceNode;
use crate::resource::{
    ChildDevice, Clk, GpioArray, GpioDesc, I2cAdapter, IoMem, IrqNumber, MemRange, Pinctrl,
    PinctrlState, PwmDevice,
};

// ---------------------------------------------------------------------------
// PinctrlProvider
// ---------------------------------------------------------------------------

/// Pin multiplexing.
pub trait PinctrlProvider: Send + Sync {
    /// Gets the pin-control handle for `dev` and selects its `"default"`
    /// state.
    fn get_select_default(&self, dev: DeviceNode<'_>) -> Result<Pinctrl, DriverError>;

    /// Looks up a named state on a handle. States need no release.
    fn lookup_state(&self, pinctrl: Pinctrl, name: &str) -> Option<PinctrlState>;

    /// Releases a handle obtained from [`get_select_default`](Self::get_select_default).
    fn put(&self, pinctrl: Pinctrl);
}

// ---------------------------------------------------------------------------
// GpioProvider
// ---------------------------------------------------------------------------

/// GPIO line requests, keyed by consumer name (`<con_id>-gpios`).
pub trait GpioProvider: Send + Sync {
    /// Requests a single optional line. `Ok(None)` means the description
    /// does not declare it.
    fn get_optional(
        &self,
        dev: DeviceNode<'_>,
        con_id: &str,
        flags: GpioFlags,
    ) -> Result<Option<GpioDesc>, DriverError>;

    /// Requests every line declared under `con_id` as one group.
    fn get_array(
        &self,
        dev: DeviceNode<'_>,
        con_id: &str,
        flags: GpioFlags,
    ) -> Result<GpioArray, DriverError>;

    /// Releases a single line.
    fn put(&self, desc: GpioDesc);

    /// Releases a line group.
    fn put_array(&self, array: GpioArray);
}

// ---------------------------------------------------------------------------
// I2cProvider
// ---------------------------------------------------------------------------

/// I2C adapter lookup.
pub trait I2cProvider: Send + Sync {
    /// Takes a reference on adapter `nr`, or `None` if it is not registered.
    fn get_adapter(&self, nr: u32) -> Option<I2cAdapter>;

    /// Drops a reference taken with [`get_adapter`](Self::get_adapter).
    fn put_adapter(&self, adapter: I2cAdapter);
}

// ---------------------------------------------------------------------------
// MmioProvider
// ---------------------------------------------------------------------------

/// Register window mapping.
pub trait MmioProvider: Send + Sync {
    /// Maps a physical range.
    fn ioremap(&self, range: MemRange) -> Result<IoMem, DriverError>;

    /// Unmaps a window returned by [`ioremap`](Self::ioremap).
    fn iounmap(&self, mem: IoMem);
}

// ---------------------------------------------------------------------------
// IrqProvider
// ---------------------------------------------------------------------------

/// Interrupt resolution.
///
/// Resolved numbers are not reference counted and need no release.
pub trait IrqProvider: Send + Sync {
    /// Resolves the `index`-th interrupt of `dev`.
    fn of_irq_get(&self, dev: DeviceNode<'_>, index: usize) -> Result<IrqNumber, DriverError>;
}

// ---------------------------------------------------------------------------
// ClockProvider
// ---------------------------------------------------------------------------

/// Clock references and gating.
pub trait ClockProvider: Send + Sync {
    /// Gets the clock named `name` on `dev`.
    fn get(&self, dev: DeviceNode<'_>, name: &str) -> Result<Clk, DriverError>;

    /// Prepares and enables a clock.
    fn prepare_enable(&self, clk: Clk) -> Result<(), DriverError>;

    /// Undoes a successful [`prepare_enable`](Self::prepare_enable).
    fn disable_unprepare(&self, clk: Clk);

    /// Releases a reference obtained with [`get`](Self::get).
    fn put(&self, clk: Clk);
}

// ---------------------------------------------------------------------------
// PwmProvider
// ---------------------------------------------------------------------------

/// PWM channel lookup, keyed by the consumer's `pwm-names` entry.
pub trait PwmProvider: Send + Sync {
    /// Gets the channel named `con_id`.
    ///
    /// Returns [`DriverError::ResourceUnavailable`] while the PWM controller
    /// has not registered.
    fn get(&self, dev: DeviceNode<'_>, con_id: &str) -> Result<PwmDevice, DriverError>;

    /// Releases a channel.
    fn put(&self, pwm: PwmDevice);
}

// ---------------------------------------------------------------------------
// PlatformBus
// ---------------------------------------------------------------------------

/// Registration of child platform devices.
pub trait PlatformBus: Send + Sync {
    /// Registers a resource-less child device named `name`.
    fn register_simple(&self, name: &str) -> Result<ChildDevice, DriverError>;

    /// Unregisters a child device.
    fn unregister(&self, child: ChildDevice);
}
