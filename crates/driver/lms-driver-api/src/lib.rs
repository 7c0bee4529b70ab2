//! Driver-facing API for the lms2012 compatibility layer.
//!
//! This crate defines everything a driver needs to bind to platform
//! peripherals without knowing who implements them:
//!
//! - **Layer 0** -- Resource descriptors ([`GpioArray`], [`IoMem`], [`Clk`], ...)
//!   naming one acquired peripheral.
//! - **Layer 1** -- Provider traits ([`GpioProvider`], [`PwmProvider`], ...) that
//!   hand out and take back those descriptors.
//! - **Layer 2** -- [`ProbeContext`], the bundle of providers a driver receives,
//!   and the [`PlatformDriver`] trait describing probe and remove.
//! - **Configuration** -- [`of::DeviceTree`], the device description a driver
//!   reads its topology from.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod driver;
pub mod error;
pub mod gpio;
pub mod of;
pub mod probe_context;
pub mod provider;
pub mod resource;

// Re-export all public types at the crate root for ergonomic imports.
pub use driver::{DriverInfo, PlatformDriver};
pub use error::DriverError;
pub use gpio::GpioFlags;
pub use of::{DeviceNode, DeviceTree, NodeId, OfError};
pub use probe_context::ProbeContext;
pub use provider::{
    ClockProvider, GpioProvider, I2cProvider, IrqProvider, MmioProvider, PinctrlProvider,
    PlatformBus, PwmProvider,
};
pub use resource::{
    ChildDevice, Clk, GpioArray, GpioDesc, I2cAdapter, IoMem, IrqNumber, MemRange, Pinctrl,
    PinctrlState, PwmDevice,
};
