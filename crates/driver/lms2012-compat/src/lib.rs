//! lms2012 compatibility driver.
//!
//! Binds the EV3's four input ports and four output ports to their
//! peripherals (pin-mux states, GPIO lines, I2C adapters, UARTs and PWM
//! channels) and publishes a single device instance for the lms2012
//! sub-drivers to use.
//!
//! A bind either completes or leaves nothing behind: every acquired resource
//! is registered in a [`Devres`] as soon as it exists and released exactly
//! once, in reverse acquisition order, when a later step fails or when the
//! [`BoundDevice`] is removed.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod acquire;
pub mod children;
pub mod config;
pub mod device;
pub mod devres;
pub mod driver;
pub mod error;
mod loom_compat;
pub mod port;
pub mod probe;
pub mod slot;
pub mod topology;

pub use acquire::UartBinding;
pub use children::{ChildKind, Children};
pub use device::Lms2012Device;
pub use devres::{Devres, DevresGroup, ResourceHandle, ResourceKind};
pub use driver::{DRIVER_INFO, Lms2012CompatDriver};
pub use error::{ProbeError, ProbeStep};
pub use port::{InputPort, OutputPort};
pub use probe::{BoundDevice, Probe, ProbeState};
pub use slot::{DeviceSlot, SlotClaim, SlotState};
pub use topology::Topology;
