//! Probe context for platform drivers.
//!
//! The platform constructs a [`ProbeContext`] with every provider a driver
//! may request resources from, then passes it to the driver's probe and
//! keeps it alive for as long as the bound instance exists.

use alloc::sync::Arc;

use crate::provider::{
    ClockProvider, GpioProvider, I2cProvider, IrqProvider, MmioProvider, PinctrlProvider,
    PlatformBus, PwmProvider,
};

/// The set of providers available to a probing driver.
///
/// Providers are shared handles so that the driver's release registry can
/// keep the provider of each claim alive until the claim is released.
#[derive(Clone)]
pub struct ProbeContext {
    /// Pin multiplexing.
    pub pinctrl: Arc<dyn PinctrlProvider>,
    /// GPIO lines.
    pub gpio: Arc<dyn GpioProvider>,
    /// I2C adapters.
    pub i2c: Arc<dyn I2cProvider>,
    /// Register window mapping.
    pub mmio: Arc<dyn MmioProvider>,
    /// Interrupt resolution.
    pub irq: Arc<dyn IrqProvider>,
    /// Clocks.
    pub clk: Arc<dyn ClockProvider>,
    /// PWM channels.
    pub pwm: Arc<dyn PwmProvider>,
    /// Child device registration.
    pub bus: Arc<dyn PlatformBus>,
}

impl ProbeContext {
    /// Builds a context where one object provides every resource kind.
    pub fn from_platform<P>(platform: &Arc<P>) -> Self
    where
        P: PinctrlProvider
            + GpioProvider
            + I2cProvider
            + MmioProvider
            + IrqProvider
            + ClockProvider
            + PwmProvider
            + PlatformBus
            + 'static,
    {
        Self {
            pinctrl: platform.clone(),
            gpio: platform.clone(),
            i2c: platform.clone(),
            mmio: platform.clone(),
            irq: platform.clone(),
            clk: platform.clone(),
            pwm: platform.clone(),
            bus: platform.clone(),
        }
    }
}
