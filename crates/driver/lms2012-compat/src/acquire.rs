//! Per-resource acquire helpers.
//!
//! Each helper acquires one resource through the probe context, registers it
//! in the caller's group as soon as it exists, and returns its descriptor.
//! A helper made of several sub-steps releases its own partial work if a
//! later sub-step fails.

use lms_driver_api::{
    Clk, DeviceNode, DriverError, GpioArray, GpioDesc, GpioFlags, I2cAdapter, IoMem, IrqNumber,
    Pinctrl, ProbeContext, PwmDevice,
};

use crate::config::{UART_CLOCK, prop};
use crate::devres::{DevresGroup, ResourceHandle};
use crate::error::{ProbeError, ProbeStep, permanent, report};

/// Pin-control handle of `node` with its default state selected.
pub(crate) fn pinctrl(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    node: DeviceNode<'_>,
    step: ProbeStep,
) -> Result<Pinctrl, ProbeError> {
    let pinctrl = ctx
        .pinctrl
        .get_select_default(node)
        .map_err(|err| report(step, permanent(err)))?;
    group.register(step, ResourceHandle::Pinctrl(ctx.pinctrl.clone(), pinctrl));
    Ok(pinctrl)
}

/// Optional single GPIO line; `None` if the description omits it.
pub(crate) fn optional_gpio(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    con_id: &str,
    step: ProbeStep,
) -> Result<Option<GpioDesc>, ProbeError> {
    let desc = ctx
        .gpio
        .get_optional(dev, con_id, GpioFlags::ASIS)
        .map_err(|err| report(step, permanent(err)))?;
    if let Some(desc) = desc {
        group.register(step, ResourceHandle::Gpio(ctx.gpio.clone(), desc));
    }
    Ok(desc)
}

/// GPIO group `con_id`, which must have exactly `width` lines.
pub(crate) fn gpio_array(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    con_id: &str,
    width: usize,
    step: ProbeStep,
) -> Result<GpioArray, ProbeError> {
    let array = ctx
        .gpio
        .get_array(dev, con_id, GpioFlags::ASIS)
        .map_err(|err| report(step, permanent(err)))?;
    group.register(step, ResourceHandle::GpioArray(ctx.gpio.clone(), array));
    if array.ndescs() != width {
        log::error!(
            "Incorrect number of {con_id} pins ({}, expected {width})",
            array.ndescs()
        );
        return Err(ProbeError::new(step, DriverError::ConfigMismatch));
    }
    Ok(array)
}

/// Reference on I2C adapter `nr`. An adapter that has not registered yet is
/// retryable.
pub(crate) fn i2c_adapter(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    nr: u32,
    step: ProbeStep,
) -> Result<I2cAdapter, ProbeError> {
    let adapter = ctx
        .i2c
        .get_adapter(nr)
        .ok_or_else(|| report(step, DriverError::ResourceUnavailable))?;
    group.register(step, ResourceHandle::I2cAdapter(ctx.i2c.clone(), adapter));
    Ok(adapter)
}

/// Everything an input port needs from its UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartBinding {
    /// Mapped register window.
    pub mem: IoMem,
    /// Interrupt number.
    pub irq: IrqNumber,
    /// Enabled functional clock.
    pub clock: Clk,
    /// Functional clock rate in Hz.
    pub clock_freq: u32,
}

/// Maps, resolves and clocks the UART described by `uart` for port `port`.
pub(crate) fn uart(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    uart: DeviceNode<'_>,
    port: usize,
) -> Result<UartBinding, ProbeError> {
    let range = uart
        .address_to_resource(0)
        .map_err(|err| report(ProbeStep::UartResource(port), err.into()))?;

    let mem = ctx
        .mmio
        .ioremap(range)
        .map_err(|err| report(ProbeStep::UartMap(port), permanent(err)))?;
    group.register(
        ProbeStep::UartMap(port),
        ResourceHandle::IoMem(ctx.mmio.clone(), mem),
    );

    let irq = ctx
        .irq
        .of_irq_get(uart, 0)
        .map_err(|err| report(ProbeStep::UartIrq(port), permanent(err)))?;

    let clock_freq = uart
        .read_u32(prop::CLOCK_FREQUENCY)
        .map_err(|err| report(ProbeStep::UartClockFrequency(port), err.into()))?;

    let clock = enabled_clock(ctx, uart, port)?;
    group.register(
        ProbeStep::UartClock(port),
        ResourceHandle::Clock(ctx.clk.clone(), clock),
    );

    Ok(UartBinding {
        mem,
        irq,
        clock,
        clock_freq,
    })
}

/// Gets and enables the UART's functional clock, putting the reference back
/// if enabling fails.
fn enabled_clock(ctx: &ProbeContext, uart: DeviceNode<'_>, port: usize) -> Result<Clk, ProbeError> {
    let clk = ctx
        .clk
        .get(uart, UART_CLOCK)
        .map_err(|err| report(ProbeStep::UartClock(port), permanent(err)))?;
    if let Err(err) = ctx.clk.prepare_enable(clk) {
        ctx.clk.put(clk);
        return Err(report(ProbeStep::UartClockEnable(port), permanent(err)));
    }
    Ok(clk)
}

/// PWM channel `con_id`. A PWM controller that has not registered yet is
/// retryable and not logged.
pub(crate) fn pwm(
    group: &mut DevresGroup<'_>,
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    con_id: &str,
    step: ProbeStep,
) -> Result<PwmDevice, ProbeError> {
    let pwm = ctx.pwm.get(dev, con_id).map_err(|err| {
        let kind = match err {
            DriverError::ResourceUnavailable => DriverError::ResourceUnavailable,
            other => permanent(other),
        };
        report(step, kind)
    })?;
    group.register(step, ResourceHandle::Pwm(ctx.pwm.clone(), pwm));
    Ok(pwm)
}
