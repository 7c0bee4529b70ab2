//! Input and output port binders.
//!
//! A binder acquires the full resource set of one port inside a
//! [`DevresGroup`]. On failure the group releases what this port acquired and
//! the error is returned unchanged; resources of earlier ports stay with the
//! caller.

use lms_driver_api::{
    DeviceNode, DriverError, GpioArray, GpioDesc, I2cAdapter, Pinctrl, PinctrlState,
    ProbeContext, PwmDevice,
};

use crate::acquire::{self, UartBinding};
use crate::config::{
    INPUT_CON_IDS, INPUT_PIN2_CON_IDS, INPUT_PORT_PINS, OUTPUT_CON_IDS, OUTPUT_PORT_PINS,
    PINCTRL_DEFAULT, PINCTRL_I2C, prop,
};
use crate::devres::Devres;
use crate::error::{ProbeError, ProbeStep, report};
use crate::topology::Topology;

/// Resources bound to one input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPort {
    /// Pin-mux handle of the port node.
    pub pinctrl: Pinctrl,
    /// State routing the port pins to GPIO.
    pub pinctrl_default: PinctrlState,
    /// State routing the port pins to the I2C controller, if declared.
    pub pinctrl_i2c: Option<PinctrlState>,
    /// Pin 2 line, if declared.
    pub pin2: Option<GpioDesc>,
    /// Port line group.
    pub pins: GpioArray,
    /// I2C adapter behind the port.
    pub i2c_adapter: I2cAdapter,
    /// UART behind the port.
    pub uart: UartBinding,
}

/// Resources bound to one output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPort {
    /// Port line group.
    pub pins: GpioArray,
    /// Motor PWM channel.
    pub pwm: PwmDevice,
}

/// Binds input port `port` of `dev`.
///
/// Order: port node, pin-mux, pin 2, line group, I2C adapter, UART.
///
/// # Errors
///
/// Returns the first failure; nothing acquired for this port remains in
/// `devres`.
pub fn bind_input_port(
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    port: usize,
    topology: &Topology,
    devres: &mut Devres,
) -> Result<InputPort, ProbeError> {
    let mut group = devres.open_group();

    let node = dev
        .parse_phandle_with_args(prop::IN_PORTS, prop::IN_PORT_CELLS, port)
        .map_err(|err| report(ProbeStep::InputPortNode(port), err.into()))?
        .node;

    let step = ProbeStep::InputPinctrl(port);
    let pinctrl = acquire::pinctrl(&mut group, ctx, node, step)?;
    let pinctrl_default = ctx
        .pinctrl
        .lookup_state(pinctrl, PINCTRL_DEFAULT)
        .ok_or_else(|| report(step, DriverError::ConfigMismatch))?;
    let pinctrl_i2c = ctx.pinctrl.lookup_state(pinctrl, PINCTRL_I2C);

    let pin2 = acquire::optional_gpio(
        &mut group,
        ctx,
        dev,
        INPUT_PIN2_CON_IDS[port],
        ProbeStep::InputPin2(port),
    )?;
    let pins = acquire::gpio_array(
        &mut group,
        ctx,
        dev,
        INPUT_CON_IDS[port],
        INPUT_PORT_PINS,
        ProbeStep::InputPins(port),
    )?;
    let i2c_adapter = acquire::i2c_adapter(
        &mut group,
        ctx,
        topology.i2c_buses[port],
        ProbeStep::InputI2c(port),
    )?;

    let uart_node = dev
        .parse_phandle_with_args(prop::IN_UARTS, prop::UART_CELLS, port)
        .map_err(|err| report(ProbeStep::UartNode(port), err.into()))?
        .node;
    let uart = acquire::uart(&mut group, ctx, uart_node, port)?;

    group.close();
    Ok(InputPort {
        pinctrl,
        pinctrl_default,
        pinctrl_i2c,
        pin2,
        pins,
        i2c_adapter,
        uart,
    })
}

/// Binds output port `port` of `dev`: line group, then PWM channel.
///
/// # Errors
///
/// Returns the first failure; nothing acquired for this port remains in
/// `devres`.
pub fn bind_output_port(
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    port: usize,
    devres: &mut Devres,
) -> Result<OutputPort, ProbeError> {
    let mut group = devres.open_group();
    let con_id = OUTPUT_CON_IDS[port];

    let pins = acquire::gpio_array(
        &mut group,
        ctx,
        dev,
        con_id,
        OUTPUT_PORT_PINS,
        ProbeStep::OutputPins(port),
    )?;
    let pwm = acquire::pwm(&mut group, ctx, dev, con_id, ProbeStep::OutputPwm(port))?;

    group.close();
    Ok(OutputPort { pins, pwm })
}
