//! Topology validation.
//!
//! Checks that the device description declares the fixed EV3 topology before
//! any peripheral is touched. Validation only reads the description.

use lms_driver_api::{DeviceNode, DriverError, OfError, gpio};

use crate::config::{ADC_SPI_PINS, INPUT_ADC, INPUTS, OUTPUTS, SPI_CON_ID, prop};
use crate::error::{ProbeError, ProbeStep, report};

/// Plain data read from the description during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    /// ADC channel of each analog input.
    pub adc_map: [u32; INPUT_ADC],
    /// I2C bus number of each input port.
    pub i2c_buses: [u32; INPUTS],
}

/// Requires `count` to equal `expected`; lookup errors count as a mismatch.
fn expect_count(
    name: &'static str,
    count: Result<usize, OfError>,
    expected: usize,
) -> Result<(), ProbeError> {
    match count {
        Ok(n) if n == expected => Ok(()),
        Ok(n) => {
            log::error!("Incorrect number of {name} ({n}, expected {expected})");
            Err(ProbeError::new(
                ProbeStep::Topology(name),
                DriverError::ConfigMismatch,
            ))
        }
        Err(err) => Err(report(ProbeStep::Topology(name), err.into())),
    }
}

fn read_array<const N: usize>(dev: DeviceNode<'_>, name: &'static str) -> Result<[u32; N], ProbeError> {
    let mut out = [0; N];
    dev.read_u32_array(name, &mut out)
        .map_err(|err| report(ProbeStep::Topology(name), err.into()))?;
    Ok(out)
}

/// Validates the topology declared by `dev`.
///
/// # Errors
///
/// Returns [`DriverError::ConfigMismatch`] if any of these differ from the
/// port constants or cannot be read:
///
/// - the `in-in-ports` entry count,
/// - the `adc-channels` length,
/// - the `spi` GPIO line count,
/// - the `in-uarts` entry count,
/// - the `in-i2cs` length,
/// - the `pwm-names` count.
pub fn validate(dev: DeviceNode<'_>) -> Result<Topology, ProbeError> {
    expect_count(
        prop::IN_PORTS,
        dev.count_phandle_with_args(prop::IN_PORTS, prop::IN_PORT_CELLS),
        INPUTS,
    )?;
    expect_count(
        prop::ADC_CHANNELS,
        dev.count_u32_elems(prop::ADC_CHANNELS),
        INPUT_ADC,
    )?;
    expect_count("spi-gpios", gpio::count(dev, SPI_CON_ID), ADC_SPI_PINS)?;
    expect_count(
        prop::IN_UARTS,
        dev.count_phandle_with_args(prop::IN_UARTS, prop::UART_CELLS),
        INPUTS,
    )?;
    expect_count(prop::IN_I2CS, dev.count_u32_elems(prop::IN_I2CS), INPUTS)?;
    expect_count(prop::PWM_NAMES, dev.count_strings(prop::PWM_NAMES), OUTPUTS)?;

    Ok(Topology {
        adc_map: read_array(dev, prop::ADC_CHANNELS)?,
        i2c_buses: read_array(dev, prop::IN_I2CS)?,
    })
}
