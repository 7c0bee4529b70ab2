//! Probe errors annotated with the step that failed.

use core::fmt;

use lms_driver_api::DriverError;

use crate::config::{INPUT_CON_IDS, OUTPUT_CON_IDS};

/// A step of the probe sequence, naming the resource and port involved.
///
/// Port indices are zero-based; [`Display`](fmt::Display) renders them with
/// the port's connection id (`in1`, `outA`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStep {
    /// Reserving the device slot.
    Reserve,
    /// Validating the named topology property.
    Topology(&'static str),
    /// The ADC SPI line group.
    SpiPins,
    /// Resolving the input port node.
    InputPortNode(usize),
    /// Input port pin-mux handle and states.
    InputPinctrl(usize),
    /// Optional pin 2 line.
    InputPin2(usize),
    /// Input port line group.
    InputPins(usize),
    /// Input port I2C adapter.
    InputI2c(usize),
    /// Resolving the input port UART node.
    UartNode(usize),
    /// UART register range.
    UartResource(usize),
    /// UART register mapping.
    UartMap(usize),
    /// UART interrupt.
    UartIrq(usize),
    /// UART `clock-frequency`.
    UartClockFrequency(usize),
    /// UART functional clock.
    UartClock(usize),
    /// Enabling the UART functional clock.
    UartClockEnable(usize),
    /// Output port line group.
    OutputPins(usize),
    /// Output port PWM channel.
    OutputPwm(usize),
}

impl ProbeStep {
    /// Returns the zero-based input port index, if the step belongs to one.
    #[must_use]
    pub const fn input_port(self) -> Option<usize> {
        match self {
            Self::InputPortNode(i)
            | Self::InputPinctrl(i)
            | Self::InputPin2(i)
            | Self::InputPins(i)
            | Self::InputI2c(i)
            | Self::UartNode(i)
            | Self::UartResource(i)
            | Self::UartMap(i)
            | Self::UartIrq(i)
            | Self::UartClockFrequency(i)
            | Self::UartClock(i)
            | Self::UartClockEnable(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the zero-based output port index, if the step belongs to one.
    #[must_use]
    pub const fn output_port(self) -> Option<usize> {
        match self {
            Self::OutputPins(j) | Self::OutputPwm(j) => Some(j),
            _ => None,
        }
    }
}

fn input(f: &mut fmt::Formatter<'_>, port: usize, what: &str) -> fmt::Result {
    match INPUT_CON_IDS.get(port) {
        Some(id) => write!(f, "{id} {what}"),
        None => write!(f, "input {port} {what}"),
    }
}

fn output(f: &mut fmt::Formatter<'_>, port: usize, what: &str) -> fmt::Result {
    match OUTPUT_CON_IDS.get(port) {
        Some(id) => write!(f, "{id} {what}"),
        None => write!(f, "output {port} {what}"),
    }
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Reserve => f.write_str("device slot"),
            Self::Topology(prop) => f.write_str(prop),
            Self::SpiPins => f.write_str("spi pins"),
            Self::InputPortNode(i) => input(f, i, "port node"),
            Self::InputPinctrl(i) => input(f, i, "pinmux"),
            Self::InputPin2(i) => input(f, i, "pin2"),
            Self::InputPins(i) => input(f, i, "pins"),
            Self::InputI2c(i) => input(f, i, "i2c adapter"),
            Self::UartNode(i) => input(f, i, "uart"),
            Self::UartResource(i) => input(f, i, "uart resource"),
            Self::UartMap(i) => input(f, i, "uart memory"),
            Self::UartIrq(i) => input(f, i, "uart irq"),
            Self::UartClockFrequency(i) => input(f, i, "uart clock frequency"),
            Self::UartClock(i) => input(f, i, "uart clock"),
            Self::UartClockEnable(i) => input(f, i, "uart clock enable"),
            Self::OutputPins(j) => output(f, j, "pins"),
            Self::OutputPwm(j) => output(f, j, "pwm"),
        }
    }
}

/// A failed probe: the error kind plus the step it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeError {
    kind: DriverError,
    step: ProbeStep,
}

impl ProbeError {
    /// Creates a new probe error.
    #[must_use]
    pub const fn new(step: ProbeStep, kind: DriverError) -> Self {
        Self { kind, step }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> DriverError {
        self.kind
    }

    /// Returns the step that failed.
    #[must_use]
    pub const fn step(&self) -> ProbeStep {
        self.step
    }

    /// Returns `true` if re-running the whole probe later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns the negative errno for the invoking framework.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        self.kind.errno()
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.kind)
    }
}

impl core::error::Error for ProbeError {}

impl From<ProbeError> for DriverError {
    fn from(err: ProbeError) -> Self {
        err.kind
    }
}

/// Builds a [`ProbeError`] and logs it.
///
/// A PWM channel whose controller has not registered yet is expected during
/// boot and is not logged.
pub(crate) fn report(step: ProbeStep, kind: DriverError) -> ProbeError {
    if !(matches!(step, ProbeStep::OutputPwm(_)) && kind.is_retryable()) {
        log::error!("Could not get {step}: {kind}");
    }
    ProbeError::new(step, kind)
}

/// Maps a provider error to the kind reported for a non-deferrable resource.
///
/// Description problems keep their kind; anything else is an acquisition
/// failure.
pub(crate) const fn permanent(err: DriverError) -> DriverError {
    match err {
        DriverError::ConfigMismatch => DriverError::ConfigMismatch,
        _ => DriverError::AcquisitionFailure,
    }
}
