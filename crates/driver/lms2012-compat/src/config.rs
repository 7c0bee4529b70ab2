//! Topology constants and the names used against the device description.
//!
//! The EV3 has four sensor input ports (`in1`..`in4`) and four motor output
//! ports (`outA`..`outD`). The connection id tables below are sized by the
//! port constants, so changing a port count without updating its names fails
//! to compile.

/// Number of input ports.
pub const INPUTS: usize = 4;
/// Number of output ports.
pub const OUTPUTS: usize = 4;
/// GPIO lines per input port.
pub const INPUT_PORT_PINS: usize = 5;
/// GPIO lines per output port.
pub const OUTPUT_PORT_PINS: usize = 5;
/// GPIO lines of the ADC's SPI interface.
pub const ADC_SPI_PINS: usize = 4;
/// Entries in the ADC channel map.
pub const INPUT_ADC: usize = 8;

/// Driver name.
pub const DRIVER_NAME: &str = "lms2012-compat";
/// `compatible` string of the device node this driver binds to.
pub const COMPATIBLE: &str = "ev3dev,lms2012-compat";

/// Property names read from the device node and the nodes it references.
pub mod prop {
    /// Phandle list of the input port nodes.
    pub const IN_PORTS: &str = "in-in-ports";
    /// Argument count of an `in-in-ports` entry.
    pub const IN_PORT_CELLS: &str = "#in-port-cells";
    /// ADC channel map.
    pub const ADC_CHANNELS: &str = "adc-channels";
    /// I2C bus number per input port.
    pub const IN_I2CS: &str = "in-i2cs";
    /// Phandle list of the input port UARTs.
    pub const IN_UARTS: &str = "in-uarts";
    /// Argument count of an `in-uarts` entry.
    pub const UART_CELLS: &str = "#uart-cells";
    /// UART input clock rate in Hz.
    pub const CLOCK_FREQUENCY: &str = "clock-frequency";
    /// Names of the PWM channels, one per output port.
    pub const PWM_NAMES: &str = "pwm-names";
}

/// GPIO connection id of the ADC SPI lines.
pub const SPI_CON_ID: &str = "spi";
/// Clock name of a UART's functional clock.
pub const UART_CLOCK: &str = "fck";
/// Pin-mux state selected while a port is idle.
pub const PINCTRL_DEFAULT: &str = "default";
/// Pin-mux state routing a port's pins to its I2C controller.
pub const PINCTRL_I2C: &str = "i2c";

/// GPIO connection ids of the input port line groups.
pub const INPUT_CON_IDS: [&str; INPUTS] = ["in1", "in2", "in3", "in4"];
/// GPIO connection ids of the optional input port pin 2 lines.
pub const INPUT_PIN2_CON_IDS: [&str; INPUTS] = ["in1-pin2", "in2-pin2", "in3-pin2", "in4-pin2"];
/// Connection ids of the output ports, for both GPIO groups and PWM channels.
pub const OUTPUT_CON_IDS: [&str; OUTPUTS] = ["outA", "outB", "outC", "outD"];
