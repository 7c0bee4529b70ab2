//! EV3 device description builder.

use lms_driver_api::{DeviceTree, NodeId, gpio::GPIO_CELLS};

/// I2C bus number behind each input port.
pub const EV3_I2C_BUSES: [u32; 4] = [3, 4, 5, 6];
/// ADC channel map.
pub const EV3_ADC_CHANNELS: [u32; 8] = [6, 5, 7, 4, 9, 3, 10, 2];
/// Register base of each input port UART.
pub const EV3_UART_BASES: [u64; 4] = [0x01d0_c000, 0x01d0_d000, 0x01f0_e000, 0x01f0_f000];
/// Interrupt of each input port UART.
pub const EV3_UART_IRQS: [u32; 4] = [53, 61, 69, 91];
/// UART functional clock rate.
pub const EV3_UART_CLOCK_HZ: u32 = 150_000_000;

const PORTS: usize = 4;
const OUTPUT_NAMES: [&str; PORTS] = ["outA", "outB", "outC", "outD"];

const GPIO_PHANDLE: u32 = 1;
const PWM_PHANDLE: u32 = 2;
const PORT_PHANDLE_BASE: u32 = 0x10;
const UART_PHANDLE_BASE: u32 = 0x20;

/// Builder for an EV3 `ev3dev,lms2012-compat` description.
///
/// The defaults describe a correct board; each knob breaks one aspect of it.
///
/// ```text
/// / {
///     soc {
///         gpio@1e26000 { #gpio-cells = <2>; };
///         in-port1 .. in-port4 { pinctrl-names = "default", "i2c"; };
///         serial@1d0c000 .. { reg, interrupts, clock-frequency, clock-names = "fck"; };
///         ehrpwm@1f00000 { #pwm-cells = <2>; };
///     };
///     lms2012 {
///         compatible = "ev3dev,lms2012-compat";
///         in-in-ports, adc-channels, spi-gpios, inN-pin2-gpios, inN-gpios,
///         in-i2cs, in-uarts, outX-gpios, pwms, pwm-names;
///     };
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Ev3TreeBuilder {
    in_ports: usize,
    adc_channels: Vec<u32>,
    spi_pins: usize,
    input_pins: [usize; PORTS],
    output_pins: [usize; PORTS],
    pin2: [bool; PORTS],
    default_state: [bool; PORTS],
    i2c_state: [bool; PORTS],
    clock_frequency: [bool; PORTS],
    i2c_buses: Vec<u32>,
    uarts: usize,
    outputs: usize,
}

impl Default for Ev3TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Ev3TreeBuilder {
    /// Starts from a correct EV3 description.
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_ports: PORTS,
            adc_channels: EV3_ADC_CHANNELS.to_vec(),
            spi_pins: 4,
            input_pins: [5; PORTS],
            output_pins: [5; PORTS],
            pin2: [true; PORTS],
            default_state: [true; PORTS],
            i2c_state: [true; PORTS],
            clock_frequency: [true; PORTS],
            i2c_buses: EV3_I2C_BUSES.to_vec(),
            uarts: PORTS,
            outputs: PORTS,
        }
    }

    /// Lists only the first `n` input port nodes in `in-in-ports` (at most 4).
    #[must_use]
    pub fn in_ports(mut self, n: usize) -> Self {
        self.in_ports = n;
        self
    }

    /// Replaces the ADC channel map.
    #[must_use]
    pub fn adc_channels(mut self, channels: &[u32]) -> Self {
        self.adc_channels = channels.to_vec();
        self
    }

    /// Declares `n` SPI lines.
    #[must_use]
    pub fn spi_pins(mut self, n: usize) -> Self {
        self.spi_pins = n;
        self
    }

    /// Declares `n` lines for input port `port`.
    #[must_use]
    pub fn input_pins(mut self, port: usize, n: usize) -> Self {
        self.input_pins[port] = n;
        self
    }

    /// Declares `n` lines for output port `port`.
    #[must_use]
    pub fn output_pins(mut self, port: usize, n: usize) -> Self {
        self.output_pins[port] = n;
        self
    }

    /// Omits the pin 2 line of input port `port`.
    #[must_use]
    pub fn without_pin2(mut self, port: usize) -> Self {
        self.pin2[port] = false;
        self
    }

    /// Omits the `"default"` pin-mux state of input port `port`.
    #[must_use]
    pub fn without_default_state(mut self, port: usize) -> Self {
        self.default_state[port] = false;
        self
    }

    /// Omits the `"i2c"` pin-mux state of input port `port`.
    #[must_use]
    pub fn without_i2c_state(mut self, port: usize) -> Self {
        self.i2c_state[port] = false;
        self
    }

    /// Omits `clock-frequency` on the UART of input port `port`.
    #[must_use]
    pub fn without_clock_frequency(mut self, port: usize) -> Self {
        self.clock_frequency[port] = false;
        self
    }

    /// Replaces the I2C bus numbers.
    #[must_use]
    pub fn i2c_buses(mut self, buses: &[u32]) -> Self {
        self.i2c_buses = buses.to_vec();
        self
    }

    /// Lists only the first `n` UARTs in `in-uarts` (at most 4).
    #[must_use]
    pub fn uarts(mut self, n: usize) -> Self {
        self.uarts = n;
        self
    }

    /// Declares `n` output ports in `pwm-names` (at most 4).
    #[must_use]
    pub fn outputs(mut self, n: usize) -> Self {
        self.outputs = n;
        self
    }

    /// Builds the tree, returning it with the id of the lms2012 node.
    #[must_use]
    pub fn build(&self) -> (DeviceTree, NodeId) {
        let mut dt = DeviceTree::new();
        let root = dt.root_id();

        let soc = dt.add_node(root, "soc");
        dt.set_u32(soc, "#address-cells", 1);
        dt.set_u32(soc, "#size-cells", 1);

        let gpio = dt.add_node(soc, "gpio@1e26000");
        dt.set_u32s(gpio, "reg", &[0x01e2_6000, 0x1000]);
        dt.set_u32(gpio, GPIO_CELLS, 2);
        dt.set_phandle(gpio, GPIO_PHANDLE);

        let mut port_phandles = Vec::new();
        let mut uart_phandles = Vec::new();
        for port in 0..PORTS {
            let n = u32::try_from(port).unwrap_or_default();

            let node = dt.add_node(soc, &format!("in-port{}", port + 1));
            dt.set_u32(node, "#in-port-cells", 0);
            let mut states = Vec::new();
            if self.default_state[port] {
                states.push("default");
            }
            if self.i2c_state[port] {
                states.push("i2c");
            }
            dt.set_strs(node, "pinctrl-names", &states);
            dt.set_phandle(node, PORT_PHANDLE_BASE + n);
            port_phandles.push(PORT_PHANDLE_BASE + n);

            let base = EV3_UART_BASES[port];
            let uart = dt.add_node(soc, &format!("serial@{base:x}"));
            dt.set_u32s(uart, "reg", &[u32::try_from(base).unwrap_or_default(), 0x100]);
            dt.set_u32(uart, "interrupts", EV3_UART_IRQS[port]);
            if self.clock_frequency[port] {
                dt.set_u32(uart, "clock-frequency", EV3_UART_CLOCK_HZ);
            }
            dt.set_str(uart, "clock-names", "fck");
            dt.set_u32(uart, "#uart-cells", 0);
            dt.set_phandle(uart, UART_PHANDLE_BASE + n);
            uart_phandles.push(UART_PHANDLE_BASE + n);
        }

        let pwm = dt.add_node(soc, "ehrpwm@1f00000");
        dt.set_u32s(pwm, "reg", &[0x01f0_0000, 0x2000]);
        dt.set_u32(pwm, "#pwm-cells", 2);
        dt.set_phandle(pwm, PWM_PHANDLE);

        let dev = dt.add_node(root, "lms2012");
        dt.set_str(dev, "compatible", "ev3dev,lms2012-compat");
        dt.set_u32s(dev, "in-in-ports", &port_phandles[..self.in_ports]);
        dt.set_u32s(dev, "adc-channels", &self.adc_channels);
        dt.set_u32s(dev, "in-i2cs", &self.i2c_buses);
        dt.set_u32s(dev, "in-uarts", &uart_phandles[..self.uarts]);

        let mut line = 0;
        let mut gpios = |dt: &mut DeviceTree, name: &str, count: usize| {
            let mut cells = Vec::new();
            for _ in 0..count {
                cells.extend_from_slice(&[GPIO_PHANDLE, line, 0]);
                line += 1;
            }
            dt.set_u32s(dev, &format!("{name}-gpios"), &cells);
        };

        gpios(&mut dt, "spi", self.spi_pins);
        for port in 0..PORTS {
            if self.pin2[port] {
                gpios(&mut dt, &format!("in{}-pin2", port + 1), 1);
            }
            gpios(&mut dt, &format!("in{}", port + 1), self.input_pins[port]);
        }
        for (port, name) in OUTPUT_NAMES.iter().enumerate() {
            gpios(&mut dt, name, self.output_pins[port]);
        }

        let mut pwms = Vec::new();
        for channel in 0..self.outputs {
            let channel = u32::try_from(channel).unwrap_or_default();
            pwms.extend_from_slice(&[PWM_PHANDLE, channel, 50_000]);
        }
        dt.set_u32s(dev, "pwms", &pwms);
        let names: Vec<&str> = OUTPUT_NAMES
            .iter()
            .copied()
            .chain(["outE", "outF"])
            .take(self.outputs)
            .collect();
        dt.set_strs(dev, "pwm-names", &names);

        (dt, dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tree_is_complete() {
        let (dt, dev) = Ev3TreeBuilder::new().build();
        let dev = dt.node(dev);
        assert!(dev.is_compatible("ev3dev,lms2012-compat"));
        assert_eq!(dev.count_phandle_with_args("in-in-ports", "#in-port-cells"), Ok(4));
        assert_eq!(dev.count_phandle_with_args("in-uarts", "#uart-cells"), Ok(4));
        assert_eq!(dev.count_u32_elems("adc-channels"), Ok(8));
        assert_eq!(lms_driver_api::gpio::count(dev, "spi"), Ok(4));
        assert_eq!(lms_driver_api::gpio::count(dev, "in3"), Ok(5));
        assert_eq!(lms_driver_api::gpio::count(dev, "outD"), Ok(5));
        assert_eq!(dev.count_strings("pwm-names"), Ok(4));
        assert_eq!(dev.count_phandle_with_args("pwms", "#pwm-cells"), Ok(4));
    }

    #[test]
    fn uart_registers_translate() {
        let (dt, dev) = Ev3TreeBuilder::new().build();
        let uart = dt
            .node(dev)
            .parse_phandle_with_args("in-uarts", "#uart-cells", 2)
            .unwrap()
            .node;
        let range = uart.address_to_resource(0).unwrap();
        assert_eq!(range.start(), EV3_UART_BASES[2]);
        assert_eq!(uart.read_u32("clock-frequency"), Ok(EV3_UART_CLOCK_HZ));
    }

    #[test]
    fn knobs_break_one_thing() {
        let (dt, dev) = Ev3TreeBuilder::new()
            .adc_channels(&[1, 2, 3])
            .without_pin2(1)
            .outputs(5)
            .build();
        let dev = dt.node(dev);
        assert_eq!(dev.count_u32_elems("adc-channels"), Ok(3));
        assert!(dev.property("in2-pin2-gpios").is_none());
        assert!(dev.property("in1-pin2-gpios").is_some());
        assert_eq!(dev.count_strings("pwm-names"), Ok(5));
    }
}
