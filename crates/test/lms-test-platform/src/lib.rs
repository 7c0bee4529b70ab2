//! Host test platform for lms2012 drivers.
//!
//! - [`MockPlatform`] implements every provider trait over a resource
//!   ledger. Each acquisition gets a label (`"gpios:in1"`, `"i2c:3"`,
//!   `"clk-enable:serial@1d0c000"`, ...) that tests can inspect or turn into
//!   an injected failure with [`MockPlatform::fail_at`].
//! - [`Ev3TreeBuilder`] builds a well-formed EV3 device description with
//!   knobs for breaking individual parts of it.

mod platform;
mod tree;

pub use ledger::{Event, Op};
pub use platform::MockPlatform;
pub use tree::{
    EV3_ADC_CHANNELS, EV3_I2C_BUSES, EV3_UART_BASES, EV3_UART_CLOCK_HZ, EV3_UART_IRQS,
    Ev3TreeBuilder,
};
