//! The bound device instance.

use lms_driver_api::GpioArray;
use planck_noalloc::vec::ArrayVec;
use spin::Once;

use crate::children::Children;
use crate::config::{INPUT_ADC, INPUTS, OUTPUTS};
use crate::port::{InputPort, OutputPort};

/// A fully bound lms2012-compat instance.
///
/// Shared read-only through [`DeviceSlot::lookup`](crate::DeviceSlot::lookup)
/// once published. The descriptors it holds are only valid until the owning
/// [`BoundDevice`](crate::BoundDevice) is removed.
#[derive(Debug)]
pub struct Lms2012Device {
    inputs: ArrayVec<InputPort, INPUTS>,
    outputs: ArrayVec<OutputPort, OUTPUTS>,
    adc_map: [u32; INPUT_ADC],
    spi_pins: GpioArray,
    children: Once<Children>,
}

impl Lms2012Device {
    pub(crate) fn new(
        inputs: ArrayVec<InputPort, INPUTS>,
        outputs: ArrayVec<OutputPort, OUTPUTS>,
        adc_map: [u32; INPUT_ADC],
        spi_pins: GpioArray,
    ) -> Self {
        Self {
            inputs,
            outputs,
            adc_map,
            spi_pins,
            children: Once::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn placeholder() -> Self {
        Self::new(ArrayVec::new(), ArrayVec::new(), [0; INPUT_ADC], GpioArray::new(0, 0))
    }

    /// Returns the input ports, indexed from 0 (`in1`).
    #[must_use]
    pub fn inputs(&self) -> &[InputPort] {
        self.inputs.as_slice()
    }

    /// Returns the output ports, indexed from 0 (`outA`).
    #[must_use]
    pub fn outputs(&self) -> &[OutputPort] {
        self.outputs.as_slice()
    }

    /// Returns input port `port`.
    #[must_use]
    pub fn input(&self, port: usize) -> Option<&InputPort> {
        self.inputs().get(port)
    }

    /// Returns output port `port`.
    #[must_use]
    pub fn output(&self, port: usize) -> Option<&OutputPort> {
        self.outputs().get(port)
    }

    /// Returns the ADC channel map.
    #[must_use]
    pub fn adc_map(&self) -> &[u32; INPUT_ADC] {
        &self.adc_map
    }

    /// Returns the ADC SPI line group.
    #[must_use]
    pub fn spi_pins(&self) -> GpioArray {
        self.spi_pins
    }

    /// Returns the child devices, once registered.
    #[must_use]
    pub fn children(&self) -> Option<&Children> {
        self.children.get()
    }

    pub(crate) fn set_children(&self, children: Children) -> &Children {
        self.children.call_once(|| children)
    }
}
