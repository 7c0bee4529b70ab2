//! Probe orchestration.
//!
//! A probe runs as one synchronous pass:
//!
//! ```text
//! Idle -> Validating -> BindingInputs(0..N) -> BindingOutputs(0..M)
//!      -> Publishing -> RegisteringChildren -> Bound
//! ```
//!
//! The slot is reserved before anything else, so a concurrent or repeated
//! probe fails with `Busy` while still `Idle`. Any failure after that moves
//! to `Aborting`: every resource acquired by the attempt is released, then
//! the slot is emptied, and the error is returned with its kind unchanged.
//! There is no resume; a retryable failure is retried by probing again.

use alloc::sync::Arc;
use core::fmt;

use lms_driver_api::{DeviceNode, GpioArray, PlatformBus, ProbeContext};
use planck_noalloc::vec::ArrayVec;

use crate::acquire;
use crate::children::Children;
use crate::config::{ADC_SPI_PINS, DRIVER_NAME, INPUTS, OUTPUTS, SPI_CON_ID};
use crate::device::Lms2012Device;
use crate::devres::Devres;
use crate::error::{ProbeError, ProbeStep, report};
use crate::port::{bind_input_port, bind_output_port};
use crate::slot::{DeviceSlot, SlotClaim};
use crate::topology;

/// Position of a probe in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Not started, or rejected before starting.
    Idle,
    /// Checking the description against the port constants.
    Validating,
    /// Binding input port `n`.
    BindingInputs(usize),
    /// Binding output port `n`.
    BindingOutputs(usize),
    /// Storing the instance in the slot.
    Publishing,
    /// Registering the child devices.
    RegisteringChildren,
    /// Fully bound.
    Bound,
    /// Unwinding a failed attempt.
    Aborting,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::BindingInputs(i) => write!(f, "binding input {i}"),
            Self::BindingOutputs(j) => write!(f, "binding output {j}"),
            Self::Publishing => f.write_str("publishing"),
            Self::RegisteringChildren => f.write_str("registering children"),
            Self::Bound => f.write_str("bound"),
            Self::Aborting => f.write_str("aborting"),
        }
    }
}

/// One probe attempt.
pub struct Probe<'a, 'dt> {
    slot: &'a Arc<DeviceSlot>,
    ctx: &'a ProbeContext,
    dev: DeviceNode<'dt>,
    state: ProbeState,
    observer: Option<&'a mut dyn FnMut(ProbeState)>,
}

impl<'a, 'dt> Probe<'a, 'dt> {
    /// Prepares a probe of `dev` into `slot`.
    #[must_use]
    pub fn new(slot: &'a Arc<DeviceSlot>, ctx: &'a ProbeContext, dev: DeviceNode<'dt>) -> Self {
        Self {
            slot,
            ctx,
            dev,
            state: ProbeState::Idle,
            observer: None,
        }
    }

    /// Calls `observer` on every state transition.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a mut dyn FnMut(ProbeState)) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ProbeState {
        self.state
    }

    fn enter(&mut self, state: ProbeState) {
        log::trace!("{}: {} -> {}", self.dev, self.state, state);
        self.state = state;
        if let Some(observer) = self.observer.as_mut() {
            observer(state);
        }
    }

    /// Runs the probe to completion.
    ///
    /// # Errors
    ///
    /// - [`Busy`](lms_driver_api::DriverError::Busy) if the slot is taken;
    ///   nothing is read or acquired.
    /// - [`ConfigMismatch`](lms_driver_api::DriverError::ConfigMismatch) if
    ///   validation fails; nothing is acquired.
    /// - Any port failure, after releasing everything acquired so far.
    pub fn run(mut self) -> Result<BoundDevice, ProbeError> {
        let claim = self
            .slot
            .try_reserve()
            .map_err(|kind| report(ProbeStep::Reserve, kind))?;

        let mut devres = Devres::new();
        let device = match self.bind(&mut devres) {
            Ok(device) => device,
            Err(err) => {
                self.enter(ProbeState::Aborting);
                drop(devres);
                drop(claim);
                return Err(err);
            }
        };

        self.enter(ProbeState::Publishing);
        let device = Arc::new(device);
        claim.publish(device.clone());

        self.enter(ProbeState::RegisteringChildren);
        device.set_children(Children::register(&self.ctx.bus));

        log::info!("Registered {DRIVER_NAME}");
        self.enter(ProbeState::Bound);
        Ok(BoundDevice {
            device,
            bus: self.ctx.bus.clone(),
            claim: Some(claim),
            devres,
        })
    }

    fn bind(&mut self, devres: &mut Devres) -> Result<Lms2012Device, ProbeError> {
        let (ctx, dev) = (self.ctx, self.dev);

        self.enter(ProbeState::Validating);
        let topology = topology::validate(dev)?;

        self.enter(ProbeState::BindingInputs(0));
        // The ADC SPI lines serve every input port.
        let spi_pins = spi_pins(ctx, dev, devres)?;

        let mut inputs = ArrayVec::new();
        for port in 0..INPUTS {
            if port > 0 {
                self.enter(ProbeState::BindingInputs(port));
            }
            inputs.push(bind_input_port(ctx, dev, port, &topology, devres)?);
        }

        let mut outputs = ArrayVec::new();
        for port in 0..OUTPUTS {
            self.enter(ProbeState::BindingOutputs(port));
            outputs.push(bind_output_port(ctx, dev, port, devres)?);
        }

        Ok(Lms2012Device::new(inputs, outputs, topology.adc_map, spi_pins))
    }
}

fn spi_pins(
    ctx: &ProbeContext,
    dev: DeviceNode<'_>,
    devres: &mut Devres,
) -> Result<GpioArray, ProbeError> {
    let mut group = devres.open_group();
    let pins = acquire::gpio_array(
        &mut group,
        ctx,
        dev,
        SPI_CON_ID,
        ADC_SPI_PINS,
        ProbeStep::SpiPins,
    )?;
    group.close();
    Ok(pins)
}

/// A bound instance: owns the slot claim, the child devices and every
/// acquired resource.
///
/// Teardown happens when the value is dropped, usually through
/// [`PlatformDriver::remove`](lms_driver_api::PlatformDriver::remove):
/// children are unregistered newest first, the slot is emptied, then every
/// resource is released in reverse acquisition order.
pub struct BoundDevice {
    device: Arc<Lms2012Device>,
    bus: Arc<dyn PlatformBus>,
    claim: Option<SlotClaim>,
    devres: Devres,
}

impl fmt::Debug for BoundDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundDevice")
            .field("device", &self.device)
            .field("resources", &self.devres.len())
            .finish_non_exhaustive()
    }
}

impl BoundDevice {
    /// Returns the bound instance.
    #[must_use]
    pub fn device(&self) -> &Arc<Lms2012Device> {
        &self.device
    }

    /// Returns the number of held resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.devres.len()
    }
}

impl Drop for BoundDevice {
    fn drop(&mut self) {
        if let Some(children) = self.device.children() {
            children.unregister(&self.bus);
        }
        drop(self.claim.take());
        self.devres.release_all();
        log::info!("Unregistered {DRIVER_NAME}");
    }
}
