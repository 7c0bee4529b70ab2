//! Platform driver entry points.

use alloc::sync::Arc;

use lms_driver_api::{DeviceNode, DriverInfo, PlatformDriver, ProbeContext};

use crate::config::{COMPATIBLE, DRIVER_NAME};
use crate::device::Lms2012Device;
use crate::error::ProbeError;
use crate::probe::{BoundDevice, Probe};
use crate::slot::DeviceSlot;

/// Driver metadata.
pub const DRIVER_INFO: DriverInfo = DriverInfo {
    name: DRIVER_NAME,
    compatible: &[COMPATIBLE],
    description: "lms2012 compatibility driver",
};

/// The lms2012 compatibility driver.
///
/// Every driver sharing one [`DeviceSlot`] competes for the same single
/// instance.
#[derive(Debug, Clone, Default)]
pub struct Lms2012CompatDriver {
    slot: Arc<DeviceSlot>,
}

impl Lms2012CompatDriver {
    /// Creates a driver publishing into `slot`.
    #[must_use]
    pub fn new(slot: Arc<DeviceSlot>) -> Self {
        Self { slot }
    }

    /// Returns the slot this driver publishes into.
    #[must_use]
    pub fn slot(&self) -> &Arc<DeviceSlot> {
        &self.slot
    }

    /// Returns the active instance, if one is bound.
    #[must_use]
    pub fn lookup_active_device(&self) -> Option<Arc<Lms2012Device>> {
        self.slot.lookup()
    }
}

impl PlatformDriver for Lms2012CompatDriver {
    type Bound = BoundDevice;
    type Error = ProbeError;

    fn info(&self) -> DriverInfo {
        DRIVER_INFO
    }

    fn probe(&self, ctx: &ProbeContext, dev: DeviceNode<'_>) -> Result<BoundDevice, ProbeError> {
        Probe::new(&self.slot, ctx, dev).run()
    }

    fn remove(&self, bound: BoundDevice) {
        drop(bound);
    }
}
