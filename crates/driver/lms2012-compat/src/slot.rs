//! Single-instance device slot.
//!
//! At most one lms2012-compat instance may be bound at a time. The slot goes
//! `Empty -> Binding` with a single compare-exchange when a probe starts, so
//! a second probe fails with [`DriverError::Busy`] before it reads the
//! description or touches any peripheral. `Binding -> Bound` happens when the
//! instance is published, and the slot returns to `Empty` when the
//! [`SlotClaim`] is dropped.

use alloc::sync::Arc;

use lms_driver_api::DriverError;
use spin::Mutex;

use crate::device::Lms2012Device;
use crate::loom_compat::{AtomicU8, Ordering};

const EMPTY: u8 = 0;
const BINDING: u8 = 1;
const BOUND: u8 = 2;

/// Occupancy of a [`DeviceSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No instance is bound or binding.
    Empty,
    /// A probe holds the slot but has not published yet.
    Binding,
    /// An instance is published.
    Bound,
}

/// Holder of the single published device instance.
#[derive(Debug)]
pub struct DeviceSlot {
    state: AtomicU8,
    instance: Mutex<Option<Arc<Lms2012Device>>>,
}

impl Default for DeviceSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            instance: Mutex::new(None),
        }
    }

    /// Atomically takes the slot for a new probe.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Busy`] if another probe holds the slot or an
    /// instance is published.
    pub fn try_reserve(self: &Arc<Self>) -> Result<SlotClaim, DriverError> {
        self.state
            .compare_exchange(EMPTY, BINDING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DriverError::Busy)?;
        Ok(SlotClaim { slot: self.clone() })
    }

    /// Returns the current occupancy.
    #[must_use]
    pub fn state(&self) -> SlotState {
        match self.state.load(Ordering::Acquire) {
            EMPTY => SlotState::Empty,
            BINDING => SlotState::Binding,
            _ => SlotState::Bound,
        }
    }

    /// Returns a shared reference to the published instance, if any.
    #[must_use]
    pub fn lookup(&self) -> Option<Arc<Lms2012Device>> {
        self.instance.lock().clone()
    }
}

/// Exclusive claim on a [`DeviceSlot`], held from reservation until teardown.
///
/// Dropping the claim withdraws any published instance and empties the slot.
#[derive(Debug)]
pub struct SlotClaim {
    slot: Arc<DeviceSlot>,
}

impl SlotClaim {
    /// Publishes `device`, making it visible to [`DeviceSlot::lookup`].
    pub fn publish(&self, device: Arc<Lms2012Device>) {
        *self.slot.instance.lock() = Some(device);
        self.slot.state.store(BOUND, Ordering::Release);
    }
}

impl Drop for SlotClaim {
    fn drop(&mut self) {
        self.slot.instance.lock().take();
        self.slot.state.store(EMPTY, Ordering::Release);
    }
}
