//! Placeholder child devices.
//!
//! Once bound, the driver registers four resource-less child devices whose
//! presence lets the lms2012 sub-drivers (analog, I2C, UART and PWM) bind.
//! Registration is best effort: a child that fails to register is logged and
//! skipped, and does not undo the bind.

use alloc::sync::Arc;
use core::fmt;

use lms_driver_api::{ChildDevice, PlatformBus};
use planck_noalloc::vec::ArrayVec;

/// Number of child devices.
pub const CHILD_COUNT: usize = 4;

/// The child device roles, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// Analog input sub-device.
    Analog,
    /// I2C bus sub-device.
    Iic,
    /// UART sub-device.
    Uart,
    /// PWM sub-device.
    Pwm,
}

impl ChildKind {
    /// All roles in registration order.
    pub const ALL: [Self; CHILD_COUNT] = [Self::Analog, Self::Iic, Self::Uart, Self::Pwm];

    /// Returns the platform device name registered for this role.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analog => "d_analog",
            Self::Iic => "d_iic",
            Self::Uart => "d_uart",
            Self::Pwm => "d_pwm",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The registered child devices, in registration order.
#[derive(Debug)]
pub struct Children {
    registered: ArrayVec<(ChildKind, ChildDevice), CHILD_COUNT>,
}

impl Children {
    /// Registers every child on `bus`, skipping those that fail.
    pub fn register(bus: &Arc<dyn PlatformBus>) -> Self {
        let mut registered = ArrayVec::new();
        for kind in ChildKind::ALL {
            match bus.register_simple(kind.name()) {
                Ok(child) => {
                    registered.push((kind, child));
                }
                Err(err) => log::warn!("Could not register {kind}: {err}"),
            }
        }
        Self { registered }
    }

    /// Returns the registered child of role `kind`, if it registered.
    #[must_use]
    pub fn get(&self, kind: ChildKind) -> Option<ChildDevice> {
        self.registered
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(_, child)| child)
    }

    /// Returns the number of registered children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Returns `true` if no child registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Unregisters every child from `bus`, newest first.
    pub fn unregister(&self, bus: &Arc<dyn PlatformBus>) {
        for &(kind, child) in self.registered.as_slice().iter().rev() {
            log::debug!("unregister {kind}");
            bus.unregister(child);
        }
    }
}
