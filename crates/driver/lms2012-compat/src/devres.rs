//! Release registry for acquired peripherals.
//!
//! Every successful acquisition is registered here as a [`ResourceHandle`]
//! immediately after it succeeds. The registry releases its handles in
//! reverse registration order, exactly once, when [`Devres::release_all`] is
//! called or the registry is dropped.
//!
//! A [`DevresGroup`] scopes the registrations made while binding one port:
//! closing the group keeps them, dropping it while open releases only them.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use lms_driver_api::{
    Clk, ClockProvider, GpioArray, GpioDesc, GpioProvider, I2cAdapter, I2cProvider, IoMem,
    MmioProvider, Pinctrl, PinctrlProvider, PwmDevice, PwmProvider,
};

use crate::error::ProbeStep;

// ---------------------------------------------------------------------------
// ResourceHandle
// ---------------------------------------------------------------------------

/// The kind of a [`ResourceHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Pin-control handle.
    Pinctrl,
    /// Single GPIO line.
    Gpio,
    /// GPIO line group.
    GpioArray,
    /// I2C adapter reference.
    I2cAdapter,
    /// Mapped register window.
    IoMem,
    /// Enabled clock reference.
    Clock,
    /// PWM channel.
    Pwm,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pinctrl => "pinctrl",
            Self::Gpio => "gpio",
            Self::GpioArray => "gpio array",
            Self::I2cAdapter => "i2c adapter",
            Self::IoMem => "iomem",
            Self::Clock => "clock",
            Self::Pwm => "pwm",
        })
    }
}

/// One acquired peripheral together with the provider that takes it back.
pub enum ResourceHandle {
    /// Pin-control handle, released with [`PinctrlProvider::put`].
    Pinctrl(Arc<dyn PinctrlProvider>, Pinctrl),
    /// GPIO line, released with [`GpioProvider::put`].
    Gpio(Arc<dyn GpioProvider>, GpioDesc),
    /// GPIO group, released with [`GpioProvider::put_array`].
    GpioArray(Arc<dyn GpioProvider>, GpioArray),
    /// I2C adapter reference, released with [`I2cProvider::put_adapter`].
    I2cAdapter(Arc<dyn I2cProvider>, I2cAdapter),
    /// Register window, released with [`MmioProvider::iounmap`].
    IoMem(Arc<dyn MmioProvider>, IoMem),
    /// Prepared and enabled clock, released by disabling it and then
    /// dropping the reference.
    Clock(Arc<dyn ClockProvider>, Clk),
    /// PWM channel, released with [`PwmProvider::put`].
    Pwm(Arc<dyn PwmProvider>, PwmDevice),
}

impl ResourceHandle {
    /// Returns the handle's kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pinctrl(..) => ResourceKind::Pinctrl,
            Self::Gpio(..) => ResourceKind::Gpio,
            Self::GpioArray(..) => ResourceKind::GpioArray,
            Self::I2cAdapter(..) => ResourceKind::I2cAdapter,
            Self::IoMem(..) => ResourceKind::IoMem,
            Self::Clock(..) => ResourceKind::Clock,
            Self::Pwm(..) => ResourceKind::Pwm,
        }
    }

    /// Hands the resource back to its provider.
    pub fn release(self) {
        match self {
            Self::Pinctrl(p, pinctrl) => p.put(pinctrl),
            Self::Gpio(p, desc) => p.put(desc),
            Self::GpioArray(p, array) => p.put_array(array),
            Self::I2cAdapter(p, adapter) => p.put_adapter(adapter),
            Self::IoMem(p, mem) => p.iounmap(mem),
            Self::Clock(p, clk) => {
                p.disable_unprepare(clk);
                p.put(clk);
            }
            Self::Pwm(p, pwm) => p.put(pwm),
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pinctrl(_, v) => f.debug_tuple("Pinctrl").field(v).finish(),
            Self::Gpio(_, v) => f.debug_tuple("Gpio").field(v).finish(),
            Self::GpioArray(_, v) => f.debug_tuple("GpioArray").field(v).finish(),
            Self::I2cAdapter(_, v) => f.debug_tuple("I2cAdapter").field(v).finish(),
            Self::IoMem(_, v) => f.debug_tuple("IoMem").field(v).finish(),
            Self::Clock(_, v) => f.debug_tuple("Clock").field(v).finish(),
            Self::Pwm(_, v) => f.debug_tuple("Pwm").field(v).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Devres
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Entry {
    step: ProbeStep,
    handle: ResourceHandle,
}

impl Entry {
    fn release(self) {
        log::debug!("release {} ({})", self.handle.kind(), self.step);
        self.handle.release();
    }
}

/// Ordered list of acquired resources owned by one device instance.
#[derive(Debug, Default)]
pub struct Devres {
    entries: Vec<Entry>,
}

impl Devres {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of held resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the kinds of the held resources in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.entries.iter().map(|e| e.handle.kind())
    }

    /// Takes ownership of an acquired resource.
    pub fn register(&mut self, step: ProbeStep, handle: ResourceHandle) {
        log::debug!("acquire {} ({step})", handle.kind());
        self.entries.push(Entry { step, handle });
    }

    /// Opens a group; see [`DevresGroup`].
    pub fn open_group(&mut self) -> DevresGroup<'_> {
        let mark = self.entries.len();
        DevresGroup {
            devres: self,
            mark,
            open: true,
        }
    }

    /// Releases every resource registered after the first `mark`, newest
    /// first.
    fn release_to(&mut self, mark: usize) {
        while self.entries.len() > mark {
            if let Some(entry) = self.entries.pop() {
                entry.release();
            }
        }
    }

    /// Releases every held resource, newest first.
    pub fn release_all(&mut self) {
        self.release_to(0);
    }
}

impl Drop for Devres {
    fn drop(&mut self) {
        self.release_all();
    }
}

// ---------------------------------------------------------------------------
// DevresGroup
// ---------------------------------------------------------------------------

/// Registrations made on a [`Devres`] since the group was opened.
///
/// Dropping the group without calling [`close`](Self::close) releases those
/// registrations (newest first) and leaves older ones untouched.
#[derive(Debug)]
pub struct DevresGroup<'a> {
    devres: &'a mut Devres,
    mark: usize,
    open: bool,
}

impl DevresGroup<'_> {
    /// Takes ownership of an acquired resource within this group.
    pub fn register(&mut self, step: ProbeStep, handle: ResourceHandle) {
        self.devres.register(step, handle);
    }

    /// Returns the number of resources registered within this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devres.len() - self.mark
    }

    /// Returns `true` if nothing was registered within this group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps the group's registrations in the parent registry.
    pub fn close(mut self) {
        self.open = false;
    }
}

impl Drop for DevresGroup<'_> {
    fn drop(&mut self) {
        if self.open {
            self.devres.release_to(self.mark);
        }
    }
}
