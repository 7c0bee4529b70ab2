//! Resource descriptors naming acquired peripherals.
//!
//! A descriptor is a plain `Copy` value. It identifies a claim made through a
//! provider but does not release anything on drop; ownership of the release
//! lives with whoever registered the claim (see the provider traits).

use core::fmt;

/// A physical register range described by a node's `reg` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRange {
    start: u64,
    size: u64,
}

impl MemRange {
    /// Creates a new memory range.
    #[must_use]
    pub const fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Returns the physical start address.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the exclusive end address, or `None` on overflow.
    #[must_use]
    pub const fn end(&self) -> Option<u64> {
        self.start.checked_add(self.size)
    }
}

impl fmt::Display for MemRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[mem {:#010x}+{:#x}]", self.start, self.size)
    }
}

/// A memory-mapped register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoMem {
    phys_base: u64,
    virt_base: u64,
    size: u64,
}

impl IoMem {
    /// Creates a new register window descriptor.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `phys_base` and `virt_base` refer to the same physical region.
    /// - The virtual mapping stays valid until the window is unmapped.
    #[must_use]
    pub const unsafe fn new(phys_base: u64, virt_base: u64, size: u64) -> Self {
        Self {
            phys_base,
            virt_base,
            size,
        }
    }

    /// Returns the physical base address.
    #[must_use]
    pub const fn phys_base(&self) -> u64 {
        self.phys_base
    }

    /// Returns the virtual base address.
    #[must_use]
    pub const fn virt_base(&self) -> u64 {
        self.virt_base
    }

    /// Returns the size of the window in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns a pointer to the given byte offset within the window.
    ///
    /// Returns `None` if the offset is out of bounds.
    #[must_use]
    pub const fn ptr_at(&self, offset: u64) -> Option<*mut u8> {
        if offset < self.size {
            Some((self.virt_base + offset) as *mut u8)
        } else {
            None
        }
    }
}

/// An interrupt number resolved from a node's `interrupts` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct IrqNumber(u32);

impl IrqNumber {
    /// Creates a new `IrqNumber`.
    #[must_use]
    pub const fn new(irq: u32) -> Self {
        Self(irq)
    }

    /// Returns the raw interrupt number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IrqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pin-control handle for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Pinctrl(u32);

impl Pinctrl {
    /// Creates a new `Pinctrl` from a provider-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A named pin-mux state looked up on a [`Pinctrl`] handle.
///
/// States are owned by their handle; they have no release of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinctrlState {
    pinctrl: Pinctrl,
    index: u32,
}

impl PinctrlState {
    /// Creates a state descriptor for the `index`-th state of `pinctrl`.
    #[must_use]
    pub const fn new(pinctrl: Pinctrl, index: u32) -> Self {
        Self { pinctrl, index }
    }

    /// Returns the handle this state belongs to.
    #[must_use]
    pub const fn pinctrl(self) -> Pinctrl {
        self.pinctrl
    }

    /// Returns the state's index in the handle's `pinctrl-names` list.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// A single GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct GpioDesc(u32);

impl GpioDesc {
    /// Creates a new `GpioDesc` from a provider-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A group of GPIO lines requested together under one consumer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioArray {
    id: u32,
    ndescs: usize,
}

impl GpioArray {
    /// Creates a new group descriptor with `ndescs` lines.
    #[must_use]
    pub const fn new(id: u32, ndescs: usize) -> Self {
        Self { id, ndescs }
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Returns the number of lines in the group.
    #[must_use]
    pub const fn ndescs(self) -> usize {
        self.ndescs
    }
}

/// A counted reference to a registered I2C adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct I2cAdapter(u32);

impl I2cAdapter {
    /// Creates a reference to adapter number `nr`.
    #[must_use]
    pub const fn new(nr: u32) -> Self {
        Self(nr)
    }

    /// Returns the adapter's bus number.
    #[must_use]
    pub const fn nr(self) -> u32 {
        self.0
    }
}

/// A clock reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Clk(u32);

impl Clk {
    /// Creates a new `Clk` from a provider-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PwmDevice(u32);

impl PwmDevice {
    /// Creates a new `PwmDevice` from a provider-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the provider-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A child platform device registered on the platform bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ChildDevice(u32);

impl ChildDevice {
    /// Creates a new `ChildDevice` from a bus-assigned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the bus-assigned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}
