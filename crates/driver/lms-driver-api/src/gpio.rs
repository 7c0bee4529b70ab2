//! GPIO request flags and consumer lookup.
//!
//! Consumers name their lines with a connection id: lines for `"in1"` are
//! listed in the `in1-gpios` property as `<&controller line flags>` entries,
//! where the controller's `#gpio-cells` gives the number of argument cells.

use alloc::format;

use crate::of::{DeviceNode, OfError};

/// Name of the argument-count property on GPIO controllers.
pub const GPIO_CELLS: &str = "#gpio-cells";

bitflags::bitflags! {
    /// Flags applied to GPIO lines when they are requested.
    ///
    /// An empty set requests the lines "as is": direction and level are left
    /// untouched so the consumer can configure them later.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpioFlags: u32 {
        /// Set the line direction on request.
        const DIR_SET    = 1 << 0;
        /// Direction is output (only meaningful with `DIR_SET`).
        const DIR_OUT    = 1 << 1;
        /// Initial output level is high.
        const VAL_HIGH   = 1 << 2;
        /// Line is driven open-drain.
        const OPEN_DRAIN = 1 << 3;
    }
}

impl GpioFlags {
    /// Leave direction and level unchanged.
    pub const ASIS: Self = Self::empty();
    /// Configure as input.
    pub const IN: Self = Self::DIR_SET;
    /// Configure as output, driven low.
    pub const OUT_LOW: Self = Self::DIR_SET.union(Self::DIR_OUT);
    /// Configure as output, driven high.
    pub const OUT_HIGH: Self = Self::OUT_LOW.union(Self::VAL_HIGH);

    /// Returns `true` if the request changes the line direction.
    #[must_use]
    pub const fn sets_direction(self) -> bool {
        self.contains(Self::DIR_SET)
    }
}

/// Counts the lines `dev` declares for connection id `con_id`.
///
/// # Errors
///
/// [`OfError::NotFound`] if `<con_id>-gpios` is absent, or the decoding
/// errors of [`DeviceNode::count_phandle_with_args`].
pub fn count(dev: DeviceNode<'_>, con_id: &str) -> Result<usize, OfError> {
    dev.count_phandle_with_args(&format!("{con_id}-gpios"), GPIO_CELLS)
}
