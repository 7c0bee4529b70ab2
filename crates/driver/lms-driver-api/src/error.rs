//! Driver error taxonomy.

use core::fmt;

/// Errors that can occur while binding a driver to its peripherals.
///
/// The taxonomy separates conditions that will resolve on their own
/// ([`ResourceUnavailable`](Self::ResourceUnavailable)) from conditions that
/// will fail identically on every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverError {
    /// Another instance is already bound (or binding). Not retried automatically.
    Busy,
    /// The device description disagrees with the expected topology, or a
    /// required property is absent or malformed.
    ConfigMismatch,
    /// A named dependency (I2C adapter, PWM provider, ...) has not registered
    /// yet. The whole bind should be attempted again later.
    ResourceUnavailable,
    /// Any other failure acquiring a pin-control state, GPIO, memory window,
    /// interrupt or clock.
    AcquisitionFailure,
}

impl DriverError {
    /// Returns `true` if retrying the whole bind later may succeed without a
    /// configuration change.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ResourceUnavailable)
    }

    /// Returns `true` if the error will recur on every retry.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::ConfigMismatch | Self::AcquisitionFailure)
    }

    /// Returns the negative errno reported to the invoking framework.
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::Busy => -16,
            Self::ConfigMismatch => -22,
            Self::ResourceUnavailable => -517,
            Self::AcquisitionFailure => -19,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("device busy"),
            Self::ConfigMismatch => f.write_str("configuration mismatch"),
            Self::ResourceUnavailable => f.write_str("resource unavailable, retry later"),
            Self::AcquisitionFailure => f.write_str("resource acquisition failed"),
        }
    }
}

impl core::error::Error for DriverError {}
