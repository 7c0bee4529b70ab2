//! Base driver trait and metadata types.

use crate::of::DeviceNode;
use crate::probe_context::ProbeContext;

/// Static metadata describing a driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverInfo {
    /// Short name of the driver (e.g. "lms2012-compat").
    pub name: &'static str,
    /// `compatible` strings this driver binds to.
    pub compatible: &'static [&'static str],
    /// Human-readable description.
    pub description: &'static str,
}

impl DriverInfo {
    /// Returns `true` if `dev` lists one of this driver's compatible strings.
    #[must_use]
    pub fn matches(&self, dev: DeviceNode<'_>) -> bool {
        self.compatible.iter().any(|c| dev.is_compatible(c))
    }
}

/// A driver for devices found in the device description.
///
/// A successful [`probe`](Self::probe) returns a bound instance. Handing it
/// back to [`remove`](Self::remove) is the only way to unbind, so an instance
/// cannot be removed twice or removed without having been bound.
pub trait PlatformDriver {
    /// Proof of a successful bind, owning everything the bind acquired.
    type Bound;
    /// Error returned by a failed bind.
    type Error;

    /// Returns static information about this driver.
    fn info(&self) -> DriverInfo;

    /// Binds the driver to `dev`, acquiring its resources through `ctx`.
    ///
    /// # Errors
    ///
    /// On error nothing acquired during the attempt remains held.
    fn probe(&self, ctx: &ProbeContext, dev: DeviceNode<'_>) -> Result<Self::Bound, Self::Error>;

    /// Unbinds a previously bound instance, releasing everything it holds.
    fn remove(&self, bound: Self::Bound);
}
