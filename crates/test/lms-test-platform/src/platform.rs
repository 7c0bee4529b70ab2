//! Mock implementation of every provider trait.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lms_driver_api::{
    ChildDevice, Clk, ClockProvider, DeviceNode, DriverError, GpioArray, GpioDesc, GpioFlags,
    GpioProvider, I2cAdapter, I2cProvider, IoMem, IrqNumber, IrqProvider, MemRange,
    MmioProvider, OfError, Pinctrl, PinctrlProvider, PinctrlState, PlatformBus, ProbeContext,
    PwmDevice, PwmProvider, gpio,
};
use spin::Mutex;

use crate::ledger::{Event, Ledger, Op};

/// Offset added to physical addresses to form fake virtual addresses.
const VIRT_OFFSET: u64 = 0xffff_8000_0000_0000;

#[derive(Debug, Default)]
struct State {
    ledger: Ledger,
    failures: BTreeMap<String, DriverError>,
    i2c_buses: BTreeSet<u32>,
    pwm_ready: bool,
    pinctrl_states: BTreeMap<u32, Vec<String>>,
    clock_nodes: BTreeMap<u32, String>,
    enabled_clocks: BTreeMap<u32, u32>,
}

impl State {
    fn check(&self, label: &str) -> Result<(), DriverError> {
        self.failures.get(label).map_or(Ok(()), |&err| Err(err))
    }
}

/// A platform whose providers hand out ledger-tracked fake resources.
#[derive(Debug)]
pub struct MockPlatform {
    state: Mutex<State>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Creates a platform with no I2C adapters and a ready PWM controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pwm_ready: true,
                ..State::default()
            }),
        }
    }

    /// Creates a shared platform with the EV3's I2C adapters registered.
    #[must_use]
    pub fn ev3() -> Arc<Self> {
        let platform = Self::new();
        for nr in crate::EV3_I2C_BUSES {
            platform.add_i2c_bus(nr);
        }
        Arc::new(platform)
    }

    /// Builds a probe context backed by this platform.
    #[must_use]
    pub fn ctx(self: &Arc<Self>) -> ProbeContext {
        ProbeContext::from_platform(self)
    }

    /// Registers I2C adapter `nr`.
    pub fn add_i2c_bus(&self, nr: u32) {
        self.state.lock().i2c_buses.insert(nr);
    }

    /// Unregisters I2C adapter `nr`.
    pub fn remove_i2c_bus(&self, nr: u32) {
        self.state.lock().i2c_buses.remove(&nr);
    }

    /// Sets whether the PWM controller has registered.
    pub fn set_pwm_ready(&self, ready: bool) {
        self.state.lock().pwm_ready = ready;
    }

    /// Makes every acquisition labelled `label` fail with `err`.
    pub fn fail_at(&self, label: &str, err: DriverError) {
        self.state.lock().failures.insert(label.to_owned(), err);
    }

    /// Removes every injected failure.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Returns the labels of resources currently held, oldest first.
    #[must_use]
    pub fn live(&self) -> Vec<String> {
        self.state.lock().ledger.live_labels()
    }

    /// Returns the number of resources currently held.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    /// Returns every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state.lock().ledger.events().to_vec()
    }

    /// Returns the labels of events with operation `op`, in order.
    #[must_use]
    pub fn labels(&self, op: Op) -> Vec<String> {
        self.state
            .lock()
            .ledger
            .events()
            .iter()
            .filter(|e| e.op == op)
            .map(|e| e.label.clone())
            .collect()
    }

    /// Returns every acquisition and lookup label, in order.
    #[must_use]
    pub fn acquired_labels(&self) -> Vec<String> {
        self.state
            .lock()
            .ledger
            .events()
            .iter()
            .filter(|e| e.op != Op::Release)
            .map(|e| e.label.clone())
            .collect()
    }

    /// Returns releases of resources that were not held.
    #[must_use]
    pub fn double_releases(&self) -> Vec<String> {
        self.state.lock().ledger.double_releases().to_vec()
    }

    /// Returns `true` if nothing is held and nothing was released twice.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        let state = self.state.lock();
        state.ledger.live_labels().is_empty() && state.ledger.double_releases().is_empty()
    }

    /// Forgets recorded events; held resources stay held.
    pub fn clear_events(&self) {
        self.state.lock().ledger.clear_events();
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

impl PinctrlProvider for MockPlatform {
    fn get_select_default(&self, dev: DeviceNode<'_>) -> Result<Pinctrl, DriverError> {
        let label = format!("pinctrl:{}", dev.name());
        let mut state = self.state.lock();
        state.check(&label)?;
        let names = dev
            .property("pinctrl-names")
            .map(|p| p.as_str_list().map(str::to_owned).collect())
            .unwrap_or_default();
        let id = state.ledger.acquire(label);
        state.pinctrl_states.insert(id, names);
        Ok(Pinctrl::new(id))
    }

    fn lookup_state(&self, pinctrl: Pinctrl, name: &str) -> Option<PinctrlState> {
        let state = self.state.lock();
        let index = state
            .pinctrl_states
            .get(&pinctrl.id())?
            .iter()
            .position(|s| s == name)?;
        Some(PinctrlState::new(pinctrl, u32::try_from(index).ok()?))
    }

    fn put(&self, pinctrl: Pinctrl) {
        let mut state = self.state.lock();
        state.pinctrl_states.remove(&pinctrl.id());
        state.ledger.release(pinctrl.id());
    }
}

impl GpioProvider for MockPlatform {
    fn get_optional(
        &self,
        dev: DeviceNode<'_>,
        con_id: &str,
        _flags: GpioFlags,
    ) -> Result<Option<GpioDesc>, DriverError> {
        let count = match gpio::count(dev, con_id) {
            Ok(count) => count,
            Err(OfError::NotFound) => return Ok(None),
            Err(err) => return Err(DriverError::from(err)),
        };
        if count != 1 {
            return Err(DriverError::ConfigMismatch);
        }
        let label = format!("gpio:{con_id}");
        let mut state = self.state.lock();
        state.check(&label)?;
        Ok(Some(GpioDesc::new(state.ledger.acquire(label))))
    }

    fn get_array(
        &self,
        dev: DeviceNode<'_>,
        con_id: &str,
        _flags: GpioFlags,
    ) -> Result<GpioArray, DriverError> {
        let count = gpio::count(dev, con_id).map_err(DriverError::from)?;
        let label = format!("gpios:{con_id}");
        let mut state = self.state.lock();
        state.check(&label)?;
        Ok(GpioArray::new(state.ledger.acquire(label), count))
    }

    fn put(&self, desc: GpioDesc) {
        self.state.lock().ledger.release(desc.id());
    }

    fn put_array(&self, array: GpioArray) {
        self.state.lock().ledger.release(array.id());
    }
}

impl I2cProvider for MockPlatform {
    fn get_adapter(&self, nr: u32) -> Option<I2cAdapter> {
        let label = format!("i2c:{nr}");
        let mut state = self.state.lock();
        if !state.i2c_buses.contains(&nr) || state.check(&label).is_err() {
            return None;
        }
        state.ledger.acquire(label);
        Some(I2cAdapter::new(nr))
    }

    fn put_adapter(&self, adapter: I2cAdapter) {
        self.state
            .lock()
            .ledger
            .release_label(&format!("i2c:{}", adapter.nr()));
    }
}

fn iomem_label(phys: u64) -> String {
    format!("iomem@{phys:#x}")
}

impl MmioProvider for MockPlatform {
    fn ioremap(&self, range: MemRange) -> Result<IoMem, DriverError> {
        let label = iomem_label(range.start());
        let mut state = self.state.lock();
        state.check(&label)?;
        state.ledger.acquire(label);
        // SAFETY: mock mapping; the virtual address is never dereferenced.
        Ok(unsafe { IoMem::new(range.start(), VIRT_OFFSET + range.start(), range.size()) })
    }

    fn iounmap(&self, mem: IoMem) {
        self.state
            .lock()
            .ledger
            .release_label(&iomem_label(mem.phys_base()));
    }
}

impl IrqProvider for MockPlatform {
    fn of_irq_get(&self, dev: DeviceNode<'_>, index: usize) -> Result<IrqNumber, DriverError> {
        let label = format!("irq:{}", dev.name());
        let mut state = self.state.lock();
        state.check(&label)?;
        let irq = dev
            .property("interrupts")
            .and_then(|p| p.cells().nth(index))
            .ok_or(DriverError::ConfigMismatch)?;
        state.ledger.resolve(label);
        Ok(IrqNumber::new(irq))
    }
}

impl ClockProvider for MockPlatform {
    fn get(&self, dev: DeviceNode<'_>, name: &str) -> Result<Clk, DriverError> {
        let label = format!("clk:{}", dev.name());
        let mut state = self.state.lock();
        state.check(&label)?;
        dev.match_string("clock-names", name)
            .map_err(DriverError::from)?;
        let id = state.ledger.acquire(label);
        state.clock_nodes.insert(id, dev.name().to_owned());
        Ok(Clk::new(id))
    }

    fn prepare_enable(&self, clk: Clk) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let node = state
            .clock_nodes
            .get(&clk.id())
            .cloned()
            .ok_or(DriverError::AcquisitionFailure)?;
        let label = format!("clk-enable:{node}");
        state.check(&label)?;
        let id = state.ledger.acquire(label);
        state.enabled_clocks.insert(clk.id(), id);
        Ok(())
    }

    fn disable_unprepare(&self, clk: Clk) {
        let mut state = self.state.lock();
        match state.enabled_clocks.remove(&clk.id()) {
            Some(id) => state.ledger.release(id),
            None => state.ledger.release_label("clk-enable:<not enabled>"),
        }
    }

    fn put(&self, clk: Clk) {
        let mut state = self.state.lock();
        state.clock_nodes.remove(&clk.id());
        state.ledger.release(clk.id());
    }
}

impl PwmProvider for MockPlatform {
    fn get(&self, dev: DeviceNode<'_>, con_id: &str) -> Result<PwmDevice, DriverError> {
        let label = format!("pwm:{con_id}");
        let mut state = self.state.lock();
        if !state.pwm_ready {
            return Err(DriverError::ResourceUnavailable);
        }
        state.check(&label)?;
        dev.match_string("pwm-names", con_id)
            .map_err(DriverError::from)?;
        Ok(PwmDevice::new(state.ledger.acquire(label)))
    }

    fn put(&self, pwm: PwmDevice) {
        self.state.lock().ledger.release(pwm.id());
    }
}

impl PlatformBus for MockPlatform {
    fn register_simple(&self, name: &str) -> Result<ChildDevice, DriverError> {
        let label = format!("child:{name}");
        let mut state = self.state.lock();
        state.check(&label)?;
        Ok(ChildDevice::new(state.ledger.acquire(label)))
    }

    fn unregister(&self, child: ChildDevice) {
        self.state.lock().ledger.release(child.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ev3TreeBuilder;

    #[test]
    fn gpio_width_follows_description() {
        let platform = MockPlatform::ev3();
        let (dt, dev) = Ev3TreeBuilder::new().input_pins(1, 3).build();
        let ctx = platform.ctx();

        let in1 = ctx.gpio.get_array(dt.node(dev), "in1", GpioFlags::ASIS).unwrap();
        let in2 = ctx.gpio.get_array(dt.node(dev), "in2", GpioFlags::ASIS).unwrap();
        assert_eq!(in1.ndescs(), 5);
        assert_eq!(in2.ndescs(), 3);

        ctx.gpio.put_array(in2);
        ctx.gpio.put_array(in1);
        assert!(platform.is_clean());
    }

    #[test]
    fn missing_optional_gpio_is_none() {
        let platform = MockPlatform::ev3();
        let (dt, dev) = Ev3TreeBuilder::new().without_pin2(0).build();
        let ctx = platform.ctx();
        assert_eq!(
            ctx.gpio
                .get_optional(dt.node(dev), "in1-pin2", GpioFlags::ASIS)
                .unwrap(),
            None
        );
        assert_eq!(platform.live_count(), 0);
    }

    #[test]
    fn clock_enable_is_tracked_separately() {
        let platform = MockPlatform::ev3();
        let (dt, _) = Ev3TreeBuilder::new().build();
        let uart = dt.find_node("/soc/serial@1d0c000").unwrap();
        let ctx = platform.ctx();

        let clk = ctx.clk.get(uart, "fck").unwrap();
        ctx.clk.prepare_enable(clk).unwrap();
        assert_eq!(platform.live(), ["clk:serial@1d0c000", "clk-enable:serial@1d0c000"]);

        ctx.clk.disable_unprepare(clk);
        ctx.clk.put(clk);
        assert!(platform.is_clean());
    }

    #[test]
    fn injected_failure() {
        let platform = MockPlatform::ev3();
        let (dt, dev) = Ev3TreeBuilder::new().build();
        platform.fail_at("pwm:outB", DriverError::AcquisitionFailure);
        let ctx = platform.ctx();

        assert!(ctx.pwm.get(dt.node(dev), "outA").is_ok());
        assert_eq!(
            ctx.pwm.get(dt.node(dev), "outB").unwrap_err(),
            DriverError::AcquisitionFailure
        );
    }

    #[test]
    fn unregistered_adapter_and_pwm() {
        let platform = Arc::new(MockPlatform::new());
        let (dt, dev) = Ev3TreeBuilder::new().build();
        platform.set_pwm_ready(false);
        let ctx = platform.ctx();

        assert!(ctx.i2c.get_adapter(3).is_none());
        assert_eq!(
            ctx.pwm.get(dt.node(dev), "outA").unwrap_err(),
            DriverError::ResourceUnavailable
        );

        platform.add_i2c_bus(3);
        let adapter = ctx.i2c.get_adapter(3).unwrap();
        ctx.i2c.put_adapter(adapter);
        ctx.i2c.put_adapter(adapter);
        assert_eq!(platform.double_releases(), ["i2c:3"]);
    }
}
