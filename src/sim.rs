//! In-memory X9555 chips and a host platform, for running the driver and the shell without
//! hardware.
//!
//! [`SimBus`] implements `embedded_hal::i2c::I2c` and routes transfers by address to the chips
//! added to it.  Each chip models the register pointer, the power-on register values, polarity
//! inversion and the INT line.  [`SimPlatform`] resolves bus names and `P<port>.<nn>` pin names
//! the way an RTOS device registry would.
use std::collections::HashMap;
use std::string::{String, ToString};
use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::interrupt::{InterruptCallback, IrqError, Trigger};
use crate::registers::{Pin, PinState, Port, Register};
use crate::{Address, BusProvider, InterruptController, PinId};

#[derive(Debug, Clone)]
struct Chip {
    regs: [u8; 8],
    pointer: u8,
    levels: [u8; 2],
    interrupt: bool,
}

impl Chip {
    fn new() -> Self {
        let mut regs = [0x00; 8];
        regs[Register::OutputPort0 as usize] = 0xff;
        regs[Register::OutputPort1 as usize] = 0xff;
        regs[Register::Configuration0 as usize] = 0xff;
        regs[Register::Configuration1 as usize] = 0xff;
        Self {
            regs,
            pointer: 0,
            levels: [0xff; 2],
            interrupt: false,
        }
    }

    /// Input register value: external level on inputs, driven level on outputs.
    fn input(&self, port: Port) -> u8 {
        let p = port as usize;
        let config = self.regs[port.configuration() as usize];
        let sensed = (self.levels[p] & config) | (self.regs[port.output() as usize] & !config);
        sensed ^ self.regs[port.polarity() as usize]
    }

    fn read(&mut self) -> u8 {
        let reg = self.pointer;
        match reg {
            0x00 | 0x01 => {
                self.interrupt = false;
                self.input(if reg == 0 { Port::P0 } else { Port::P1 })
            }
            _ => self.regs[reg as usize],
        }
    }

    fn write(&mut self, value: u8) {
        // input ports are read-only
        if self.pointer >= Register::OutputPort0 as u8 {
            self.regs[self.pointer as usize] = value;
        }
    }
}

#[derive(Debug, Default)]
struct BusState {
    chips: HashMap<u8, Chip>,
    fail_after: Option<usize>,
    transfers: usize,
}

/// Shared handle to a simulated I2C bus.  Clones talk to the same chips.
#[derive(Debug, Clone, Default)]
pub struct SimBus(Arc<Mutex<BusState>>);

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Put a chip with power-on register values at `address`.
    pub fn add_chip(&self, address: Address) {
        self.state().chips.insert(address.get(), Chip::new());
    }

    /// Let `n` more transfers succeed, then fail exactly one.
    pub fn fail_after(&self, n: usize) {
        self.state().fail_after = Some(n);
    }

    /// Number of successful transfers so far.
    pub fn transfers(&self) -> usize {
        self.state().transfers
    }

    pub fn register(&self, address: u8, reg: Register) -> u8 {
        let mut st = self.state();
        match st.chips.get_mut(&address) {
            Some(chip) => {
                let pointer = chip.pointer;
                chip.pointer = reg as u8;
                let value = match reg {
                    Register::InputPort0 => chip.input(Port::P0),
                    Register::InputPort1 => chip.input(Port::P1),
                    _ => chip.regs[reg as usize],
                };
                chip.pointer = pointer;
                value
            }
            None => 0,
        }
    }

    /// Drive the external level of `pin`.  Changing an input asserts INT.
    pub fn set_level(&self, address: u8, pin: Pin, state: PinState) {
        let mut st = self.state();
        if let Some(chip) = st.chips.get_mut(&address) {
            let p = pin.port() as usize;
            let before = chip.levels[p];
            match state {
                PinState::High => chip.levels[p] |= pin.mask(),
                PinState::Low => chip.levels[p] &= !pin.mask(),
            }
            let config = chip.regs[pin.port().configuration() as usize];
            if (before ^ chip.levels[p]) & config != 0 {
                chip.interrupt = true;
            }
        }
    }

    /// Level of the open-drain INT output; `true` while asserted (pulled low).
    pub fn interrupt_asserted(&self, address: u8) -> bool {
        self.state()
            .chips
            .get(&address)
            .map(|c| c.interrupt)
            .unwrap_or(false)
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        let mut st = self.state();
        match st.fail_after {
            Some(0) => {
                st.fail_after = None;
                return Err(ErrorKind::Other);
            }
            Some(n) => st.fail_after = Some(n - 1),
            None => {}
        }
        let Some(chip) = st.chips.get_mut(&address) else {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        };

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((reg, data)) = bytes.split_first() {
                        if *reg > Register::Configuration1 as u8 {
                            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                        }
                        chip.pointer = *reg;
                        if let Some(value) = data.first() {
                            chip.write(*value);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = chip.read();
                    }
                }
            }
        }
        st.transfers += 1;
        Ok(())
    }
}

/// Named buses and GPIOs of a simulated host.
#[derive(Default)]
pub struct SimPlatform {
    buses: HashMap<String, SimBus>,
    irqs: HashMap<PinId, InterruptCallback>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bus(&mut self, name: &str, bus: SimBus) {
        self.buses.insert(name.to_string(), bus);
    }

    pub fn bus(&self, name: &str) -> Option<&SimBus> {
        self.buses.get(name)
    }

    pub fn is_attached(&self, pin: PinId) -> bool {
        self.irqs.contains_key(&pin)
    }

    /// Run the interrupt routine attached to `pin`, as the host IRQ would.
    pub fn fire(&self, pin: PinId) -> bool {
        match self.irqs.get(&pin) {
            Some(callback) => {
                callback(pin);
                true
            }
            None => false,
        }
    }
}

impl BusProvider for SimPlatform {
    type Bus = SimBus;

    fn find_bus(&mut self, name: &str) -> Option<SimBus> {
        self.buses.get(name).cloned()
    }
}

impl InterruptController for SimPlatform {
    /// `"PB.03"` is pin `1 * 16 + 3`; ports `A` to `K`, 16 pins each.
    fn pin_get(&mut self, name: &str) -> Option<PinId> {
        let rest = name.strip_prefix('P')?;
        let (port, num) = rest.split_once('.')?;
        let port = match port.as_bytes() {
            [c @ b'A'..=b'K'] => (c - b'A') as u32,
            _ => return None,
        };
        let num: u32 = num.parse().ok()?;
        (num < 16).then_some(PinId(port * 16 + num))
    }

    fn attach_irq(
        &mut self,
        pin: PinId,
        _trigger: Trigger,
        callback: InterruptCallback,
    ) -> Result<(), IrqError> {
        if self.irqs.contains_key(&pin) {
            return Err(IrqError);
        }
        self.irqs.insert(pin, callback);
        Ok(())
    }

    fn detach_irq(&mut self, pin: PinId) {
        self.irqs.remove(&pin);
    }
}
