//! Interrupt line of the expander.
//!
//! The X9555 pulls its open-drain INT output low whenever an input pin changes.  The line stays
//! asserted until the input ports are read again, which is what
//! [`Device::interrupt_clear`](crate::Device::interrupt_clear) does.  Attaching the host-side
//! IRQ is left to the platform through [`InterruptController`].
use crate::registers::{Pin, PinState, Port};

/// Pin name that means "no interrupt line connected".
pub const NO_INTERRUPT_PIN: &str = "RT_NULL";

/// `true` for [`NO_INTERRUPT_PIN`] and its alias `"none"`.
pub fn is_no_interrupt_pin(name: &str) -> bool {
    matches!(name, NO_INTERRUPT_PIN | "none")
}

/// Platform pin number of the host GPIO wired to INT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId(pub u32);

/// Routine run from IRQ context when INT is asserted.
///
/// It runs outside the device lock and must not call back into the driver.  Defer the actual
/// `interrupt_clear` to thread context.
pub type InterruptCallback = fn(PinId);

/// Default callback; real applications supply their own.
pub fn log_interrupt(pin: PinId) {
    log::info!(
        "x9555 interrupt on pin {}, supply your own interrupt service routine",
        pin.0
    );
}

/// INT is an open-drain level output, so it is only ever attached level-triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    LowLevel,
}

/// The platform refused to configure an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqError;

/// Host GPIO/IRQ service.
pub trait InterruptController {
    /// Resolve a pin name like `"PA.00"`.
    fn pin_get(&mut self, name: &str) -> Option<PinId>;

    /// Make `pin` a pulled-up input, attach `callback` for `trigger` and enable the IRQ.
    fn attach_irq(
        &mut self,
        pin: PinId,
        trigger: Trigger,
        callback: InterruptCallback,
    ) -> Result<(), IrqError>;

    fn detach_irq(&mut self, pin: PinId);
}

/// Raw input port values captured while clearing an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptStatus {
    pub port0: u8,
    pub port1: u8,
}

impl InterruptStatus {
    pub fn port(&self, port: Port) -> u8 {
        match port {
            Port::P0 => self.port0,
            Port::P1 => self.port1,
        }
    }

    pub fn pin(&self, pin: Pin) -> PinState {
        PinState::from(self.port(pin.port()) & pin.mask() != 0)
    }

    /// Pins whose level differs between `self` and an earlier capture.
    pub fn changed_since(&self, earlier: &InterruptStatus) -> impl Iterator<Item = Pin> + '_ {
        let earlier = *earlier;
        Pin::all().filter(move |p| self.pin(*p) != earlier.pin(*p))
    }
}
