use crate::registers::{Port, Register};

/// A raw argument that does not name anything on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    Port(u8),
    Pin(u8),
    Mode(u8),
    PinState(u8),
    Register(u8),
}

impl core::fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvalidArgument::Port(v) => write!(f, "port {} not found", v),
            InvalidArgument::Pin(v) => write!(f, "pin {} not found", v),
            InvalidArgument::Mode(v) => write!(f, "mode {:#04x} not found", v),
            InvalidArgument::PinState(v) => write!(f, "pin state {:#04x} not found", v),
            InvalidArgument::Register(v) => write!(f, "register {:#04x} not found", v),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for InvalidArgument {}

/// Errors of the X9555 driver, generic over the error type of the I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Underlying bus error
    Bus(E),
    /// Argument rejected before any bus traffic
    Invalid(InvalidArgument),
    /// `port_config` with a register that is not a configuration register of `port`
    RegisterPortMismatch { port: Port, register: Register },
    /// No I2C bus is registered under the requested name
    BusNotFound,
    /// The interrupt pin name could not be resolved
    InterruptPinNotFound,
    /// The platform refused to attach or enable the interrupt
    InterruptAttach,
    /// Waiting on the host pin wired to INT failed
    InterruptLine,
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(e: InvalidArgument) -> Self {
        Error::Invalid(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "i2c transfer failed: {:?}", e),
            Error::Invalid(e) => write!(f, "{}", e),
            Error::RegisterPortMismatch { port, register } => write!(
                f,
                "config register {:#04x} is not consistent with port {}",
                *register as u8, *port as u8
            ),
            Error::BusNotFound => f.write_str("i2c bus not found"),
            Error::InterruptPinNotFound => f.write_str("interrupt pin not found"),
            Error::InterruptAttach => f.write_str("interrupt attach failed"),
            Error::InterruptLine => f.write_str("interrupt line wait failed"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}

impl<E: core::fmt::Debug> embedded_hal::digital::Error for Error<E> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}
