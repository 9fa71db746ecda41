//! Driver for the X9555 / PCA9555-style 16-bit I2C GPIO expander.
//!
//! The chip has two 8-bit ports.  Pins `0..=7` live on port 0 and pins `10..=17` on port 1; every
//! pin can be an output, an input, or a polarity-inverted input.  A [`Device`] wraps the I2C bus
//! in a [`PortMutex`] and performs each operation as one locked register sequence:
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c as mock_i2c;
//! # let expectations = [
//! #     mock_i2c::Transaction::write(0x21, vec![0x06, 0x00]),
//! #     mock_i2c::Transaction::write(0x21, vec![0x02]),
//! #     mock_i2c::Transaction::read(0x21, vec![0x00]),
//! #     mock_i2c::Transaction::write(0x21, vec![0x02, 0x08]),
//! # ];
//! # let mut i2c = mock_i2c::Mock::new(&expectations);
//! use x9555::{Address, Device, Mode, Pin, PinState, Port};
//!
//! let expander = Device::new(i2c.clone(), Address::from_offset(0b001));
//! expander.set_port_mode(Port::P0, Mode::Output)?;
//! expander.write_pin(Pin::try_from(3)?, PinState::High)?;
//! # i2c.done();
//! # Ok::<(), x9555::Error<embedded_hal::i2c::ErrorKind>>(())
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod address;
mod bus;
mod device;
mod driver;
mod error;
pub mod interrupt;
mod mutex;
mod pin;
pub mod registers;
pub mod shell;
#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use address::Address;
pub use bus::{BusProvider, I2cBus};
pub use device::Device;
pub use driver::Driver;
pub use error::{Error, InvalidArgument};
pub use interrupt::{InterruptCallback, InterruptController, InterruptStatus, PinId};
pub use mutex::PortMutex;
pub use pin::ExpanderPin;
pub use registers::{Mode, Pin, PinState, Port, Register};

pub(crate) use bus::I2cExt;
