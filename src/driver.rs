//! Register-level operations of the X9555.
//!
//! [`Driver`] does no locking of its own; [`Device`](crate::Device) runs every call inside its
//! [`PortMutex`](crate::PortMutex).
use crate::interrupt::InterruptStatus;
use crate::registers::{Mode, Pin, PinState, Port, Register};
use crate::{Address, Error, I2cBus, I2cExt, InvalidArgument};

pub struct Driver<I2C> {
    i2c: I2C,
    addr: Address,
}

impl<I2C> Driver<I2C> {
    pub fn new(i2c: I2C, addr: Address) -> Self {
        Self { i2c, addr }
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2cBus> Driver<I2C> {
    fn write(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_reg(self.addr.get(), reg, value)
            .map_err(Error::Bus)
    }

    fn read(&mut self, reg: Register) -> Result<u8, Error<I2C::Error>> {
        self.i2c.read_reg(self.addr.get(), reg).map_err(Error::Bus)
    }

    fn update(&mut self, reg: Register, mask_set: u8, mask_clear: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .update_reg(self.addr.get(), reg, mask_set, mask_clear)
            .map_err(Error::Bus)
    }

    /// Write `value` to a configuration or polarity-inversion register of `port`.
    pub fn configure(&mut self, port: Port, register: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        if !register.is_config() {
            return Err(InvalidArgument::Register(register as u8).into());
        }
        if register.port() != port {
            return Err(Error::RegisterPortMismatch { port, register });
        }
        self.write(register, value)
    }

    pub fn set_port_mode(&mut self, port: Port, mode: Mode) -> Result<(), Error<I2C::Error>> {
        match mode {
            Mode::Input => self.write(port.configuration(), 0xff),
            Mode::Output => self.write(port.configuration(), 0x00),
            Mode::PolarityInversion => {
                self.write(port.configuration(), 0xff)?;
                self.write(port.polarity(), 0xff)
            }
        }
    }

    pub fn write_port(&mut self, port: Port, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write(port.output(), value)
    }

    pub fn read_port(&mut self, port: Port, mode: Mode) -> Result<u8, Error<I2C::Error>> {
        self.read(port.register_for(mode))
    }

    pub fn set_pin_mode(&mut self, pin: Pin, mode: Mode) -> Result<(), Error<I2C::Error>> {
        let port = pin.port();
        match mode {
            Mode::Input => self.update(port.configuration(), pin.mask(), 0),
            Mode::Output => self.update(port.configuration(), 0, pin.mask()),
            Mode::PolarityInversion => {
                self.update(port.configuration(), pin.mask(), 0)?;
                self.update(port.polarity(), pin.mask(), 0)
            }
        }
    }

    pub fn write_pin(&mut self, pin: Pin, state: PinState) -> Result<(), Error<I2C::Error>> {
        let (mask_set, mask_clear) = match state {
            PinState::High => (pin.mask(), 0),
            PinState::Low => (0, pin.mask()),
        };
        self.update(pin.port().output(), mask_set, mask_clear)
    }

    pub fn read_pin(&mut self, pin: Pin, mode: Mode) -> Result<PinState, Error<I2C::Error>> {
        let value = self.read(pin.port().register_for(mode))?;
        Ok(PinState::from(value & pin.mask() != 0))
    }

    /// Read both input ports, which releases the chip's INT line.
    pub fn interrupt_clear(&mut self) -> Result<InterruptStatus, Error<I2C::Error>> {
        let port0 = self.read(Register::InputPort0)?;
        let port1 = self.read(Register::InputPort1)?;
        Ok(InterruptStatus { port0, port1 })
    }
}
