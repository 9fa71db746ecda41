use embedded_hal::i2c::I2c;

/// Blanket trait for the I2C buses the driver can talk through.
pub trait I2cBus: I2c {}

impl<T: I2c> I2cBus for T {}

/// Host service that hands out I2C buses by name (`"i2c1"`, ...).
pub trait BusProvider {
    type Bus: I2cBus;

    fn find_bus(&mut self, name: &str) -> Option<Self::Bus>;
}

pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = I2C::Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        let reg = reg.into();
        log::debug!("write {:#04x} <- {:#010b} @ {:#04x}", reg, value, addr);
        self.write(addr, &[reg, value])
    }

    fn update_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        mask_set: u8,
        mask_clear: u8,
    ) -> Result<(), Self::Error> {
        let reg = reg.into();
        let mut value = self.read_reg(addr, reg)?;
        value |= mask_set;
        value &= !mask_clear;
        self.write_reg(addr, reg, value)
    }

    // The register index goes out as its own write; the chip keeps the pointer for the read.
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let reg = reg.into();
        let mut buf = [0x00];
        self.write(addr, &[reg])?;
        self.read(addr, &mut buf)?;
        log::debug!("read {:#04x} -> {:#010b} @ {:#04x}", reg, buf[0], addr);
        Ok(buf[0])
    }
}
