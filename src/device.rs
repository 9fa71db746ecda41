//! Device handle: one per physical chip.
use crate::driver::Driver;
use crate::interrupt::{InterruptCallback, InterruptController, InterruptStatus, PinId, Trigger};
use crate::interrupt::is_no_interrupt_pin;
use crate::registers::{Mode, Pin, PinState, Port, Register};
use crate::{Address, BusProvider, Error, ExpanderPin, I2cBus, PortMutex};

/// An X9555 on a bus, with the lock that serialises access to it.
///
/// All operations take `&self`; exclusive access to the chip comes from the mutex `M`, which is
/// held for the whole register sequence of one call.
pub struct Device<M> {
    driver: M,
    address: Address,
    interrupt_pin: Option<PinId>,
}

impl<I2C> Device<core::cell::RefCell<Driver<I2C>>>
where
    I2C: I2cBus,
{
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self::with_mutex(i2c, address)
    }
}

impl<I2C, M> Device<M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    pub fn with_mutex(i2c: I2C, address: Address) -> Self {
        Self {
            driver: PortMutex::create(Driver::new(i2c, address)),
            address,
            interrupt_pin: None,
        }
    }

    /// Look up the bus `bus_name` and, unless `interrupt_pin_name` is
    /// [`NO_INTERRUPT_PIN`](crate::interrupt::NO_INTERRUPT_PIN) or `"none"`,
    /// attach `callback` to the host pin wired to INT.
    ///
    /// On failure nothing stays attached and the bus handle is dropped.
    pub fn init<P>(
        platform: &mut P,
        interrupt_pin_name: &str,
        bus_name: &str,
        address_offset: u8,
        callback: InterruptCallback,
    ) -> Result<Self, Error<I2C::Error>>
    where
        P: BusProvider<Bus = I2C> + InterruptController,
    {
        let Some(i2c) = platform.find_bus(bus_name) else {
            log::error!("Can't find x9555 device on '{}'.", bus_name);
            return Err(Error::BusNotFound);
        };
        let mut device = Self::with_mutex(i2c, Address::from_offset(address_offset));

        if !is_no_interrupt_pin(interrupt_pin_name) {
            let Some(pin) = platform.pin_get(interrupt_pin_name) else {
                log::error!("get device '{}' interrupt pin fail.", interrupt_pin_name);
                return Err(Error::InterruptPinNotFound);
            };
            if platform
                .attach_irq(pin, Trigger::LowLevel, callback)
                .is_err()
            {
                log::error!("create device '{}' interrupt fail.", interrupt_pin_name);
                return Err(Error::InterruptAttach);
            }
            device.interrupt_pin = Some(pin);
        }

        log::info!(
            "x9555 created on '{}' at {:#04x}, interrupt pin {:?}",
            bus_name,
            device.address.get(),
            device.interrupt_pin
        );
        Ok(device)
    }

    /// Detach the interrupt (if any) and give the bus back.
    pub fn deinit<P: InterruptController>(self, platform: &mut P) -> I2C {
        if let Some(pin) = self.interrupt_pin {
            platform.detach_irq(pin);
        }
        self.release()
    }

    pub fn release(self) -> I2C {
        self.driver.into_inner().release()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn interrupt_pin(&self) -> Option<PinId> {
        self.interrupt_pin
    }

    fn locked<R>(
        &self,
        op: &str,
        f: impl FnOnce(&mut Driver<I2C>) -> Result<R, Error<I2C::Error>>,
    ) -> Result<R, Error<I2C::Error>> {
        let res = self.driver.lock(f);
        if let Err(e) = &res {
            log::error!("x9555 {}: {}", op, e);
        }
        res
    }

    /// Write a configuration or polarity-inversion register belonging to `port`.
    ///
    /// Registers of the other port, and non-configuration registers, are rejected without any
    /// bus traffic.
    pub fn configure(&self, port: Port, register: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        self.locked("port config", |drv| drv.configure(port, register, value))
    }

    /// Switch a whole port.  `PolarityInversion` makes every pin an inverted input.
    pub fn set_port_mode(&self, port: Port, mode: Mode) -> Result<(), Error<I2C::Error>> {
        self.locked("port mode", |drv| drv.set_port_mode(port, mode))
    }

    /// Overwrite the output register of `port`.
    pub fn write_port(&self, port: Port, value: u8) -> Result<(), Error<I2C::Error>> {
        self.locked("port write", |drv| drv.write_port(port, value))
    }

    pub fn read_port(&self, port: Port, mode: Mode) -> Result<u8, Error<I2C::Error>> {
        self.locked("port read", |drv| drv.read_port(port, mode))
    }

    pub fn set_pin_mode(&self, pin: Pin, mode: Mode) -> Result<(), Error<I2C::Error>> {
        self.locked("pin mode", |drv| drv.set_pin_mode(pin, mode))
    }

    pub fn write_pin(&self, pin: Pin, state: PinState) -> Result<(), Error<I2C::Error>> {
        self.locked("pin write", |drv| drv.write_pin(pin, state))
    }

    pub fn read_pin(&self, pin: Pin, mode: Mode) -> Result<PinState, Error<I2C::Error>> {
        self.locked("pin read", |drv| drv.read_pin(pin, mode))
    }

    /// Read both input ports, releasing INT.
    pub fn interrupt_clear(&self) -> Result<InterruptStatus, Error<I2C::Error>> {
        self.locked("interrupt clear", |drv| drv.interrupt_clear())
    }

    /// Wait until INT is asserted, then clear it.
    #[cfg(feature = "async")]
    pub async fn wait_for_interrupt<W>(&self, int_line: &mut W) -> Result<InterruptStatus, Error<I2C::Error>>
    where
        W: embedded_hal_async::digital::Wait,
    {
        if let Err(e) = int_line.wait_for_low().await {
            log::error!("x9555 interrupt line: {:?}", e);
            return Err(Error::InterruptLine);
        }
        self.interrupt_clear()
    }

    /// `embedded-hal` view of a single pin.
    pub fn pin(&self, pin: Pin) -> ExpanderPin<'_, M> {
        ExpanderPin::new(pin, self)
    }
}

#[cfg(test)]
mod tests {
    use super::Device;
    use crate::registers::{Mode, Pin, PinState, Port, Register};
    use crate::{Address, Error};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn failed_transfer_releases_the_lock() {
        let expectations = [
            // pin write: read ok, write fails
            mock_i2c::Transaction::write(0x20, vec![0x02]),
            mock_i2c::Transaction::read(0x20, vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x01]).with_error(ErrorKind::Other),
            // retry succeeds
            mock_i2c::Transaction::write(0x20, vec![0x02]),
            mock_i2c::Transaction::read(0x20, vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x01]),
            // port read fails on the data phase
            mock_i2c::Transaction::write(0x20, vec![0x01]),
            mock_i2c::Transaction::read(0x20, vec![0x00]).with_error(ErrorKind::Other),
            mock_i2c::Transaction::write(0x20, vec![0x01]),
            mock_i2c::Transaction::read(0x20, vec![0x5a]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let dev = Device::<std::sync::Mutex<_>>::with_mutex(bus.clone(), Address::default());
        let io0_0 = Pin::try_from(0).unwrap();

        assert_eq!(
            dev.write_pin(io0_0, PinState::High),
            Err(Error::Bus(ErrorKind::Other))
        );
        dev.write_pin(io0_0, PinState::High).unwrap();

        assert_eq!(
            dev.read_port(Port::P1, Mode::Input),
            Err(Error::Bus(ErrorKind::Other))
        );
        assert_eq!(dev.read_port(Port::P1, Mode::Input).unwrap(), 0x5a);

        bus.done();
    }

    #[test]
    fn validation_failure_keeps_device_usable() {
        let expectations = [mock_i2c::Transaction::write(0x20, vec![0x07, 0x0f])];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let dev = Device::new(bus.clone(), Address::default());

        assert!(dev.configure(Port::P0, Register::Configuration1, 0x0f).is_err());
        dev.configure(Port::P1, Register::Configuration1, 0x0f).unwrap();

        bus.done();
    }

    #[test]
    fn round_trips() {
        let expectations = [
            // write/read port 0
            mock_i2c::Transaction::write(0x22, vec![0x02, 0x96]),
            mock_i2c::Transaction::write(0x22, vec![0x02]),
            mock_i2c::Transaction::read(0x22, vec![0x96]),
            // port 1 all inputs
            mock_i2c::Transaction::write(0x22, vec![0x07, 0xff]),
            // write_pin high, read_pin output
            mock_i2c::Transaction::write(0x22, vec![0x03]),
            mock_i2c::Transaction::read(0x22, vec![0x10]),
            mock_i2c::Transaction::write(0x22, vec![0x03, 0x12]),
            mock_i2c::Transaction::write(0x22, vec![0x03]),
            mock_i2c::Transaction::read(0x22, vec![0x12]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let dev = Device::new(bus.clone(), Address::from_straps(false, true, false));
        let io1_1 = Pin::try_from(11).unwrap();

        dev.write_port(Port::P0, 0x96).unwrap();
        assert_eq!(dev.read_port(Port::P0, Mode::Output).unwrap(), 0x96);
        dev.set_port_mode(Port::P1, Mode::Input).unwrap();
        dev.write_pin(io1_1, PinState::High).unwrap();
        assert_eq!(dev.read_pin(io1_1, Mode::Output).unwrap(), PinState::High);

        bus.done();
    }

    #[cfg(feature = "async")]
    #[test]
    fn wait_for_interrupt_clears_it() {
        use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x00]),
            mock_i2c::Transaction::read(0x20, vec![0xfe]),
            mock_i2c::Transaction::write(0x20, vec![0x01]),
            mock_i2c::Transaction::read(0x20, vec![0xff]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let mut int_line = PinMock::new(&[PinTransaction::wait_for_state(State::Low)]);
        let dev = Device::new(bus.clone(), Address::default());

        let status = embassy_futures::block_on(dev.wait_for_interrupt(&mut int_line)).unwrap();
        assert_eq!((status.port0, status.port1), (0xfe, 0xff));

        int_line.done();
        bus.done();
    }
}
