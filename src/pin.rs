use crate::registers::{Mode, Pin, PinState};
use crate::{Device, Driver, Error, I2cBus, PortMutex};
use embedded_hal::digital::{self as hal_digital, ErrorType};

/// Representation of one expander pin as an `embedded-hal` GPIO.
///
/// `ExpanderPin` is not constructed directly, it is borrowed from a [`Device`] with
/// [`Device::pin`].  Every call locks the device for its own register access, so pins of the
/// same chip can be handed to independent drivers.
pub struct ExpanderPin<'a, M> {
    pin: Pin,
    device: &'a Device<M>,
}

impl<'a, I2C, M> ExpanderPin<'a, M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    pub(crate) fn new(pin: Pin, device: &'a Device<M>) -> Self {
        Self { pin, device }
    }

    pub fn number(&self) -> u8 {
        self.pin.number()
    }

    pub fn into_input(self) -> Result<Self, Error<I2C::Error>> {
        self.device.set_pin_mode(self.pin, Mode::Input)?;
        Ok(self)
    }

    /// Set the level first, then turn the pin into an output so it never glitches.
    pub fn into_output(self, state: PinState) -> Result<Self, Error<I2C::Error>> {
        self.device.write_pin(self.pin, state)?;
        self.device.set_pin_mode(self.pin, Mode::Output)?;
        Ok(self)
    }

    pub fn into_inverted(self) -> Result<Self, Error<I2C::Error>> {
        self.device.set_pin_mode(self.pin, Mode::PolarityInversion)?;
        Ok(self)
    }
}

impl<'a, I2C, M> ErrorType for ExpanderPin<'a, M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    type Error = Error<I2C::Error>;
}

impl<'a, I2C, M> hal_digital::InputPin for ExpanderPin<'a, M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.device.read_pin(self.pin, Mode::Input)?.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|b| !b)
    }
}

impl<'a, I2C, M> hal_digital::OutputPin for ExpanderPin<'a, M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.device.write_pin(self.pin, PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.device.write_pin(self.pin, PinState::High)
    }
}

impl<'a, I2C, M> hal_digital::StatefulOutputPin for ExpanderPin<'a, M>
where
    I2C: I2cBus,
    M: PortMutex<Port = Driver<I2C>>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.device.read_pin(self.pin, Mode::Output)?.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|b| !b)
    }
}
