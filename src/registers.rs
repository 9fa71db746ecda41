//! Register map and the typed values used to address the expander.
use crate::error::InvalidArgument;

/// Base 7-bit address with A0, A1 and A2 tied to GND.
pub const BASE_ADDRESS: u8 = 0x40 >> 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    InputPort0 = 0x00,
    InputPort1 = 0x01,
    OutputPort0 = 0x02,
    OutputPort1 = 0x03,
    PolarityInversion0 = 0x04,
    PolarityInversion1 = 0x05,
    Configuration0 = 0x06,
    Configuration1 = 0x07,
}

impl Register {
    pub const ALL: [Register; 8] = [
        Register::InputPort0,
        Register::InputPort1,
        Register::OutputPort0,
        Register::OutputPort1,
        Register::PolarityInversion0,
        Register::PolarityInversion1,
        Register::Configuration0,
        Register::Configuration1,
    ];

    /// Port this register belongs to; even addresses are port 0, odd ones port 1.
    pub fn port(self) -> Port {
        if self as u8 & 1 == 0 {
            Port::P0
        } else {
            Port::P1
        }
    }

    /// Whether `port_config` may write this register.
    pub fn is_config(self) -> bool {
        matches!(
            self,
            Register::Configuration0
                | Register::Configuration1
                | Register::PolarityInversion0
                | Register::PolarityInversion1
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::InputPort0 => "X9555_Register_Input_Port_0",
            Register::InputPort1 => "X9555_Register_Input_Port_1",
            Register::OutputPort0 => "X9555_Register_Output_Port_0",
            Register::OutputPort1 => "X9555_Register_Output_Port_1",
            Register::PolarityInversion0 => "X9555_Register_Polarity_Inversion_Port_0",
            Register::PolarityInversion1 => "X9555_Register_Polarity_Inversion_Port_1",
            Register::Configuration0 => "X9555_Register_Configuration_Port_0",
            Register::Configuration1 => "X9555_Register_Configuration_Port_1",
        }
    }
}

impl From<Register> for u8 {
    fn from(r: Register) -> u8 {
        r as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = InvalidArgument;

    fn try_from(v: u8) -> Result<Self, InvalidArgument> {
        Register::ALL
            .into_iter()
            .find(|r| *r as u8 == v)
            .ok_or(InvalidArgument::Register(v))
    }
}

/// One of the two 8-bit GPIO groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    P0 = 0,
    P1 = 1,
}

impl Port {
    pub fn input(self) -> Register {
        match self {
            Port::P0 => Register::InputPort0,
            Port::P1 => Register::InputPort1,
        }
    }

    pub fn output(self) -> Register {
        match self {
            Port::P0 => Register::OutputPort0,
            Port::P1 => Register::OutputPort1,
        }
    }

    pub fn polarity(self) -> Register {
        match self {
            Port::P0 => Register::PolarityInversion0,
            Port::P1 => Register::PolarityInversion1,
        }
    }

    pub fn configuration(self) -> Register {
        match self {
            Port::P0 => Register::Configuration0,
            Port::P1 => Register::Configuration1,
        }
    }

    /// Register holding the value a `read` in `mode` reports.
    pub fn register_for(self, mode: Mode) -> Register {
        match mode {
            Mode::Input => self.input(),
            Mode::Output => self.output(),
            Mode::PolarityInversion => self.polarity(),
        }
    }
}

impl TryFrom<u8> for Port {
    type Error = InvalidArgument;

    fn try_from(v: u8) -> Result<Self, InvalidArgument> {
        match v {
            0 => Ok(Port::P0),
            1 => Ok(Port::P1),
            _ => Err(InvalidArgument::Port(v)),
        }
    }
}

/// A single I/O line.
///
/// Pins are numbered `0..=7` on port 0 and `10..=17` on port 1, so the bit inside the port
/// register is `number % 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin(u8);

impl Pin {
    pub fn number(self) -> u8 {
        self.0
    }

    pub fn port(self) -> Port {
        if self.0 < 10 {
            Port::P0
        } else {
            Port::P1
        }
    }

    pub fn bit(self) -> u8 {
        self.0 % 10
    }

    pub fn mask(self) -> u8 {
        1 << self.bit()
    }

    pub fn all() -> impl Iterator<Item = Pin> {
        (0..=7).chain(10..=17).map(Pin)
    }
}

impl TryFrom<u8> for Pin {
    type Error = InvalidArgument;

    fn try_from(v: u8) -> Result<Self, InvalidArgument> {
        match v {
            0..=7 | 10..=17 => Ok(Pin(v)),
            _ => Err(InvalidArgument::Pin(v)),
        }
    }
}

/// Mode of a pin or a whole port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Output = 0x00,
    Input = 0x01,
    PolarityInversion = 0x02,
}

impl TryFrom<u8> for Mode {
    type Error = InvalidArgument;

    fn try_from(v: u8) -> Result<Self, InvalidArgument> {
        match v {
            0x00 => Ok(Mode::Output),
            0x01 => Ok(Mode::Input),
            0x02 => Ok(Mode::PolarityInversion),
            _ => Err(InvalidArgument::Mode(v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Low = 0x00,
    High = 0x01,
}

impl PinState {
    pub fn is_high(self) -> bool {
        self == PinState::High
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        if high {
            PinState::High
        } else {
            PinState::Low
        }
    }
}

impl TryFrom<u8> for PinState {
    type Error = InvalidArgument;

    fn try_from(v: u8) -> Result<Self, InvalidArgument> {
        match v {
            0x00 => Ok(PinState::Low),
            0x01 => Ok(PinState::High),
            _ => Err(InvalidArgument::PinState(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_partition_into_ports() {
        for n in 0..=255u8 {
            let pin = Pin::try_from(n);
            match n {
                0..=7 => {
                    let pin = pin.unwrap();
                    assert_eq!(pin.port(), Port::P0);
                    assert_eq!(pin.bit(), n);
                }
                10..=17 => {
                    let pin = pin.unwrap();
                    assert_eq!(pin.port(), Port::P1);
                    assert_eq!(pin.bit(), n - 10);
                }
                _ => assert_eq!(pin, Err(InvalidArgument::Pin(n))),
            }
        }
        assert_eq!(Pin::all().count(), 16);
    }

    #[test]
    fn pin_twelve_is_bit_two_of_port_one() {
        let pin: Pin = Pin::try_from(12).unwrap();
        assert_eq!(pin.port(), Port::P1);
        assert_eq!(pin.mask(), 0b0000_0100);
    }

    #[test]
    fn registers_belong_to_their_port() {
        assert_eq!(Register::Configuration1.port(), Port::P1);
        assert_eq!(Register::PolarityInversion0.port(), Port::P0);
        assert!(!Register::OutputPort0.is_config());
        for port in [Port::P0, Port::P1] {
            assert_eq!(port.configuration().port(), port);
            assert_eq!(port.register_for(Mode::PolarityInversion).port(), port);
        }
    }

    #[test]
    fn raw_values_are_validated() {
        assert_eq!(
            Register::try_from(0x08),
            Err(InvalidArgument::Register(0x08))
        );
        assert_eq!(
            Port::try_from(2),
            Err(InvalidArgument::Port(2))
        );
        assert_eq!(
            Mode::try_from(3),
            Err(InvalidArgument::Mode(3))
        );
        assert_eq!(
            PinState::try_from(2),
            Err(InvalidArgument::PinState(2))
        );
        assert_eq!(
            Mode::try_from(2),
            Ok(Mode::PolarityInversion)
        );
    }
}
