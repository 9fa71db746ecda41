use crate::registers::BASE_ADDRESS;

/// 7-bit I2C address of one chip: the base address OR'd with the A0..A2 strap pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(u8);

impl Address {
    /// Address for a strap offset `0b0000_0[A2][A1][A0]`.  Bits above A2 are ignored.
    pub fn from_offset(offset: u8) -> Self {
        Self(BASE_ADDRESS | (offset & 0b111))
    }

    pub fn from_straps(a0: bool, a1: bool, a2: bool) -> Self {
        Self::from_offset(((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8))
    }

    pub fn offset(self) -> u8 {
        self.0 & 0b111
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self(BASE_ADDRESS)
    }
}

impl From<Address> for u8 {
    fn from(a: Address) -> u8 {
        a.0
    }
}
