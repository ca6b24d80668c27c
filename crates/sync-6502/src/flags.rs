//! Processor status flags.
//!
//! Flags live as individual booleans and are packed into the status byte
//! only when it is pushed or inspected.

/// Carry - carry out of bit 7 / no-borrow out of a subtraction.
pub const C: u8 = 0x01;

/// Zero - result was zero.
pub const Z: u8 = 0x02;

/// Interrupt disable. Stored only; there is no interrupt dispatch.
pub const I: u8 = 0x04;

/// Decimal mode. Stored only; arithmetic is always binary.
pub const D: u8 = 0x08;

/// Break - set only while the engine is parked by the halt input.
pub const B: u8 = 0x10;

/// Overflow - signed overflow of the last ADC/SBC, or bit 6 from BIT.
pub const V: u8 = 0x40;

/// Negative - bit 7 of the result.
pub const N: u8 = 0x80;

/// The seven status flags. Bit 5 of the packed byte is always 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub negative: bool,
    pub overflow: bool,
    pub break_: bool,
    pub decimal: bool,
    pub interrupt_disable: bool,
    pub zero: bool,
    pub carry: bool,
}

impl Flags {
    /// All flags clear.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            negative: false,
            overflow: false,
            break_: false,
            decimal: false,
            interrupt_disable: false,
            zero: false,
            carry: false,
        }
    }

    /// Pack into the status byte (`NV0BDIZC`).
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        let mut p = 0;
        if self.negative {
            p |= N;
        }
        if self.overflow {
            p |= V;
        }
        if self.break_ {
            p |= B;
        }
        if self.decimal {
            p |= D;
        }
        if self.interrupt_disable {
            p |= I;
        }
        if self.zero {
            p |= Z;
        }
        if self.carry {
            p |= C;
        }
        p
    }

    /// Unpack a status byte popped from the stack.
    ///
    /// Bit 5 is ignored and `break_` is kept as-is: it tracks the halt
    /// input, not software.
    #[must_use]
    pub const fn restored(self, value: u8) -> Self {
        Self {
            negative: value & N != 0,
            overflow: value & V != 0,
            break_: self.break_,
            decimal: value & D != 0,
            interrupt_disable: value & I != 0,
            zero: value & Z != 0,
            carry: value & C != 0,
        }
    }

    /// Update N and Z from a result byte.
    pub fn update_nz(&mut self, value: u8) {
        self.negative = value & 0x80 != 0;
        self.zero = value == 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_alone_packs_to_one() {
        let flags = Flags {
            carry: true,
            ..Flags::new()
        };
        assert_eq!(flags.to_byte(), 0b0000_0001);
    }

    #[test]
    fn bit_five_is_never_set() {
        let all = Flags {
            negative: true,
            overflow: true,
            break_: true,
            decimal: true,
            interrupt_disable: true,
            zero: true,
            carry: true,
        };
        assert_eq!(all.to_byte(), 0xDF);
        assert_eq!(all.to_byte() & 0x20, 0);
    }

    #[test]
    fn restore_keeps_break_and_drops_bit_five() {
        let restored = Flags::new().restored(0xFF);
        assert!(!restored.break_);
        assert!(restored.carry && restored.negative && restored.decimal);
        assert_eq!(restored.to_byte(), 0xCF);
    }
}
