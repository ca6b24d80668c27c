//! Arithmetic/logic unit.
//!
//! Combinational: one evaluation per Execute tick. Results are 9 bits
//! wide so the carry out survives until writeback narrows the value to a
//! byte. Shifts right park the vacated bit 0 in bit 8 for the same
//! reason.

use crate::decode::Op;
use crate::Registers;

/// Carry-out position in the 9-bit scratch.
pub const CARRY_OUT: u16 = 0x100;

/// Output of one ALU evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    /// 9-bit result; bit 8 is the carry out where the op defines one.
    pub result: u16,
    /// New overflow flag, for the ops that define it.
    pub overflow: Option<bool>,
}

impl AluOutput {
    const fn value(result: u16) -> Self {
        Self {
            result,
            overflow: None,
        }
    }

    /// The result narrowed to a byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.result as u8
    }

    #[must_use]
    pub const fn carry(self) -> bool {
        self.result & CARRY_OUT != 0
    }
}

/// Evaluate `op` against the register snapshot and a fetched operand.
///
/// Ops without an ALU function pass the operand through unchanged.
#[must_use]
pub fn evaluate(op: Op, regs: &Registers, operand: u8) -> AluOutput {
    let m = u16::from(operand);
    let a = u16::from(regs.a);
    let carry_in = u16::from(regs.p.carry);
    match op {
        Op::Ora => AluOutput::value(a | m),
        Op::And => AluOutput::value(a & m),
        Op::Eor => AluOutput::value(a ^ m),
        Op::Adc => {
            let sum = a + m + carry_in;
            let r = sum as u8;
            AluOutput {
                result: sum,
                overflow: Some((!(regs.a ^ operand) & (regs.a ^ r)) & 0x80 != 0),
            }
        }
        Op::Sbc => {
            let difference = subtract(regs.p.carry, regs.a, operand);
            let r = difference as u8;
            AluOutput {
                result: difference,
                overflow: Some(((regs.a ^ operand) & (regs.a ^ r)) & 0x80 != 0),
            }
        }
        Op::Cmp => AluOutput::value(subtract(regs.p.carry, regs.a, operand)),
        Op::Cpx => AluOutput::value(subtract(regs.p.carry, regs.x, operand)),
        Op::Cpy => AluOutput::value(subtract(regs.p.carry, regs.y, operand)),
        Op::Asl => AluOutput::value(m << 1),
        Op::Rol => AluOutput::value((m << 1) | carry_in),
        Op::Lsr => AluOutput::value(((m & 1) << 8) | (m >> 1)),
        Op::Ror => AluOutput::value(((m & 1) << 8) | (carry_in << 7) | (m >> 1)),
        Op::Inc => AluOutput::value(u16::from(operand.wrapping_add(1))),
        Op::Dec => AluOutput::value(u16::from(operand.wrapping_sub(1))),
        Op::Inx => AluOutput::value(u16::from(regs.x.wrapping_add(1))),
        Op::Iny => AluOutput::value(u16::from(regs.y.wrapping_add(1))),
        Op::Dex => AluOutput::value(u16::from(regs.x.wrapping_sub(1))),
        Op::Dey => AluOutput::value(u16::from(regs.y.wrapping_sub(1))),
        Op::Tax | Op::Tay => AluOutput::value(a),
        Op::Txa => AluOutput::value(u16::from(regs.x)),
        Op::Tya => AluOutput::value(u16::from(regs.y)),
        Op::Tsx => AluOutput::value(u16::from(regs.sp)),
        _ => AluOutput::value(m),
    }
}

/// `{carry, lhs} - rhs` as a 9-bit subtraction.
///
/// Bit 8 of the difference is the new carry. The carry in only widens
/// the minuend; it is not a borrow applied to the low byte.
#[must_use]
pub const fn subtract(carry: bool, lhs: u8, rhs: u8) -> u16 {
    let minuend = ((carry as u16) << 8) | lhs as u16;
    minuend.wrapping_sub(rhs as u16) & 0x1FF
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flags;

    fn regs(a: u8, carry: bool) -> Registers {
        Registers {
            a,
            p: Flags {
                carry,
                ..Flags::new()
            },
            ..Registers::reset(0x3F)
        }
    }

    #[test]
    fn adc_carries_into_bit_eight() {
        let out = evaluate(Op::Adc, &regs(0xFF, false), 0x01);
        assert_eq!(out.byte(), 0x00);
        assert!(out.carry());
        assert_eq!(out.overflow, Some(false));
    }

    #[test]
    fn adc_adds_carry_in_and_flags_signed_overflow() {
        let out = evaluate(Op::Adc, &regs(0x7F, true), 0x00);
        assert_eq!(out.byte(), 0x80);
        assert!(!out.carry());
        assert_eq!(out.overflow, Some(true));
    }

    #[test]
    fn subtract_with_carry_set_is_plain_compare() {
        // 5 - 3 with carry in: no borrow
        let out = evaluate(Op::Cmp, &regs(0x05, true), 0x03);
        assert_eq!(out.byte(), 0x02);
        assert!(out.carry());

        // 3 - 5 with carry in: borrow clears carry
        let out = evaluate(Op::Cmp, &regs(0x03, true), 0x05);
        assert_eq!(out.byte(), 0xFE);
        assert!(!out.carry());
    }

    #[test]
    fn subtract_with_carry_clear_keeps_low_byte() {
        // The carry only widens the minuend: the low byte is A - M either way.
        let out = evaluate(Op::Sbc, &regs(0x05, false), 0x03);
        assert_eq!(out.byte(), 0x02);
        assert!(!out.carry());

        let out = evaluate(Op::Sbc, &regs(0x03, false), 0x05);
        assert_eq!(out.byte(), 0xFE);
        assert!(out.carry());
    }

    #[test]
    fn sbc_signed_overflow() {
        // 0x80 - 0x01 = 0x7F: negative minus positive gives positive
        let out = evaluate(Op::Sbc, &regs(0x80, true), 0x01);
        assert_eq!(out.byte(), 0x7F);
        assert_eq!(out.overflow, Some(true));
    }

    #[test]
    fn shifts_capture_vacated_bit() {
        let r = regs(0, true);
        let asl = evaluate(Op::Asl, &r, 0x81);
        assert_eq!((asl.byte(), asl.carry()), (0x02, true));

        let rol = evaluate(Op::Rol, &r, 0x40);
        assert_eq!((rol.byte(), rol.carry()), (0x81, false));

        let lsr = evaluate(Op::Lsr, &r, 0x03);
        assert_eq!((lsr.byte(), lsr.carry()), (0x01, true));

        let ror = evaluate(Op::Ror, &r, 0x02);
        assert_eq!((ror.byte(), ror.carry()), (0x81, false));
    }

    #[test]
    fn memory_increment_wraps() {
        assert_eq!(evaluate(Op::Inc, &regs(0, false), 0xFF).result, 0x00);
        assert_eq!(evaluate(Op::Dec, &regs(0, false), 0x00).result, 0xFF);
    }

    #[test]
    fn logic_ops() {
        let r = regs(0b1100_1100, false);
        assert_eq!(evaluate(Op::Ora, &r, 0b1010_1010).byte(), 0b1110_1110);
        assert_eq!(evaluate(Op::And, &r, 0b1010_1010).byte(), 0b1000_1000);
        assert_eq!(evaluate(Op::Eor, &r, 0b1010_1010).byte(), 0b0110_0110);
        assert_eq!(evaluate(Op::Lda, &r, 0x42).byte(), 0x42);
    }
}
